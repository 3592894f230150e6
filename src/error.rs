use std::path::PathBuf;

use thiserror::Error;

/// Why a single level's results could not be loaded. Either way the level is
/// left out of the comparison and the run continues.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("result file {path:?} does not exist")]
  MissingResultFile { path: PathBuf },
  #[error("result file {path:?} is malformed: {reason}")]
  MalformedInputFile { path: PathBuf, reason: String },
}

/// None of the requested levels produced a result table.
#[derive(Debug, Error)]
#[error("no result files found in {dir:?} (looked for {looked_for})")]
pub struct NoResultsAvailable {
  pub dir: PathBuf,
  pub looked_for: String,
}
