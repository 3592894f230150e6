use std::path::PathBuf;

use anyhow::Result;

/// An optimization level label, e.g. `O2`. Used both to select the result file
/// and as a column label in the report.
pub type Level = String;

const DEFAULT_LEVELS: [&str; 3] = ["O0", "O1", "O2"];
const DEFAULT_PREFIX: &str = "benchmark_results_";
const DEFAULT_EXTENSION: &str = "csv";
const DEFAULT_DELIMITER: u8 = b',';

/// Where to find result files and which levels to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Directory containing the result files.
  pub dir: PathBuf,
  /// File name prefix, followed by the level label.
  pub prefix: String,
  /// File extension, without the leading dot.
  pub extension: String,
  /// Field separator of the result files.
  pub delimiter: u8,
  /// Levels to load, in canonical order. Loading follows this order.
  pub levels: Vec<Level>,
  /// Speedup denominator. Defaults to the first canonical level.
  pub baseline: Option<Level>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      dir: PathBuf::from("."),
      prefix: DEFAULT_PREFIX.to_string(),
      extension: DEFAULT_EXTENSION.to_string(),
      delimiter: DEFAULT_DELIMITER,
      levels: DEFAULT_LEVELS.iter().map(ToString::to_string).collect(),
      baseline: None,
    }
  }
}

impl Config {
  /// Path of the result file for `level`, e.g. `./benchmark_results_O1.csv`.
  pub fn path_for(&self, level: &str) -> PathBuf {
    self.dir.join(format!("{}{level}.{}", self.prefix, self.extension))
  }

  /// The level speedups are computed against, if any level was requested.
  pub fn baseline(&self) -> Option<&str> {
    self.baseline.as_deref().or(self.levels.first().map(String::as_str))
  }

  /// Rejects empty or duplicated labels and a baseline outside the level set.
  pub fn validate(&self) -> Result<()> {
    if self.levels.is_empty() {
      anyhow::bail!("no optimization levels requested");
    }

    for (i, level) in self.levels.iter().enumerate() {
      if level.trim().is_empty() {
        anyhow::bail!("empty optimization level label");
      }
      if self.levels[..i].contains(level) {
        anyhow::bail!("optimization level {level:?} requested twice");
      }
    }

    if let Some(baseline) = &self.baseline {
      if !self.levels.contains(baseline) {
        anyhow::bail!("baseline {baseline:?} is not one of the requested levels {:?}", self.levels);
      }
    }

    Ok(())
  }
}
