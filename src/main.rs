mod compare;
mod config;
mod error;
mod ext;
mod format;
mod load;
mod table;

use std::{
  io::{self, Write},
  path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;

use self::{compare::Comparison, config::Config};

/// Compares matrix-multiplication benchmark results across optimization levels.
///
/// Reads one `<prefix><level>.<extension>` table per level, aligns them by
/// function and test case, and prints raw times, speedups against the baseline
/// level, and overall averages.
#[derive(Parser)]
#[command(version)]
struct Args {
  /// Directory containing the result files [default: .]
  #[arg(long)]
  dir: Option<PathBuf>,
  /// Result file name prefix [default: benchmark_results_]
  #[arg(long)]
  prefix: Option<String>,
  /// Result file extension [default: csv]
  #[arg(long)]
  extension: Option<String>,
  /// Field separator of the result files [default: ,]
  #[arg(long)]
  delimiter: Option<char>,
  /// Optimization levels to compare, in canonical order [default: O0,O1,O2]
  #[arg(long, value_delimiter = ',')]
  levels: Option<Vec<String>>,
  /// Level to compute speedups against [default: the first level]
  #[arg(long)]
  baseline: Option<String>,
  /// Exit with an error when no result file is found.
  #[arg(long)]
  strict: bool,
}

impl Args {
  fn config(&self) -> Result<Config> {
    let default = Config::default();

    let delimiter = match self.delimiter {
      Some(delimiter) if delimiter.is_ascii() => delimiter as u8,
      Some(delimiter) => anyhow::bail!("delimiter {delimiter:?} is not an ASCII character"),
      None => default.delimiter,
    };

    Ok(Config {
      dir: self.dir.clone().unwrap_or(default.dir),
      prefix: self.prefix.clone().unwrap_or(default.prefix),
      extension: self.extension.clone().unwrap_or(default.extension),
      delimiter,
      levels: self.levels.clone().unwrap_or(default.levels),
      baseline: self.baseline.clone(),
    })
  }
}

/// Guidance printed when none of the requested result files exist.
const NO_RESULTS_GUIDANCE: &str =
  "run the benchmarks first (e.g. `make test_all`) to produce one result file per optimization level";

/// Loads, compares and reports, writing the report (or the no-results
/// guidance) to `out`.
fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
  let config = args.config()?;
  config.validate().context("invalid configuration")?;

  let results = match load::load_all(&config) {
    Ok(results) => results,
    Err(err) => {
      writeln!(out, "{err}").context("write")?;
      writeln!(out, "{NO_RESULTS_GUIDANCE}").context("write")?;

      if args.strict {
        return Err(err.into());
      }

      return Ok(());
    }
  };

  let comparison = Comparison::new(&results, config.baseline());

  write!(out, "{}", format::format(&comparison).context("format")?).context("write")?;

  Ok(())
}

fn main() -> Result<()> {
  run(&Args::parse(), &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
  use std::fs;

  use clap::CommandFactory;
  use tempfile::TempDir;

  use super::*;

  fn run_in(dir: &TempDir, extra: &[&str]) -> (Result<()>, String) {
    let dir = dir.path().to_str().unwrap();
    let args = Args::try_parse_from(["optcmp", "--dir", dir].iter().chain(extra)).unwrap();

    let mut out = Vec::new();
    let result = run(&args, &mut out);

    (result, String::from_utf8(out).unwrap())
  }

  #[test]
  fn cli_is_well_formed() {
    Args::command().debug_assert();
  }

  #[test]
  fn no_arguments_uses_defaults() {
    let args = Args::try_parse_from(["optcmp"]).unwrap();

    assert_eq!(args.config().unwrap(), Config::default());
    assert!(!args.strict);
  }

  #[test]
  fn arguments_override_defaults() {
    let args = Args::try_parse_from([
      "optcmp",
      "--dir",
      "results",
      "--levels",
      "O0,O2,O3",
      "--baseline",
      "O2",
      "--extension",
      "tsv",
      "--delimiter",
      "\t",
    ])
    .unwrap();
    let config = args.config().unwrap();

    assert_eq!(config.dir, PathBuf::from("results"));
    assert_eq!(config.levels, ["O0", "O2", "O3"]);
    assert_eq!(config.baseline(), Some("O2"));
    assert_eq!(config.delimiter, b'\t');
    assert_eq!(config.path_for("O3"), PathBuf::from("results/benchmark_results_O3.tsv"));
  }

  #[test]
  fn rejects_multibyte_delimiter() {
    let args = Args::try_parse_from(["optcmp", "--delimiter", "；"]).unwrap();

    assert!(args.config().is_err());
  }

  #[test]
  fn help_is_recognized() {
    let err = Args::try_parse_from(["optcmp", "--help"]).err().unwrap();

    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
  }

  #[test]
  fn no_result_files_prints_guidance() {
    let dir = TempDir::new().unwrap();

    let (result, out) = run_in(&dir, &[]);

    assert!(result.is_ok());
    assert!(out.contains("no result files found"));
    assert!(out.contains("benchmark_results_O1.csv"));
    assert!(out.contains(NO_RESULTS_GUIDANCE));
    assert!(!out.contains("elapsed time"));
  }

  #[test]
  fn strict_turns_no_result_files_into_an_error() {
    let dir = TempDir::new().unwrap();

    let (result, out) = run_in(&dir, &["--strict"]);

    assert!(result.unwrap_err().downcast_ref::<error::NoResultsAvailable>().is_some());
    assert!(out.contains(NO_RESULTS_GUIDANCE));
  }

  #[test]
  fn reports_from_files_with_a_level_missing() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join("benchmark_results_O0.csv"),
      "function,case1,case2\ngemm_naive,100.000,200.000\n",
    )
    .unwrap();
    fs::write(
      dir.path().join("benchmark_results_O2.csv"),
      "function,case1,case2\ngemm_naive,50.000,FAIL\n",
    )
    .unwrap();

    let (result, out) = run_in(&dir, &[]);

    assert!(result.is_ok());
    assert!(out.contains("2 levels found: O0, O2\n"));
    assert!(!out.contains("O1"));
    assert!(out.contains("case1  100.000  50.000\n"));
    assert!(out.contains("case2  200.000     NaN\n"));
    assert!(out.contains("speedup vs O0:\n"));
    assert!(out.contains("  O2: mean 2.00x, max 2.00x, min 2.00x\n"));
    assert!(out.contains("mean speedup vs O0:\n"));
  }

  #[test]
  fn reports_raw_times_only_for_a_single_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join("benchmark_results_O0.csv"),
      "function,case1\ngemm_naive,100.000\n",
    )
    .unwrap();

    let (result, out) = run_in(&dir, &[]);

    assert!(result.is_ok());
    assert!(out.contains("1 level found: O0\n"));
    assert!(out.contains("mean elapsed time (ms):"));
    assert!(!out.contains("speedup"));
    assert!(!out.contains("summary:"));
  }
}
