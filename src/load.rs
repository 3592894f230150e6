use std::{fs::File, io, io::Read, path::Path};

use anyhow::{Context, Result};

use crate::{
  config::{Config, Level},
  error::{LoadError, NoResultsAvailable},
  table::ResultTable,
};

/// Cell values the harness writes for runs that produced no valid timing.
const MISSING_MARKERS: [&str; 2] = ["FAIL", "NaN"];

/// Result tables of every level that could be loaded, in canonical level order.
#[derive(Debug, Default)]
pub struct Results {
  pub levels: Vec<(Level, ResultTable)>,
}

impl Results {
  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self.levels.iter().map(|(level, _)| level.as_str())
  }

  pub fn get(&self, level: &str) -> Option<&ResultTable> {
    self.levels.iter().find(|(l, _)| l == level).map(|(_, table)| table)
  }
}

/// Loads every level in `config`, skipping (with a notice on stderr) the ones
/// whose file is missing or malformed.
pub fn load_all(config: &Config) -> Result<Results, NoResultsAvailable> {
  let mut results = Results::default();

  for level in &config.levels {
    let path = config.path_for(level);
    eprintln!("loading {level:?} from {path:?}");

    match load(&path, config.delimiter) {
      Ok(table) => results.levels.push((level.clone(), table)),
      Err(err) => eprintln!("skipping {level:?}: {err}"),
    }
  }

  if results.levels.is_empty() {
    return Err(NoResultsAvailable {
      dir: config.dir.clone(),
      looked_for: config
        .levels
        .iter()
        .map(|level| format!("{}{level}.{}", config.prefix, config.extension))
        .collect::<Vec<_>>()
        .join(", "),
    });
  }

  Ok(results)
}

/// Parses the result file at `path`.
pub fn load(path: &Path, delimiter: u8) -> Result<ResultTable, LoadError> {
  let file = File::open(path).map_err(|err| match err.kind() {
    io::ErrorKind::NotFound => LoadError::MissingResultFile { path: path.to_path_buf() },
    _ => LoadError::MalformedInputFile {
      path: path.to_path_buf(),
      reason: err.to_string(),
    },
  })?;

  parse(file, delimiter).map_err(|err| LoadError::MalformedInputFile {
    path: path.to_path_buf(),
    reason: format!("{err:#}"),
  })
}

/// Parses a delimited table whose header names the test cases and whose first
/// column names the functions.
fn parse<R: Read>(reader: R, delimiter: u8) -> Result<ResultTable> {
  let mut reader = csv::ReaderBuilder::new()
    .delimiter(delimiter)
    .has_headers(true)
    .trim(csv::Trim::All)
    .from_reader(reader);

  let header = reader.headers().context("header")?.clone();
  if header.len() < 2 {
    anyhow::bail!("header must name at least one test case");
  }

  let cases = header.iter().skip(1).map(ToString::to_string).collect::<Vec<_>>();
  for (i, case) in cases.iter().enumerate() {
    if case.is_empty() {
      anyhow::bail!("test case {} has an empty name", i + 1);
    }
    if cases[..i].contains(case) {
      anyhow::bail!("test case {case:?} appears twice");
    }
  }

  let mut table = ResultTable::new(cases);

  for record in reader.records() {
    let record = record.context("record")?;
    let line = record.position().map_or(0, csv::Position::line);

    let function = record.get(0).unwrap_or_default();
    if function.is_empty() {
      anyhow::bail!("line {line}: empty function name");
    }
    if table.contains(function) {
      anyhow::bail!("line {line}: function {function:?} appears twice");
    }

    let times = record
      .iter()
      .skip(1)
      .zip(table.cases())
      .map(|(cell, case)| parse_cell(cell).with_context(|| format!("line {line}, case {case:?}")))
      .collect::<Result<Vec<_>>>()?;

    table.push(function.to_string(), times);
  }

  Ok(table)
}

fn parse_cell(cell: &str) -> Result<Option<f64>> {
  if cell.is_empty() || MISSING_MARKERS.iter().any(|marker| cell.eq_ignore_ascii_case(marker)) {
    return Ok(None);
  }

  let time = cell.parse::<f64>().with_context(|| format!("{cell:?} is not a number"))?;
  if !time.is_finite() || time < 0.0 {
    anyhow::bail!("{cell:?} is not a valid elapsed time");
  }

  Ok(Some(time))
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn parse_str(contents: &str) -> Result<ResultTable> {
    parse(contents.as_bytes(), b',')
  }

  #[test]
  fn parses_harness_output() {
    let table = parse_str(
      "optimized version,Small_PowerOfTwo_Square(16x16x16),Small_NonSquare(24x32x16)\n\
       dgemm_naive,0.125,0.500\n\
       dgemm_neon_small, 0.031 ,FAIL\n",
    )
    .unwrap();

    assert_eq!(table.functions(), ["dgemm_naive", "dgemm_neon_small"]);
    assert_eq!(
      table.cases(),
      ["Small_PowerOfTwo_Square(16x16x16)", "Small_NonSquare(24x32x16)"]
    );
    assert_eq!(table.get("dgemm_naive", "Small_NonSquare(24x32x16)"), Some(0.5));
    assert_eq!(table.get("dgemm_neon_small", "Small_PowerOfTwo_Square(16x16x16)"), Some(0.031));
    assert_eq!(table.get("dgemm_neon_small", "Small_NonSquare(24x32x16)"), None);
  }

  #[test]
  fn honors_delimiter() {
    let table = parse("function\tcase1\ngemm_naive\t1.5\n".as_bytes(), b'\t').unwrap();

    assert_eq!(table.get("gemm_naive", "case1"), Some(1.5));
  }

  #[test]
  fn header_only_is_an_empty_table() {
    let table = parse_str("function,case1,case2\n").unwrap();

    assert!(table.functions().is_empty());
    assert_eq!(table.cases(), ["case1", "case2"]);
  }

  #[test]
  fn rejects_malformed_tables() {
    for contents in [
      "",
      "function\n",
      "function,case1\nf,abc\n",
      "function,case1\nf,-1.0\n",
      "function,case1\nf,inf\n",
      "function,case1,case2\nf,1.0\n",
      "function,case1\nf,1.0\nf,2.0\n",
      "function,case1,case1\nf,1.0,2.0\n",
      "function,case1\n,1.0\n",
    ] {
      assert!(parse_str(contents).is_err(), "{contents:?} should be rejected");
    }
  }

  #[test]
  fn missing_file_is_reported_as_missing() {
    let dir = TempDir::new().unwrap();
    let err = load(&dir.path().join("benchmark_results_O3.csv"), b',').unwrap_err();

    assert!(matches!(err, LoadError::MissingResultFile { .. }));
  }

  #[test]
  fn load_all_skips_missing_and_malformed_levels() {
    let dir = TempDir::new().unwrap();
    let config = Config {
      dir: dir.path().to_path_buf(),
      ..Config::default()
    };

    fs::write(config.path_for("O0"), "function,case1\ngemm_naive,100.0\n").unwrap();
    fs::write(config.path_for("O1"), "function,case1\ngemm_naive,oops\n").unwrap();
    fs::write(config.path_for("O2"), "function,case1\ngemm_naive,25.0\n").unwrap();

    let results = load_all(&config).unwrap();

    assert_eq!(results.labels().collect::<Vec<_>>(), ["O0", "O2"]);
    assert_eq!(results.get("O2").unwrap().get("gemm_naive", "case1"), Some(25.0));
    assert!(results.get("O1").is_none());
  }

  #[test]
  fn load_all_without_any_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = Config {
      dir: dir.path().to_path_buf(),
      ..Config::default()
    };

    let err = load_all(&config).unwrap_err();

    assert!(err.looked_for.contains("benchmark_results_O0.csv"));
    assert!(err.looked_for.contains("benchmark_results_O2.csv"));
  }
}
