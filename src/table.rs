use std::collections::BTreeMap;

use crate::ext::Samples;

/// Elapsed times in milliseconds for one optimization level, indexed by
/// function name (rows) and test case name (columns). Cells the harness could
/// not measure are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
  /// Function names, in file order.
  functions: Vec<String>,
  /// Test case names, in file order.
  cases: Vec<String>,
  times: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ResultTable {
  pub fn new(cases: Vec<String>) -> Self {
    Self {
      functions: Vec::new(),
      cases,
      times: BTreeMap::new(),
    }
  }

  /// Appends a row. `times` is matched positionally against the case columns;
  /// `None` marks a missing measurement.
  pub fn push(&mut self, function: String, times: Vec<Option<f64>>) {
    let row = self
      .cases
      .iter()
      .zip(times)
      .filter_map(|(case, time)| Some((case.clone(), time?)))
      .collect();

    self.times.insert(function.clone(), row);
    self.functions.push(function);
  }

  pub fn functions(&self) -> &[String] {
    &self.functions
  }

  pub fn cases(&self) -> &[String] {
    &self.cases
  }

  pub fn contains(&self, function: &str) -> bool {
    self.times.contains_key(function)
  }

  /// Elapsed time of `function` on `case`, or `None` if either is unknown or
  /// the measurement is missing.
  pub fn get(&self, function: &str, case: &str) -> Option<f64> {
    self.times.get(function)?.get(case).copied()
  }

  /// Mean over the measured cases of `function`.
  pub fn row_mean(&self, function: &str) -> Option<f64> {
    let row = self.times.get(function)?;
    let times = self
      .cases
      .iter()
      .filter_map(|case| row.get(case).copied())
      .collect::<Vec<_>>();

    times.mean()
  }

  #[cfg(test)]
  pub fn from_rows(cases: &[&str], rows: &[(&str, &[Option<f64>])]) -> Self {
    let mut table = Self::new(cases.iter().map(ToString::to_string).collect());
    for (function, times) in rows {
      table.push(function.to_string(), times.to_vec());
    }

    table
  }
}
