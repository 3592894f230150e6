use crate::{
  config::Level,
  ext::Samples,
  load::Results,
  table::ResultTable,
};

/// Label of the whole-suite row appended to the overall tables.
pub const ALL_FUNCTIONS: &str = "all functions";

/// A table with one column per optimization level. Cells are `None` when the
/// value is missing (raw times) or undefined (speedups).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
  /// Header of the row label column.
  pub label: String,
  pub columns: Vec<Level>,
  pub rows: Vec<(String, Vec<Option<f64>>)>,
}

impl Grid {
  pub fn column(&self, level: &str) -> Option<impl Iterator<Item = Option<f64>> + '_> {
    let index = self.columns.iter().position(|l| l == level)?;

    Some(self.rows.iter().map(move |(_, values)| values[index]))
  }

  /// `baseline / value` for every cell, or `None` if `baseline` is not a column.
  /// A ratio is undefined when either side is missing or zero, or when it
  /// overflows.
  pub fn speedups(&self, baseline: &str) -> Option<Grid> {
    let index = self.columns.iter().position(|l| l == baseline)?;

    let rows = self
      .rows
      .iter()
      .map(|(label, values)| {
        let base = values[index];
        let ratios = values.iter().map(|value| speedup(base, *value)).collect();

        (label.clone(), ratios)
      })
      .collect();

    Some(Grid {
      label: self.label.clone(),
      columns: self.columns.clone(),
      rows,
    })
  }

  /// Mean, max and min of each non-baseline column over its defined values.
  pub fn summaries(&self, baseline: &str) -> Vec<Summary> {
    self
      .columns
      .iter()
      .filter(|level| *level != baseline)
      .map(|level| {
        let defined = self
          .column(level)
          .into_iter()
          .flatten()
          .flatten()
          .collect::<Vec<_>>();

        Summary {
          level: level.clone(),
          mean: defined.mean(),
          max: defined.max_value(),
          min: defined.min_value(),
        }
      })
      .collect()
  }
}

fn speedup(base: Option<f64>, value: Option<f64>) -> Option<f64> {
  match (base, value) {
    (Some(base), Some(value)) if base != 0.0 && value != 0.0 => {
      Some(base / value).filter(|ratio| ratio.is_finite())
    }
    _ => None,
  }
}

/// Aggregate speedup of one level against the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
  pub level: Level,
  pub mean: Option<f64>,
  pub max: Option<f64>,
  pub min: Option<f64>,
}

/// Comparison of a single function across levels.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionComparison {
  pub function: String,
  /// Test cases by levels, in milliseconds.
  pub times: Grid,
  /// Present only when the baseline level was loaded.
  pub speedups: Option<Grid>,
  pub summaries: Vec<Summary>,
}

/// Everything the report prints, fully computed before any formatting starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
  /// Loaded levels, sorted by label.
  pub levels: Vec<Level>,
  /// The speedup denominator, if it was loaded.
  pub baseline: Option<Level>,
  pub functions: Vec<FunctionComparison>,
  pub cases: Vec<String>,
  /// Mean time per function (plus the whole-suite row) by levels.
  pub overall_times: Grid,
  pub overall_speedups: Option<Grid>,
}

impl Comparison {
  /// Aligns every loaded table by function and test case. `baseline` is only
  /// used if it is among the loaded levels and at least one other level loaded.
  pub fn new(results: &Results, baseline: Option<&str>) -> Self {
    let mut levels = results.labels().map(ToString::to_string).collect::<Vec<_>>();
    levels.sort();

    let tables = levels
      .iter()
      .filter_map(|level| results.get(level))
      .collect::<Vec<_>>();

    let baseline = baseline
      .filter(|_| levels.len() > 1)
      .filter(|baseline| levels.iter().any(|level| level == baseline))
      .map(ToString::to_string);

    let function_names = union(results.levels.iter().map(|(_, table)| table.functions()));
    let cases = union(results.levels.iter().map(|(_, table)| table.cases()));

    let functions = function_names
      .iter()
      .map(|function| {
        let times = Grid {
          label: "case".to_string(),
          columns: levels.clone(),
          rows: cases
            .iter()
            .map(|case| {
              let values = tables.iter().map(|table| table.get(function, case)).collect();
              (case.clone(), values)
            })
            .collect(),
        };

        let speedups = baseline.as_deref().and_then(|baseline| times.speedups(baseline));
        let summaries = match (&speedups, baseline.as_deref()) {
          (Some(speedups), Some(baseline)) => speedups.summaries(baseline),
          _ => Vec::new(),
        };

        FunctionComparison {
          function: function.clone(),
          times,
          speedups,
          summaries,
        }
      })
      .collect();

    let overall_times = overall(&levels, &tables, &function_names);
    let overall_speedups = baseline.as_deref().and_then(|baseline| overall_times.speedups(baseline));

    Self {
      levels,
      baseline,
      functions,
      cases,
      overall_times,
      overall_speedups,
    }
  }
}

/// Per-function mean times, followed by the mean of those means.
fn overall(levels: &[Level], tables: &[&ResultTable], functions: &[String]) -> Grid {
  let mut rows = functions
    .iter()
    .map(|function| {
      let means = tables.iter().map(|table| table.row_mean(function)).collect();
      (function.clone(), means)
    })
    .collect::<Vec<(String, Vec<Option<f64>>)>>();

  let suite = (0..levels.len())
    .map(|index| {
      let means = rows.iter().filter_map(|(_, means)| means[index]).collect::<Vec<_>>();
      means.mean()
    })
    .collect();
  rows.push((ALL_FUNCTIONS.to_string(), suite));

  Grid {
    label: "function".to_string(),
    columns: levels.to_vec(),
    rows,
  }
}

/// Names in order of first appearance across `lists`.
fn union<'a>(lists: impl IntoIterator<Item = &'a [String]>) -> Vec<String> {
  let mut names: Vec<String> = Vec::new();
  for name in lists.into_iter().flatten() {
    if !names.contains(name) {
      names.push(name.clone());
    }
  }

  names
}
