use std::{fmt::Write, iter};

use anyhow::Result;

use crate::{
  compare::{Comparison, FunctionComparison, Grid, Summary},
  ext::Cell,
};

const TITLE: &str = "Benchmark comparison across optimization levels";
const RULE_WIDTH: usize = 100;
const COLUMN_PADDING: &str = "  ";

const TIME_PRECISION: usize = 3;
const SPEEDUP_PRECISION: usize = 2;

/// Placeholder for a measurement absent from a result file.
const MISSING: &str = "NaN";
/// Placeholder for a ratio or statistic that cannot be computed.
const UNDEFINED: &str = "n/a";

fn rule() -> String {
  "=".repeat(RULE_WIDTH)
}

fn width(text: &str) -> usize {
  text.chars().count()
}

/// Renders `grid` with a left-aligned label column and right-aligned values,
/// each column as wide as its widest cell.
fn format_grid(grid: &Grid, precision: usize, placeholder: &str) -> Result<String> {
  let rows = grid
    .rows
    .iter()
    .map(|(label, values)| {
      let cells = values
        .iter()
        .map(|value| value.render(precision, placeholder))
        .collect::<Vec<_>>();

      (label.as_str(), cells)
    })
    .collect::<Vec<_>>();

  let label_width = rows
    .iter()
    .map(|(label, _)| width(label))
    .chain(iter::once(width(&grid.label)))
    .max()
    .unwrap_or_default();

  let widths = grid
    .columns
    .iter()
    .enumerate()
    .map(|(i, column)| {
      rows
        .iter()
        .map(|(_, cells)| width(&cells[i]))
        .chain(iter::once(width(column)))
        .max()
        .unwrap_or_default()
    })
    .collect::<Vec<_>>();

  let mut table = String::new();

  let lines = iter::once((grid.label.as_str(), grid.columns.iter().map(String::as_str).collect::<Vec<_>>()))
    .chain(
      rows
        .iter()
        .map(|(label, cells)| (*label, cells.iter().map(String::as_str).collect())),
    );

  for (label, cells) in lines {
    write!(table, "{label:<label_width$}")?;
    for (cell, &column_width) in cells.iter().zip(&widths) {
      write!(table, "{COLUMN_PADDING}{cell:>column_width$}")?;
    }
    writeln!(table)?;
  }

  Ok(table)
}

fn format_ratio(value: Option<f64>) -> String {
  let ratio = value.render(SPEEDUP_PRECISION, UNDEFINED);

  match value {
    Some(_) => format!("{ratio}x"),
    None => ratio,
  }
}

fn format_summary(summary: &Summary) -> String {
  format!(
    "  {}: mean {}, max {}, min {}",
    summary.level,
    format_ratio(summary.mean),
    format_ratio(summary.max),
    format_ratio(summary.min),
  )
}

fn format_banner(comparison: &Comparison) -> Result<String> {
  let mut banner = String::new();
  let levels = comparison.levels.len();

  writeln!(banner, "{}", rule())?;
  writeln!(banner, "{TITLE}")?;
  writeln!(banner, "{}", rule())?;
  writeln!(banner)?;
  writeln!(
    banner,
    "{levels} {} found: {}",
    if levels == 1 { "level" } else { "levels" },
    comparison.levels.join(", ")
  )?;
  writeln!(
    banner,
    "functions: {}",
    comparison
      .functions
      .iter()
      .map(|f| f.function.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  )?;
  writeln!(banner, "test cases: {}", comparison.cases.len())?;
  writeln!(banner)?;

  Ok(banner)
}

fn format_function(function: &FunctionComparison, baseline: Option<&str>) -> Result<String> {
  let mut section = String::new();

  writeln!(section, "{}", rule())?;
  writeln!(section, "function: {}", function.function)?;
  writeln!(section, "{}", rule())?;
  writeln!(section)?;
  writeln!(section, "elapsed time (ms):")?;
  write!(section, "{}", format_grid(&function.times, TIME_PRECISION, MISSING)?)?;

  if let (Some(speedups), Some(baseline)) = (&function.speedups, baseline) {
    writeln!(section)?;
    writeln!(section, "speedup vs {baseline}:")?;
    write!(section, "{}", format_grid(speedups, SPEEDUP_PRECISION, UNDEFINED)?)?;

    if !function.summaries.is_empty() {
      writeln!(section)?;
      writeln!(section, "summary:")?;
      for summary in &function.summaries {
        writeln!(section, "{}", format_summary(summary))?;
      }
    }
  }

  writeln!(section)?;

  Ok(section)
}

fn format_overall(comparison: &Comparison) -> Result<String> {
  let mut section = String::new();

  writeln!(section, "{}", rule())?;
  writeln!(section, "overall (mean over all test cases)")?;
  writeln!(section, "{}", rule())?;
  writeln!(section)?;
  writeln!(section, "mean elapsed time (ms):")?;
  write!(section, "{}", format_grid(&comparison.overall_times, TIME_PRECISION, MISSING)?)?;

  if let (Some(speedups), Some(baseline)) = (&comparison.overall_speedups, &comparison.baseline) {
    writeln!(section)?;
    writeln!(section, "mean speedup vs {baseline}:")?;
    write!(section, "{}", format_grid(speedups, SPEEDUP_PRECISION, UNDEFINED)?)?;
  }

  writeln!(section)?;
  writeln!(section, "{}", rule())?;

  Ok(section)
}

/// Renders the whole report: banner, one section per function, then the
/// overall averages.
pub fn format(comparison: &Comparison) -> Result<String> {
  let mut report = format_banner(comparison)?;

  for function in &comparison.functions {
    report.push_str(&format_function(function, comparison.baseline.as_deref())?);
  }

  report.push_str(&format_overall(comparison)?);

  Ok(report)
}
