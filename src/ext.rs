#[extend::ext(name = Samples)]
pub impl [f64] {
  /// Arithmetic mean, or `None` for an empty slice.
  fn mean(&self) -> Option<f64> {
    if self.is_empty() {
      return None;
    }

    Some(self.iter().sum::<f64>() / self.len() as f64)
  }

  fn max_value(&self) -> Option<f64> {
    self.iter().copied().reduce(f64::max)
  }

  fn min_value(&self) -> Option<f64> {
    self.iter().copied().reduce(f64::min)
  }
}

#[extend::ext(name = Cell)]
pub impl Option<f64> {
  /// Renders a table cell with `precision` decimals, or `placeholder` when the
  /// value is absent.
  fn render(&self, precision: usize, placeholder: &str) -> String {
    match self {
      Some(value) => format!("{value:.precision$}"),
      None => placeholder.to_string(),
    }
  }
}
