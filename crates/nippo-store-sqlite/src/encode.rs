//! Encoding between sheet rows and the `cells` column.
//!
//! A row is stored as a compact JSON array of strings, so rows of any width
//! fit the same table.

use crate::Result;

pub fn encode_cells(cells: &[String]) -> Result<String> {
  Ok(serde_json::to_string(cells)?)
}

pub fn decode_cells(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

/// Write `report` over the leading cells of `cells`, keeping anything past
/// the report columns.
pub fn overlay_cells(mut cells: Vec<String>, report: [String; 5]) -> Vec<String> {
  if cells.len() < report.len() {
    cells.resize(report.len(), String::new());
  }
  for (cell, value) in cells.iter_mut().zip(report) {
    *cell = value;
  }
  cells
}

#[cfg(test)]
mod tests {
  use super::*;

  fn strings(cells: &[&str]) -> Vec<String> { cells.iter().map(|s| s.to_string()).collect() }

  #[test]
  fn cells_keep_newlines_and_non_ascii() {
    let cells = vec!["2024-01-01".to_string(), "✅ a\n⬜ b".to_string(), String::new()];
    let encoded = encode_cells(&cells).unwrap();
    assert_eq!(decode_cells(&encoded).unwrap(), cells);
  }

  #[test]
  fn overlay_widens_short_rows_and_keeps_extra_cells() {
    let report = ["d", "t", "o", "r", "m"].map(String::from);
    assert_eq!(overlay_cells(strings(&["x"]), report.clone()), strings(&["d", "t", "o", "r", "m"]));
    assert_eq!(
      overlay_cells(strings(&["1", "2", "3", "4", "5", "extra"]), report),
      strings(&["d", "t", "o", "r", "m", "extra"])
    );
  }
}
