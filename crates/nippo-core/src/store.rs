//! The `ReportStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (`nippo-sheets`,
//! `nippo-store-sqlite`). The HTTP layer depends on this abstraction, not on
//! any concrete backend.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

use crate::{Result, record::ReportRow};

// ─── Row index ───────────────────────────────────────────────────────────────

/// 1-based position of a row in the sheet. Row 1 is the header.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RowIndex(pub u32);

impl RowIndex {
  /// The `A{n}:E{n}` range covering the five report cells of this row.
  pub fn a1_range(self) -> String { format!("A{0}:E{0}", self.0) }
}

impl fmt::Display for RowIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a tabular report store.
///
/// The store is schemaless text: column order on write is entirely the
/// caller's responsibility. A handle is created once per session by the
/// backend's constructor and shared for every operation.
///
/// All methods return `Send` futures so the trait can be used behind `axum`.
pub trait ReportStore: Send + Sync {
  /// Append `row` after the last row. Duplicate dates are accepted.
  fn append_row(
    &self,
    row: ReportRow,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Every row, header included as element 0. Rows are padded with empty
  /// cells to a common width.
  fn fetch_all(&self) -> impl Future<Output = Result<Vec<Vec<String>>>> + Send + '_;

  /// Position of the first data row whose key column equals `key`.
  fn find_row_index<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<RowIndex>> + Send + 'a;

  /// Overwrite the five cells of row `index`; other rows are untouched.
  fn update_row(
    &self,
    index: RowIndex,
    row: ReportRow,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

/// Pad every row to the width of the widest one.
pub fn pad_rows(rows: &mut [Vec<String>]) {
  let width = rows.iter().map(Vec::len).max().unwrap_or(0);
  for row in rows.iter_mut() {
    row.resize(width, String::new());
  }
}
