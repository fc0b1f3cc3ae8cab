//! Reading fetched rows back as reports.
//!
//! Fetched rows are plain strings. A [`StoredReport`] maps them through the
//! header row, so a column is found by name rather than by position and a
//! renamed or missing column only breaks the fields that read it.

use std::collections::HashMap;

use crate::{
  Error, Result,
  record::{ReportRow, columns},
};

/// One fetched data row, keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
  fields: HashMap<String, String>,
}

impl StoredReport {
  /// Pair `row` with `header`. Cells past the end of a short row read as
  /// empty; for repeated header names the leftmost column wins.
  pub fn from_row(header: &[String], row: &[String]) -> Self {
    let mut fields = HashMap::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
      let value = row.get(i).cloned().unwrap_or_default();
      fields.entry(name.clone()).or_insert(value);
    }
    Self { fields }
  }

  /// Value of `column`, or [`Error::Schema`] if the header lacks it.
  pub fn get(&self, column: &str) -> Result<&str> {
    self
      .fields
      .get(column)
      .map(String::as_str)
      .ok_or_else(|| Error::Schema(column.to_owned()))
  }

  pub fn date(&self) -> Result<&str> { self.get(columns::DATE) }

  pub fn todo(&self) -> Result<&str> { self.get(columns::TODO) }

  pub fn obstacles(&self) -> Result<&str> { self.get(columns::OBSTACLES) }

  pub fn reflection(&self) -> Result<&str> { self.get(columns::REFLECTION) }

  pub fn meeting_notes(&self) -> Result<&str> { self.get(columns::MEETING_NOTES) }

  /// All five fields, failing on the first missing column.
  pub fn to_row(&self) -> Result<ReportRow> {
    Ok(ReportRow {
      date:          self.date()?.to_owned(),
      todo:          self.todo()?.to_owned(),
      obstacles:     self.obstacles()?.to_owned(),
      reflection:    self.reflection()?.to_owned(),
      meeting_notes: self.meeting_notes()?.to_owned(),
    })
  }
}

/// Turn the output of `fetch_all` into the history list.
///
/// Row 0 is the header. Rows with an empty key are dropped; the rest are
/// ordered by key descending, compared as strings. The sort is stable, so of
/// two rows sharing a key the one stored first stays first.
pub fn list_history(rows: &[Vec<String>]) -> Result<Vec<StoredReport>> {
  let Some((header, data)) = rows.split_first() else {
    return Ok(Vec::new());
  };
  if data.is_empty() {
    return Ok(Vec::new());
  }
  if !header.iter().any(|h| h == columns::DATE) {
    return Err(Error::Schema(columns::DATE.to_owned()));
  }

  let mut reports: Vec<StoredReport> = data
    .iter()
    .map(|row| StoredReport::from_row(header, row))
    .filter(|r| r.date().is_ok_and(|d| !d.is_empty()))
    .collect();

  reports.sort_by(|a, b| {
    let a = a.date().unwrap_or_default();
    let b = b.date().unwrap_or_default();
    b.cmp(a)
  });
  Ok(reports)
}

/// The first listed report with key `date`.
pub fn select<'a>(history: &'a [StoredReport], date: &str) -> Option<&'a StoredReport> {
  history.iter().find(|r| r.date().is_ok_and(|d| d == date))
}
