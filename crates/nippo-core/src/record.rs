//! Report records and the fixed five-column row they persist as.
//!
//! A record is built fresh when the entry form opens and is flattened into a
//! [`ReportRow`] on save. The two item lists never reach the store as
//! structured data; they are encoded into blobs by [`crate::blob`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, blob};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Header names of the persisted sheet, in column order.
pub mod columns {
  pub const DATE: &str = "日付";
  pub const TODO: &str = "TODO";
  pub const OBSTACLES: &str = "障害リスト";
  pub const REFLECTION: &str = "振り返り";
  pub const MEETING_NOTES: &str = "会議メモ";
}

/// The header row, `A1:E1`.
pub const HEADER: [&str; 5] = [
  columns::DATE,
  columns::TODO,
  columns::OBSTACLES,
  columns::REFLECTION,
  columns::MEETING_NOTES,
];

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Key format. Zero padding is what keeps lexicographic order chronological.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

/// Parse a key, rejecting anything but the zero-padded `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  if s.len() != 10 {
    return Err(Error::InvalidDate(s.to_owned()));
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// One entry of the to-do or obstacle list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
  #[serde(default)]
  pub done: bool,
  #[serde(default)]
  pub text: String,
}

impl ReportItem {
  pub fn new(done: bool, text: impl Into<String>) -> Self {
    Self { done, text: text.into() }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The structured, in-memory form of one day's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
  pub date:           NaiveDate,
  pub todo_items:     Vec<ReportItem>,
  pub obstacle_items: Vec<ReportItem>,
  pub reflection:     String,
  pub meeting_notes:  String,
}

impl ReportRecord {
  /// The state of a freshly opened entry form: one blank to-do, one blank
  /// obstacle, empty text.
  pub fn blank(date: NaiveDate) -> Self {
    Self {
      date,
      todo_items: vec![ReportItem::default()],
      obstacle_items: vec![ReportItem::default()],
      reflection: String::new(),
      meeting_notes: String::new(),
    }
  }

  /// Flatten into the persisted column order.
  pub fn to_row(&self) -> ReportRow {
    ReportRow {
      date:          format_date(self.date),
      todo:          blob::encode(&self.todo_items),
      obstacles:     blob::encode(&self.obstacle_items),
      reflection:    self.reflection.clone(),
      meeting_notes: self.meeting_notes.clone(),
    }
  }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// Exactly the five cells written to the store, in column order
/// `[date, todo, obstacles, reflection, meeting_notes]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
  pub date:          String,
  pub todo:          String,
  pub obstacles:     String,
  pub reflection:    String,
  pub meeting_notes: String,
}

impl ReportRow {
  pub fn into_cells(self) -> [String; 5] {
    [
      self.date,
      self.todo,
      self.obstacles,
      self.reflection,
      self.meeting_notes,
    ]
  }

  pub fn from_cells(cells: [String; 5]) -> Self {
    let [date, todo, obstacles, reflection, meeting_notes] = cells;
    Self { date, todo, obstacles, reflection, meeting_notes }
  }

  /// Rows are identified by their key cell, so an empty one cannot be stored.
  pub fn ensure_key(&self) -> Result<()> {
    if self.date.is_empty() {
      return Err(Error::InvalidDate(String::new()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  #[test]
  fn blank_record_has_one_empty_item_per_list() {
    let r = ReportRecord::blank(day("2024-05-01"));
    assert_eq!(r.todo_items, vec![ReportItem::default()]);
    assert_eq!(r.obstacle_items, vec![ReportItem::default()]);
    assert!(r.reflection.is_empty());
    assert!(r.meeting_notes.is_empty());
  }

  #[test]
  fn saving_skips_empty_todo_items() {
    let mut r = ReportRecord::blank(day("2024-05-01"));
    r.todo_items = vec![
      ReportItem::new(true, "check mail"),
      ReportItem::new(false, ""),
    ];
    let row = r.to_row();
    assert_eq!(row.todo, "✅ check mail");
    assert_eq!(row.date, "2024-05-01");
  }

  #[test]
  fn row_cells_follow_column_order() {
    let row = ReportRow {
      date:          "2024-05-01".into(),
      todo:          "t".into(),
      obstacles:     "o".into(),
      reflection:    "r".into(),
      meeting_notes: "m".into(),
    };
    assert_eq!(row.clone().into_cells(), ["2024-05-01", "t", "o", "r", "m"]);
    assert_eq!(ReportRow::from_cells(row.clone().into_cells()), row);
  }

  #[test]
  fn row_without_key_is_rejected() {
    assert!(matches!(ReportRow::default().ensure_key(), Err(Error::InvalidDate(_))));
    let row = ReportRow { date: "2024/05/01".into(), ..Default::default() };
    assert!(row.ensure_key().is_ok());
  }

  #[test]
  fn parse_date_requires_zero_padding() {
    assert!(parse_date("2024-01-02").is_ok());
    assert!(matches!(parse_date("2024-1-2"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("02/01/2024"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date(""), Err(Error::InvalidDate(_))));
  }
}
