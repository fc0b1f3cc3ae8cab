//! Integration tests for `SqliteSheet` against an in-memory database.

use nippo_core::{
  Error,
  history::list_history,
  record::{HEADER, ReportItem, ReportRecord, ReportRow, parse_date},
  store::{ReportStore, RowIndex},
};

use crate::SqliteSheet;

async fn store() -> SqliteSheet {
  SqliteSheet::open_in_memory()
    .await
    .expect("in-memory store")
}

fn report_row(date: &str, todo: &str) -> ReportRow {
  ReportRow {
    date:          date.into(),
    todo:          todo.into(),
    obstacles:     "⬜ flaky CI".into(),
    reflection:    "went fine".into(),
    meeting_notes: "standup: nothing new".into(),
  }
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_sheet_holds_only_the_header() {
  let s = store().await;
  let rows = s.fetch_all().await.unwrap();
  assert_eq!(rows, vec![HEADER.map(String::from).to_vec()]);
}

#[tokio::test]
async fn reopening_a_file_does_not_reseed_the_header() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("reports.db");

  {
    let s = SqliteSheet::open(&path).await.unwrap();
    s.append_row(report_row("2024-01-01", "⬜ a")).await.unwrap();
  }
  let s = SqliteSheet::open(&path).await.unwrap();
  let rows = s.fetch_all().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0][0], "日付");
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn appended_row_is_fetched_unchanged() {
  let s = store().await;
  let row = report_row("2024-01-02", "✅ check mail\n⬜ write report");
  s.append_row(row.clone()).await.unwrap();

  let rows = s.fetch_all().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[1], row.into_cells().to_vec());
}

#[tokio::test]
async fn duplicate_dates_are_appended() {
  let s = store().await;
  s.append_row(report_row("2024-01-02", "first")).await.unwrap();
  s.append_row(report_row("2024-01-02", "second")).await.unwrap();

  let rows = s.fetch_all().await.unwrap();
  assert_eq!(rows.len(), 3);
  assert_eq!(s.find_row_index("2024-01-02").await.unwrap(), RowIndex(2));
}

#[tokio::test]
async fn saving_a_record_persists_encoded_blobs() {
  let s = store().await;
  let mut record = ReportRecord::blank(parse_date("2024-06-03").unwrap());
  record.todo_items = vec![
    ReportItem::new(true, "check mail"),
    ReportItem::new(false, ""),
  ];
  s.append_row(record.to_row()).await.unwrap();

  let rows = s.fetch_all().await.unwrap();
  let history = list_history(&rows).unwrap();
  assert_eq!(history[0].todo().unwrap(), "✅ check mail");
  assert_eq!(history[0].obstacles().unwrap(), "");
}

// ─── Find ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_returns_position_of_fresh_key() {
  let s = store().await;
  s.append_row(report_row("2024-01-01", "a")).await.unwrap();
  s.append_row(report_row("2024-01-02", "b")).await.unwrap();
  s.append_row(report_row("2024-01-03", "c")).await.unwrap();

  assert_eq!(s.find_row_index("2024-01-03").await.unwrap(), RowIndex(4));
  assert_eq!(s.find_row_index("2024-01-01").await.unwrap(), RowIndex(2));
}

#[tokio::test]
async fn find_only_matches_the_key_column() {
  let s = store().await;
  let mut mentions = report_row("2024-01-01", "a");
  mentions.reflection = "2024-01-05 will be busy".into();
  s.append_row(mentions).await.unwrap();
  s.append_row(report_row("2024-01-05", "b")).await.unwrap();

  assert_eq!(s.find_row_index("2024-01-05").await.unwrap(), RowIndex(3));
}

#[tokio::test]
async fn find_missing_key_is_not_found() {
  let s = store().await;
  s.append_row(report_row("2024-01-01", "a")).await.unwrap();

  assert!(matches!(
    s.find_row_index("2024-12-31").await,
    Err(Error::NotFound(_))
  ));
  // The header row is never a match.
  assert!(matches!(s.find_row_index("日付").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn rows_with_an_empty_key_are_never_found() {
  let s = store().await;
  // A row typed into the sheet without a date.
  s.insert_row(vec![String::new(), "orphan".into()]).await.unwrap();
  s.append_row(report_row("2024-01-01", "a")).await.unwrap();

  assert!(matches!(s.find_row_index("").await, Err(Error::NotFound(_))));
  assert_eq!(s.find_row_index("2024-01-01").await.unwrap(), RowIndex(3));
}

#[tokio::test]
async fn rows_without_a_key_are_not_written() {
  let s = store().await;
  s.append_row(report_row("2024-01-01", "a")).await.unwrap();
  let before = s.fetch_all().await.unwrap();

  assert!(matches!(
    s.append_row(report_row("", "x")).await,
    Err(Error::InvalidDate(_))
  ));
  assert!(matches!(
    s.update_row(RowIndex(2), report_row("", "x")).await,
    Err(Error::InvalidDate(_))
  ));
  assert_eq!(s.fetch_all().await.unwrap(), before);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_only_the_target_row() {
  let s = store().await;
  s.append_row(report_row("2024-01-01", "a")).await.unwrap();
  s.append_row(report_row("2024-01-02", "b")).await.unwrap();
  s.append_row(report_row("2024-01-03", "c")).await.unwrap();
  let before = s.fetch_all().await.unwrap();

  let index = s.find_row_index("2024-01-02").await.unwrap();
  let replacement = ReportRow {
    date:          "2024-01-02".into(),
    todo:          "✅ b".into(),
    obstacles:     String::new(),
    reflection:    "edited".into(),
    meeting_notes: "edited notes".into(),
  };
  s.update_row(index, replacement.clone()).await.unwrap();

  let after = s.fetch_all().await.unwrap();
  assert_eq!(after.len(), before.len());
  assert_eq!(after[2], replacement.into_cells().to_vec());
  assert_eq!(after[0], before[0]);
  assert_eq!(after[1], before[1]);
  assert_eq!(after[3], before[3]);
}

#[tokio::test]
async fn update_missing_row_is_not_found() {
  let s = store().await;
  let result = s.update_row(RowIndex(9), report_row("2024-01-01", "a")).await;
  assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn update_keeps_cells_beyond_column_e() {
  let s = SqliteSheet::open_in_memory_with_header(&[
    "日付", "TODO", "障害リスト", "振り返り", "会議メモ", "extra",
  ])
  .await
  .unwrap();
  s.insert_row(vec![
    "2024-01-01".into(),
    "a".into(),
    "b".into(),
    "c".into(),
    "d".into(),
    "kept".into(),
  ])
  .await
  .unwrap();

  s.update_row(RowIndex(2), report_row("2024-01-01", "new")).await.unwrap();

  let rows = s.fetch_all().await.unwrap();
  assert_eq!(rows[1][1], "new");
  assert_eq!(rows[1][5], "kept");
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_is_newest_first() {
  let s = store().await;
  for date in ["2024-01-02", "2024-01-10", "2024-01-01"] {
    s.append_row(report_row(date, "x")).await.unwrap();
  }
  let rows = s.fetch_all().await.unwrap();
  let dates: Vec<String> = list_history(&rows)
    .unwrap()
    .iter()
    .map(|r| r.date().unwrap().to_owned())
    .collect();
  assert_eq!(dates, ["2024-01-10", "2024-01-02", "2024-01-01"]);
}
