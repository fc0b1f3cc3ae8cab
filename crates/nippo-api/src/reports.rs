//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/new` | Blank entry form for today |
//! | `POST` | `/reports` | Body: [`DraftBody`]; returns 201 + stored row |
//! | `GET`  | `/reports` | Stored dates, newest first |
//! | `GET`  | `/reports/{date}` | First report with that date |
//! | `PUT`  | `/reports/{date}` | Body: [`EditBody`]; overwrites that row |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use nippo_core::{
  Error, blob,
  history::{self, StoredReport},
  record::{ReportItem, ReportRecord, ReportRow, parse_date},
  store::ReportStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

fn today() -> NaiveDate { Local::now().date_naive() }

// ─── New ──────────────────────────────────────────────────────────────────────

/// `GET /reports/new`
pub async fn new_draft() -> Json<ReportRecord> { Json(ReportRecord::blank(today())) }

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reports`.
#[derive(Debug, Deserialize)]
pub struct DraftBody {
  /// `YYYY-MM-DD`; defaults to today.
  pub date:           Option<String>,
  #[serde(default)]
  pub todo_items:     Vec<ReportItem>,
  #[serde(default)]
  pub obstacle_items: Vec<ReportItem>,
  #[serde(default)]
  pub reflection:     String,
  #[serde(default)]
  pub meeting_notes:  String,
}

impl DraftBody {
  fn into_record(self) -> Result<ReportRecord, Error> {
    let date = match self.date.as_deref() {
      Some(d) => parse_date(d)?,
      None => today(),
    };
    Ok(ReportRecord {
      date,
      todo_items: self.todo_items,
      obstacle_items: self.obstacle_items,
      reflection: self.reflection,
      meeting_notes: self.meeting_notes,
    })
  }
}

/// `POST /reports`: returns 201 + the [`ReportRow`] as written.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<DraftBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReportStore,
{
  let row = body.into_record()?.to_row();
  store.append_row(row.clone()).await?;
  Ok((StatusCode::CREATED, Json(row)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /reports`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<String>>, ApiError>
where
  S: ReportStore,
{
  let rows = store.fetch_all().await?;
  let dates = history::list_history(&rows)?
    .iter()
    .map(|r| r.date().map(str::to_owned))
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Json(dates))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// A stored report as shown in the history view: the opaque cell text plus
/// the item lists decoded from it.
#[derive(Debug, Serialize)]
pub struct ReportView {
  pub date:           String,
  pub todo:           String,
  pub obstacles:      String,
  pub reflection:     String,
  pub meeting_notes:  String,
  pub todo_items:     Vec<ReportItem>,
  pub obstacle_items: Vec<ReportItem>,
}

impl TryFrom<&StoredReport> for ReportView {
  type Error = Error;

  fn try_from(report: &StoredReport) -> Result<Self, Error> {
    let ReportRow { date, todo, obstacles, reflection, meeting_notes } = report.to_row()?;
    Ok(Self {
      todo_items: blob::decode(&todo),
      obstacle_items: blob::decode(&obstacles),
      date,
      todo,
      obstacles,
      reflection,
      meeting_notes,
    })
  }
}

/// `GET /reports/{date}`. The path segment is matched verbatim against the
/// stored keys, so a hand-entered key from the listing opens too.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<String>,
) -> Result<Json<ReportView>, ApiError>
where
  S: ReportStore,
{
  let rows = store.fetch_all().await?;
  let history = history::list_history(&rows)?;
  let report = history::select(&history, &date)
    .ok_or_else(|| Error::NotFound(format!("no report for {date}")))?;
  Ok(Json(ReportView::try_from(report)?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /reports/{date}`: the edited cell text.
#[derive(Debug, Deserialize)]
pub struct EditBody {
  #[serde(default)]
  pub todo:          String,
  #[serde(default)]
  pub obstacles:     String,
  #[serde(default)]
  pub reflection:    String,
  #[serde(default)]
  pub meeting_notes: String,
}

/// `PUT /reports/{date}`: returns 204. The row is located by its key column,
/// matched verbatim; nothing is written if the key is absent.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<String>,
  Json(body): Json<EditBody>,
) -> Result<StatusCode, ApiError>
where
  S: ReportStore,
{
  let index = store.find_row_index(&date).await?;
  let row = ReportRow {
    date,
    todo:          body.todo,
    obstacles:     body.obstacles,
    reflection:    body.reflection,
    meeting_notes: body.meeting_notes,
  };
  store.update_row(index, row).await?;
  Ok(StatusCode::NO_CONTENT)
}
