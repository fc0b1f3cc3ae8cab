//! [`SheetsStore`]: the Google Sheets implementation of [`ReportStore`].

use std::time::Duration;

use nippo_core::{
  record::ReportRow,
  store::{ReportStore, RowIndex, pad_rows},
};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, Result, auth::TokenProvider, credentials::ServiceAccountKey};

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_STORE_NAME: &str = "daily_report_db";

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

// ─── Config ──────────────────────────────────────────────────────────────────

/// Where the report spreadsheet lives.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
  /// Spreadsheet file name, looked up through Drive.
  pub store_name:      String,
  /// Skips the Drive lookup when set.
  pub spreadsheet_id:  Option<String>,
  pub sheets_api_base: String,
  pub drive_api_base:  String,
}

impl Default for SheetsConfig {
  fn default() -> Self {
    Self {
      store_name:      DEFAULT_STORE_NAME.to_owned(),
      spreadsheet_id:  None,
      sheets_api_base: DEFAULT_SHEETS_API_BASE.to_owned(),
      drive_api_base:  DEFAULT_DRIVE_API_BASE.to_owned(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FileList {
  #[serde(default)]
  files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
  id: String,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
  #[serde(default)]
  sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
  properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
  title: String,
  #[serde(default)]
  index: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  range:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  major_dimension: Option<String>,
  #[serde(default)]
  values:          Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
  #[serde(default)]
  updates: Option<UpdateResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
  #[serde(default)]
  updated_range: Option<String>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An authorised handle on the first worksheet of the report spreadsheet.
///
/// Create one per process with [`SheetsStore::connect`] and share it.
pub struct SheetsStore {
  http:           Client,
  auth:           TokenProvider,
  sheets_base:    String,
  spreadsheet_id: String,
  sheet_title:    String,
}

impl SheetsStore {
  /// Authorise with `key`, locate the spreadsheet and select its first sheet.
  ///
  /// Any failure here (bad key, network, missing spreadsheet) is a
  /// [`nippo_core::Error::Connection`].
  pub async fn connect(
    key: ServiceAccountKey,
    config: SheetsConfig,
  ) -> nippo_core::Result<Self> {
    Self::open(key, config).await.map_err(nippo_core::Error::connection)
  }

  async fn open(key: ServiceAccountKey, config: SheetsConfig) -> Result<Self> {
    let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let auth = TokenProvider::new(key, http.clone());
    // Fail early on a key the token endpoint rejects.
    auth.access_token().await?;

    let mut store = Self {
      http,
      auth,
      sheets_base: config.sheets_api_base.trim_end_matches('/').to_owned(),
      spreadsheet_id: String::new(),
      sheet_title: String::new(),
    };

    store.spreadsheet_id = match config.spreadsheet_id {
      Some(id) => id,
      None => {
        store
          .find_spreadsheet(config.drive_api_base.trim_end_matches('/'), &config.store_name)
          .await?
      }
    };
    store.sheet_title = store.first_sheet_title().await?;

    tracing::info!(
      account = %store.auth.client_email(),
      spreadsheet = %store.spreadsheet_id,
      sheet = %store.sheet_title,
      "connected to report spreadsheet"
    );
    Ok(store)
  }

  pub fn spreadsheet_id(&self) -> &str { &self.spreadsheet_id }

  pub fn sheet_title(&self) -> &str { &self.sheet_title }

  // ── Request helpers ───────────────────────────────────────────────────────

  async fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    Ok(req.bearer_auth(self.auth.access_token().await?))
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = self.authorized(req).await?.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Api { status, body });
    }
    Ok(resp.json().await?)
  }

  /// `{sheets}/spreadsheets/{id}/values/{range}` with `range` qualified by
  /// the sheet title and percent-encoded.
  fn values_url(&self, a1: Option<&str>) -> String {
    let range = a1_range(&self.sheet_title, a1);
    format!(
      "{}/spreadsheets/{}/values/{}",
      self.sheets_base,
      self.spreadsheet_id,
      urlencoding::encode(&range)
    )
  }

  // ── Connection setup ──────────────────────────────────────────────────────

  async fn find_spreadsheet(&self, drive_base: &str, name: &str) -> Result<String> {
    let query = format!(
      "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
      name.replace('\\', "\\\\").replace('\'', "\\'")
    );
    let list: FileList = self
      .send(self.http.get(format!("{drive_base}/files")).query(&[
        ("q", query.as_str()),
        ("fields", "files(id,name)"),
        ("supportsAllDrives", "true"),
        ("includeItemsFromAllDrives", "true"),
      ]))
      .await?;

    list
      .files
      .into_iter()
      .next()
      .map(|f| f.id)
      .ok_or_else(|| Error::SpreadsheetNotFound(name.to_owned()))
  }

  async fn first_sheet_title(&self) -> Result<String> {
    let spreadsheet: Spreadsheet = self
      .send(
        self
          .http
          .get(format!("{}/spreadsheets/{}", self.sheets_base, self.spreadsheet_id))
          .query(&[("fields", "sheets.properties")]),
      )
      .await?;

    spreadsheet
      .sheets
      .into_iter()
      .map(|s| s.properties)
      .min_by_key(|p| p.index)
      .map(|p| p.title)
      .ok_or_else(|| Error::NoWorksheet(self.spreadsheet_id.clone()))
  }

  // ── Raw operations ────────────────────────────────────────────────────────

  async fn append_values(&self, cells: Vec<String>) -> Result<Option<String>> {
    let body = ValueRange { range: None, major_dimension: None, values: vec![cells] };
    let resp: AppendResponse = self
      .send(
        self
          .http
          .post(format!("{}:append", self.values_url(Some("A1"))))
          .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
          .json(&body),
      )
      .await?;
    Ok(resp.updates.and_then(|u| u.updated_range))
  }

  async fn get_values(&self) -> Result<Vec<Vec<String>>> {
    let range: ValueRange = self
      .send(
        self
          .http
          .get(self.values_url(None))
          .query(&[("majorDimension", "ROWS")]),
      )
      .await?;
    let mut rows = range.values;
    pad_rows(&mut rows);
    Ok(rows)
  }

  async fn put_values(&self, index: RowIndex, cells: Vec<String>) -> Result<()> {
    let a1 = index.a1_range();
    let body = ValueRange {
      range:           Some(a1_range(&self.sheet_title, Some(&a1))),
      major_dimension: Some("ROWS".to_owned()),
      values:          vec![cells],
    };
    let _: serde_json::Value = self
      .send(
        self
          .http
          .put(self.values_url(Some(&a1)))
          .query(&[("valueInputOption", "RAW")])
          .json(&body),
      )
      .await?;
    Ok(())
  }
}

/// `'Sheet Title'!A1`. The title is always quoted, with `'` doubled.
fn a1_range(sheet_title: &str, a1: Option<&str>) -> String {
  let quoted = format!("'{}'", sheet_title.replace('\'', "''"));
  match a1 {
    Some(a1) => format!("{quoted}!{a1}"),
    None => quoted,
  }
}

/// Sheet position of the first data row whose first cell is `key`. Rows with
/// an empty key never match.
fn scan_key_column(rows: &[Vec<String>], key: &str) -> Option<RowIndex> {
  rows
    .iter()
    .enumerate()
    .skip(1)
    .find(|(_, row)| row.first().is_some_and(|cell| !cell.is_empty() && cell == key))
    .map(|(i, _)| RowIndex(i as u32 + 1))
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SheetsStore {
  async fn append_row(&self, row: ReportRow) -> nippo_core::Result<()> {
    row.ensure_key()?;
    let date = row.date.clone();
    let updated = self
      .append_values(row.into_cells().to_vec())
      .await
      .map_err(|e| {
        tracing::warn!(%date, error = %e, "append failed");
        nippo_core::Error::write(e)
      })?;
    tracing::info!(%date, range = updated.as_deref().unwrap_or("?"), "appended report row");
    Ok(())
  }

  async fn fetch_all(&self) -> nippo_core::Result<Vec<Vec<String>>> {
    let rows = self.get_values().await.map_err(nippo_core::Error::read)?;
    tracing::debug!(rows = rows.len(), "fetched sheet");
    Ok(rows)
  }

  async fn find_row_index(&self, key: &str) -> nippo_core::Result<RowIndex> {
    if key.is_empty() {
      return Err(nippo_core::Error::NotFound("empty key".to_owned()));
    }
    let rows = self.get_values().await.map_err(nippo_core::Error::read)?;
    scan_key_column(&rows, key)
      .ok_or_else(|| nippo_core::Error::NotFound(format!("no row with key {key:?}")))
  }

  async fn update_row(&self, index: RowIndex, row: ReportRow) -> nippo_core::Result<()> {
    row.ensure_key()?;
    let date = row.date.clone();
    self
      .put_values(index, row.into_cells().to_vec())
      .await
      .map_err(|e| {
        tracing::warn!(%date, row = %index, error = %e, "update failed");
        nippo_core::Error::write(e)
      })?;
    tracing::info!(%date, row = %index, "updated report row");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
    cells
      .iter()
      .map(|r| r.iter().map(|c| c.to_string()).collect())
      .collect()
  }

  #[test]
  fn a1_range_quotes_sheet_title() {
    assert_eq!(a1_range("Sheet1", Some("A2:E2")), "'Sheet1'!A2:E2");
    assert_eq!(a1_range("Bob's log", None), "'Bob''s log'");
  }

  #[test]
  fn scan_skips_header_and_other_columns() {
    let sheet = rows(&[
      &["日付", "TODO"],
      &["2024-01-01", "2024-01-02 mentioned here"],
      &[],
      &["2024-01-02", ""],
    ]);
    assert_eq!(scan_key_column(&sheet, "2024-01-02"), Some(RowIndex(4)));
    assert_eq!(scan_key_column(&sheet, "日付"), None);
    assert_eq!(scan_key_column(&sheet, "2024-01-03"), None);
    assert_eq!(scan_key_column(&sheet, ""), None);
  }
}
