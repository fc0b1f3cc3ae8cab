//! [`SqliteSheet`]: the SQLite implementation of [`ReportStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use nippo_core::{
  record::{HEADER, ReportRow},
  store::{ReportStore, RowIndex, pad_rows},
};

use crate::{
  Result,
  encode::{decode_cells, encode_cells, overlay_cells},
  schema::{SCHEMA, SEED_HEADER},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A report sheet backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSheet {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSheet {
  /// Open (or create) a sheet at `path`. A new sheet starts with the report
  /// header in row 1.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(&HEADER).await?;
    Ok(store)
  }

  /// Open an in-memory sheet, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with_header(&HEADER).await
  }

  /// Open an in-memory sheet whose row 1 is `header` instead of the report
  /// header.
  pub async fn open_in_memory_with_header(header: &[&str]) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(header).await?;
    Ok(store)
  }

  async fn init_schema(&self, header: &[&str]) -> Result<()> {
    let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
    let header_json = encode_cells(&header)?;
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute(SEED_HEADER, rusqlite::params![header_json])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) async fn insert_row(&self, cells: Vec<String>) -> Result<RowIndex> {
    let cells_json = encode_cells(&cells)?;
    let row_num: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO sheet_rows (row_num, cells)
           VALUES ((SELECT COALESCE(MAX(row_num), 0) + 1 FROM sheet_rows), ?1)
           RETURNING row_num",
          rusqlite::params![cells_json],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(RowIndex(row_num as u32))
  }

  async fn select_rows(&self) -> Result<Vec<Vec<String>>> {
    let raws: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT cells FROM sheet_rows ORDER BY row_num")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut rows = raws
      .iter()
      .map(|cells| decode_cells(cells))
      .collect::<Result<Vec<_>>>()?;
    pad_rows(&mut rows);
    Ok(rows)
  }

  /// First data row whose key cell equals `key`. Rows with an empty key
  /// never match.
  async fn select_key(&self, key: String) -> Result<Option<RowIndex>> {
    let row_num: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT row_num FROM sheet_rows
             WHERE row_num > 1
               AND json_extract(cells, '$[0]') = ?1
               AND json_extract(cells, '$[0]') <> ''
             ORDER BY row_num
             LIMIT 1",
            rusqlite::params![key],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(row_num.map(|n| RowIndex(n as u32)))
  }

  /// Replace the first five cells of row `index`, keeping any cells past
  /// column E. Returns `false` if the row does not exist.
  async fn overwrite_row(&self, index: RowIndex, row: ReportRow) -> Result<bool> {
    let row_num = i64::from(index.0);
    let report_cells = row.into_cells();

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
          .query_row(
            "SELECT cells FROM sheet_rows WHERE row_num = ?1",
            rusqlite::params![row_num],
            |r| r.get(0),
          )
          .optional()?;
        let Some(existing) = existing else {
          return Ok(false);
        };

        let cells = decode_cells(&existing)
          .map(|cells| overlay_cells(cells, report_cells))
          .and_then(|cells| encode_cells(&cells))
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        tx.execute(
          "UPDATE sheet_rows SET cells = ?2 WHERE row_num = ?1",
          rusqlite::params![row_num, cells],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(found)
  }
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteSheet {
  async fn append_row(&self, row: ReportRow) -> nippo_core::Result<()> {
    row.ensure_key()?;
    let date = row.date.clone();
    let index = self
      .insert_row(row.into_cells().to_vec())
      .await
      .map_err(nippo_core::Error::write)?;
    tracing::info!(%date, row = %index, "appended report row");
    Ok(())
  }

  async fn fetch_all(&self) -> nippo_core::Result<Vec<Vec<String>>> {
    let rows = self.select_rows().await.map_err(nippo_core::Error::read)?;
    tracing::debug!(rows = rows.len(), "fetched sheet");
    Ok(rows)
  }

  async fn find_row_index(&self, key: &str) -> nippo_core::Result<RowIndex> {
    if key.is_empty() {
      return Err(nippo_core::Error::NotFound("empty key".to_owned()));
    }
    self
      .select_key(key.to_owned())
      .await
      .map_err(nippo_core::Error::read)?
      .ok_or_else(|| nippo_core::Error::NotFound(format!("no row with key {key:?}")))
  }

  async fn update_row(&self, index: RowIndex, row: ReportRow) -> nippo_core::Result<()> {
    row.ensure_key()?;
    let date = row.date.clone();
    let found = self
      .overwrite_row(index, row)
      .await
      .map_err(nippo_core::Error::write)?;
    if !found {
      return Err(nippo_core::Error::NotFound(format!("row {index}")));
    }
    tracing::info!(%date, row = %index, "updated report row");
    Ok(())
  }
}
