//! Error type for `nippo-sheets`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-success status.
  #[error("google api returned {status}: {body}")]
  Api {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("jwt error: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("spreadsheet {0:?} not found")]
  SpreadsheetNotFound(String),

  #[error("spreadsheet {0} has no worksheets")]
  NoWorksheet(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
