//! Error types for `nippo-core`.
//!
//! Every backend maps its raw failures onto this taxonomy at the
//! [`ReportStore`](crate::store::ReportStore) boundary, so the presentation
//! layer can decide how to surface them without knowing the backend.

use thiserror::Error;

/// Boxed source error carried by the I/O variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The service credential is missing or unusable. Fatal for the session.
  #[error("credential error: {0}")]
  Credential(String),

  /// The store could not be reached or does not exist. Fatal for the session.
  #[error("connection error: {0}")]
  Connection(#[source] BoxError),

  /// An append or update did not reach the store.
  #[error("write error: {0}")]
  Write(#[source] BoxError),

  /// Fetching rows from the store failed.
  #[error("read error: {0}")]
  Read(#[source] BoxError),

  /// No row matches the requested key or index.
  #[error("not found: {0}")]
  NotFound(String),

  /// A fetched row lacks a column the record model requires.
  #[error("missing column {0:?}")]
  Schema(String),

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),
}

impl Error {
  pub fn connection(e: impl Into<BoxError>) -> Self { Self::Connection(e.into()) }

  pub fn write(e: impl Into<BoxError>) -> Self { Self::Write(e.into()) }

  pub fn read(e: impl Into<BoxError>) -> Self { Self::Read(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
