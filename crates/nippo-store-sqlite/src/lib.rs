//! SQLite backend for the Nippo report store.
//!
//! Emulates a single spreadsheet worksheet: numbered rows of text cells, the
//! first of which is the header. Wraps [`tokio_rusqlite`] so all database
//! access runs on a dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteSheet;

#[cfg(test)]
mod tests;
