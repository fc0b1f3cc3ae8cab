//! Google Sheets backend for the Nippo report store.
//!
//! - [`credentials`] turns a local key file or a base64-encoded secret into a
//!   [`ServiceAccountKey`].
//! - [`auth`] exchanges that key for short-lived bearer tokens.
//! - [`SheetsStore`] opens the `daily_report_db` spreadsheet and implements
//!   [`nippo_core::store::ReportStore`] over the Sheets v4 REST API.

pub mod auth;
pub mod credentials;
pub mod error;

mod client;

pub use client::{
  DEFAULT_DRIVE_API_BASE, DEFAULT_SHEETS_API_BASE, DEFAULT_STORE_NAME, SheetsConfig, SheetsStore,
};
pub use credentials::ServiceAccountKey;
pub use error::{Error, Result};
