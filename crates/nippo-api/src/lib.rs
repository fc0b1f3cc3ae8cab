//! JSON REST API for Nippo.
//!
//! Exposes an axum [`Router`] backed by any [`nippo_core::store::ReportStore`].
//! This is the interface a presentation surface (entry form, history browser)
//! drives; rendering is the caller's concern.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", nippo_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod reports;

use std::sync::Arc;

use axum::{Router, routing::get};
use nippo_core::store::ReportStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ReportStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .route("/reports/new", get(reports::new_draft))
    .route("/reports", get(reports::list::<S>).post(reports::create::<S>))
    .route("/reports/{date}", get(reports::get_one::<S>).put(reports::update_one::<S>))
    .with_state(store)
}
