//! netcloud-bot library
//!
//! Catalogs movie uploads from a private storage channel: posters are
//! republished under their genre topic, videos are republished as replies to
//! the matching poster, and the links are mirrored into a spreadsheet.

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod publisher;
pub mod sheets;
pub mod telegram;

pub use error::{Error, Result};

/// State of the liveness server
///
/// Deliberately separate from the catalog state: the HTTP side never sees
/// pending titles or queued videos.
#[derive(Clone)]
pub struct AppState {
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            startup_time: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the liveness router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
