use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use jiff::Timestamp;

use crate::api::{json_response, AppState};
use crate::error::Result;

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Extensions in the snapshot being served
    extensions: Option<usize>,
    /// When that snapshot was loaded
    loaded_at: Option<Timestamp>,
}

/// Handle GET /health
pub async fn health(state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let snapshot = state.store.current();
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        extensions: snapshot.as_ref().map(|s| s.len()),
        loaded_at: snapshot.as_ref().map(|s| s.loaded_at()),
    };

    let body = serde_json::to_string(&response)?;
    Ok(json_response(StatusCode::OK, body))
}
