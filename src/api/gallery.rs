use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;

use stockroom_core::{QueryRequest, QueryResults};

use crate::api::{json_response, AppState};
use crate::error::{Error, Result};
use crate::query::{self, rewrite};

/// Handle POST /_apis/public/gallery/extensionquery
pub async fn query(state: Arc<AppState>, body: Bytes) -> Result<Response<Full<Bytes>>> {
    let request: QueryRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::MalformedRequest(format!("failed to parse query request: {}", e)))?;

    // Shape errors are reported before the catalog is touched
    let filter = query::validate(&request)?;
    let snapshot = state.store.snapshot().await?;

    let response = query::execute(filter, snapshot.extensions(), &state.options);
    info!(
        criteria = filter.criteria.len(),
        total = response.total_count().unwrap_or_default(),
        returned = response.extensions.len(),
        "Gallery query"
    );

    let results = QueryResults {
        results: vec![response],
    };
    let body = serde_json::to_string(&results)?;
    Ok(json_response(StatusCode::OK, body))
}

/// Handle GET /_apis/public/gallery/vscode/{publisher}/{extension}/latest
pub async fn latest(
    state: Arc<AppState>,
    publisher: &str,
    extension: &str,
) -> Result<Response<Full<Bytes>>> {
    let identity = format!("{}.{}", publisher, extension);
    let snapshot = state.store.snapshot().await?;

    let ext = snapshot
        .find(&identity)
        .ok_or_else(|| Error::NotFound(identity.clone()))?;
    let rewritten = rewrite::rewrite(ext, &state.options.origin);

    let body = serde_json::to_string(&rewritten)?;
    Ok(json_response(StatusCode::OK, body))
}
