use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tokio::fs;
use tracing::{debug, info};

use stockroom_core::Installer;

use crate::api::assets::{artifact_path, serve_file};
use crate::api::{json_response, response, AppState};
use crate::error::{Error, Result};

/// Handle GET /api/update/{platform}/{quality}/{commit}
///
/// 204 when `commit` already is the newest build, otherwise the newest
/// build's metadata with `url` pointing at the mirror.
pub async fn check(
    state: Arc<AppState>,
    platform: &str,
    quality: &str,
    commit: &str,
) -> Result<Response<Full<Bytes>>> {
    info!(platform, quality, commit, "Installer update check");

    let mut installer = load(&state.artifacts, platform, quality, "latest.json").await?;
    if installer.version == commit {
        debug!(platform, quality, commit, "Installer is up to date");
        return Ok(response(StatusCode::NO_CONTENT, "text/plain", Bytes::new()));
    }

    installer.url = format!(
        "{}/{}",
        state.options.origin.trim_end_matches('/'),
        installer.download_path()
    );
    let body = serde_json::to_string(&installer)?;
    Ok(json_response(StatusCode::OK, body))
}

/// Handle GET /{commit}/{platform}/{quality}
///
/// The editor sends the commit as `commit:{sha}`.
pub async fn download(
    state: Arc<AppState>,
    commit: &str,
    platform: &str,
    quality: &str,
) -> Result<Response<Full<Bytes>>> {
    let commit = commit.strip_prefix("commit:").unwrap_or(commit);
    info!(platform, quality, commit, "Installer download");

    let installer = load(&state.artifacts, platform, quality, &format!("{}.json", commit)).await?;
    let download_path = installer.download_path();
    let path = artifact_path(&state.artifacts, download_path.split('/'))
        .ok_or_else(|| Error::NotFound(download_path.clone()))?;

    serve_file(&path, "application/octet-stream").await
}

/// Read `installers/{platform}/{quality}/{file}` under the artifacts root.
async fn load(artifacts: &Path, platform: &str, quality: &str, file: &str) -> Result<Installer> {
    let path = artifact_path(artifacts, ["installers", platform, quality, file])
        .ok_or_else(|| Error::NotFound(format!("{}/{}/{}", platform, quality, file)))?;

    let content = fs::read_to_string(&path)
        .await
        .map_err(|_| Error::NotFound(path.display().to_string()))?;
    Ok(serde_json::from_str(&content)?)
}
