use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tokio::fs;
use tracing::debug;

use crate::api::{response, AppState};
use crate::error::{Error, Result};

/// Handle GET /extensions/marketplace.json
pub async fn marketplace_json(state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let path = state.artifacts.join("extensions").join("marketplace.json");
    serve_file(&path, "application/json").await
}

/// Handle GET /extensions/{identity}/{version}/{*asset}
pub async fn asset(
    state: Arc<AppState>,
    identity: &str,
    version: &str,
    asset: &str,
) -> Result<Response<Full<Bytes>>> {
    let path = asset_path(&state.artifacts, identity, version, asset)
        .ok_or_else(|| Error::NotFound(format!("{}/{}/{}", identity, version, asset)))?;

    let content_type = if asset.ends_with(".json") {
        "application/json"
    } else {
        "application/octet-stream"
    };
    serve_file(&path, content_type).await
}

/// Location of a mirrored asset, or `None` if any segment would escape
/// the artifacts directory.
pub fn asset_path(artifacts: &Path, identity: &str, version: &str, asset: &str) -> Option<PathBuf> {
    artifact_path(
        artifacts,
        ["extensions", identity, version]
            .into_iter()
            .chain(asset.split('/')),
    )
}

/// Join `parts` under `artifacts`, rejecting empty, `.`, `..` and
/// backslash-carrying segments.
pub fn artifact_path<'a>(artifacts: &Path, parts: impl IntoIterator<Item = &'a str>) -> Option<PathBuf> {
    let mut path = artifacts.to_path_buf();
    for part in parts {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return None;
        }
        path.push(part);
    }
    Some(path)
}

pub(crate) async fn serve_file(path: &Path, content_type: &'static str) -> Result<Response<Full<Bytes>>> {
    let content = fs::read(path)
        .await
        .map_err(|_| Error::NotFound(path.display().to_string()))?;

    debug!("Serving {} ({} bytes)", path.display(), content.len());
    Ok(response(StatusCode::OK, content_type, Bytes::from(content)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_asset_path() {
        let path = asset_path(
            Path::new("/srv/mirror"),
            "ms-python.python",
            "2024.2.1",
            "linux-x64/Microsoft.VisualStudio.Services.VSIXPackage",
        )
        .unwrap();
        assert_eq!(
            path,
            Path::new("/srv/mirror/extensions/ms-python.python/2024.2.1/linux-x64/Microsoft.VisualStudio.Services.VSIXPackage")
        );
    }

    #[test]
    fn rejects_traversal() {
        let root = Path::new("/srv/mirror");
        assert!(asset_path(root, "..", "1.0.0", "x").is_none());
        assert!(asset_path(root, "a.b", "1.0.0", "../../etc/passwd").is_none());
        assert!(asset_path(root, "a.b", "1.0.0", "dir//file").is_none());
        assert!(asset_path(root, "a.b", "1.0.0", "..\\secret").is_none());
        assert!(artifact_path(root, "installers/../../etc".split('/')).is_none());
    }
}
