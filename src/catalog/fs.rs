use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use stockroom_core::Extension;

use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// Directory-based catalog
///
/// Directory structure:
/// ```text
/// {path}/extensions/{publisher.extension}/latest.json
/// ```
pub struct DirectoryCatalog {
    path: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn extensions_dir(&self) -> PathBuf {
        self.path.join("extensions")
    }

    async fn list_identities(&self) -> Result<Vec<String>> {
        let extensions_dir = self.extensions_dir();
        let mut entries = fs::read_dir(&extensions_dir).await.map_err(|e| {
            Error::CatalogUnavailable(format!("{}: {}", extensions_dir.display(), e))
        })?;

        let mut identities = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    identities.push(name.to_string());
                }
            }
        }
        identities.sort();
        Ok(identities)
    }
}

#[async_trait]
impl Catalog for DirectoryCatalog {
    async fn load(&self) -> Result<Vec<Extension>> {
        let identities = self.list_identities().await?;
        let mut extensions = Vec::with_capacity(identities.len());

        for identity in &identities {
            let path = self.extensions_dir().join(identity).join("latest.json");
            let content = match fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read extension metadata");
                    continue;
                }
            };

            match serde_json::from_str::<Extension>(&content) {
                Ok(ext) => extensions.push(ext),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to decode extension metadata"),
            }
        }

        info!("Loaded {} extension(s) from {}", extensions.len(), self.path.display());
        Ok(extensions)
    }
}

/// Catalog stored as a single JSON array of extensions
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn load(&self) -> Result<Vec<Extension>> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::CatalogUnavailable(format!("{}: {}", self.path.display(), e)))?;
        let extensions: Vec<Extension> = serde_json::from_str(&content)
            .map_err(|e| Error::CatalogUnavailable(format!("{}: {}", self.path.display(), e)))?;

        info!("Loaded {} extension(s) from {}", extensions.len(), self.path.display());
        Ok(extensions)
    }
}
