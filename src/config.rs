use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::query::ExtensionNamePolicy;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address (default: "0.0.0.0")
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port number (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public origin of the mirror, used when rewriting asset URIs
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Root of the mirrored artifacts (asset files, marketplace.json)
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,
    /// Catalog source (default: directory layout under `artifacts`)
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    /// What `ExtensionName` criteria compare against
    #[serde(default)]
    pub extension_name_match: ExtensionNamePolicy,
    /// Reload the catalog every N seconds
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_artifacts() -> PathBuf {
    PathBuf::from("./artifacts")
}

/// Catalog backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogConfig {
    /// `{path}/extensions/{publisher.extension}/latest.json`
    Directory { path: PathBuf },
    /// A single JSON array of extensions
    File { path: PathBuf },
}

/// Values given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub origin: Option<String>,
    pub artifacts: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            origin: default_origin(),
            artifacts: default_artifacts(),
            catalog: None,
            extension_name_match: ExtensionNamePolicy::default(),
            refresh_interval_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI arguments
    pub fn load(config_path: Option<&PathBuf>, overrides: &Overrides) -> anyhow::Result<Self> {
        // Start with default config
        let mut config = if let Some(path) = config_path {
            Self::from_file(path)?
        } else {
            // Try default config file
            let default_path = Path::new("stockroom.toml");
            if default_path.exists() {
                Self::from_file(default_path)?
            } else {
                Config::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);

        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override with environment variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("STOCKROOM_BIND") {
            self.bind = bind;
        }
        if let Some(port) = var("STOCKROOM_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }
        if let Some(origin) = var("STOCKROOM_ORIGIN") {
            self.origin = origin;
        }
        if let Some(path) = var("STOCKROOM_ARTIFACTS") {
            self.artifacts = PathBuf::from(path);
        }
        if let Some(path) = var("STOCKROOM_CATALOG_PATH") {
            self.catalog = Some(CatalogConfig::Directory {
                path: PathBuf::from(path),
            });
        }
        if let Some(secs) = var("STOCKROOM_REFRESH_INTERVAL") {
            if let Ok(s) = secs.parse() {
                self.refresh_interval_secs = Some(s);
            }
        }
    }

    /// Override with CLI arguments
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(bind) = &overrides.bind {
            self.bind = bind.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(origin) = &overrides.origin {
            self.origin = origin.clone();
        }
        if let Some(path) = &overrides.artifacts {
            self.artifacts = path.clone();
        }
        if let Some(path) = &overrides.catalog_file {
            self.catalog = Some(CatalogConfig::File { path: path.clone() });
        }
    }

    /// The catalog source, falling back to the directory layout under `artifacts`
    pub fn catalog(&self) -> CatalogConfig {
        self.catalog.clone().unwrap_or_else(|| CatalogConfig::Directory {
            path: self.artifacts.clone(),
        })
    }
}
