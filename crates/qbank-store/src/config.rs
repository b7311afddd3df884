//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use qbank_core::image::ImageResolver;
use qbank_core::traits::QuestionStore;
use qbank_core::upload::DEFAULT_DOCUMENT_EXTENSION;

use crate::http::HttpStore;

/// Name of the config file searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "qbank.toml";

/// Overrides `api_base_url`.
pub const API_URL_ENV: &str = "QBANK_API_URL";
/// Overrides `images_base_url`.
pub const IMAGES_URL_ENV: &str = "QBANK_IMAGES_URL";

/// Top-level qbank configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QbankConfig {
    /// Base URL of the question server's REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL images are fetched from. Defaults to `<api_base_url>/images`.
    #[serde(default)]
    pub images_base_url: Option<String>,
    /// Per-request timeout. Unset leaves timing to the transport.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Extension an uploaded document must end with (case-sensitive).
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_document_extension() -> String {
    DEFAULT_DOCUMENT_EXTENSION.to_string()
}

impl Default for QbankConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            images_base_url: None,
            request_timeout_secs: None,
            document_extension: default_document_extension(),
        }
    }
}

impl QbankConfig {
    /// Effective image base URL.
    pub fn images_base_url(&self) -> String {
        match &self.images_base_url {
            Some(url) => url.clone(),
            None => format!("{}/images", self.api_base_url.trim_end_matches('/')),
        }
    }

    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(self.images_base_url())
    }

    fn resolve_env(&mut self) {
        self.api_base_url = resolve_env_vars(&self.api_base_url);
        self.images_base_url = self.images_base_url.as_deref().map(resolve_env_vars);
        self.document_extension = resolve_env_vars(&self.document_extension);
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to an empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `qbank.toml` in the current directory
/// 2. `~/.config/qbank/config.toml`
///
/// Environment variable overrides: `QBANK_API_URL`, `QBANK_IMAGES_URL`.
pub fn load_config() -> Result<QbankConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QbankConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => search_paths().into_iter().find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QbankConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QbankConfig::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
        config.api_base_url = url;
    }
    if let Ok(url) = std::env::var(IMAGES_URL_ENV) {
        config.images_base_url = Some(url);
    }

    config.resolve_env();
    anyhow::ensure!(
        !config.api_base_url.trim().is_empty(),
        "api_base_url must not be empty"
    );

    Ok(config)
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Ok(home) = std::env::var("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("qbank")
                .join("config.toml"),
        );
    }
    paths
}

/// Create the HTTP store described by `config`.
pub fn create_store(config: &QbankConfig) -> Result<Arc<dyn QuestionStore>> {
    let store = HttpStore::new(&config.api_base_url, config.request_timeout_secs)?;
    Ok(Arc::new(store))
}
