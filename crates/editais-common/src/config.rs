//! Configuration for the editais front end.
//!
//! Read from `editais.toml` in the working directory, or from the path in
//! `EDITAIS_CONFIG`. A `.yaml`/`.yml` path is parsed as YAML. Every field has
//! a default, so a missing file yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{EditaisError, Result};

pub const CONFIG_PATH_ENV: &str = "EDITAIS_CONFIG";
pub const API_URL_ENV: &str = "EDITAIS_API_URL";
pub const BIND_ENV: &str = "EDITAIS_BIND";

/// Complete front-end configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditaisConfig {
    /// Remote editais API
    #[serde(default)]
    pub api: ApiConfig,

    /// Local web server
    #[serde(default)]
    pub server: ServerConfig,

    /// Text search backend
    #[serde(default)]
    pub search: SearchConfig,

    /// In-memory catalog
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Presentation options
    #[serde(default)]
    pub ui: UiConfig,

    /// Chat sessions held in memory
    #[serde(default)]
    pub chat: ChatConfig,
}

// ── API ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Mark the token and session cookies `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            secure_cookies: false,
        }
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Replace substring matching with fuzzy matching
    #[serde(default)]
    pub fuzzy: bool,

    /// Minimum similarity (0.0 - 1.0) for a fuzzy hit
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

fn default_fuzzy_threshold() -> f64 {
    0.85
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: false,
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Age after which a page load refetches the collection
    #[serde(default = "default_refresh")]
    pub refresh_secs: u64,
}

fn default_refresh() -> u64 {
    60
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh(),
        }
    }
}

// ── UI ────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_preview_chars")]
    pub description_preview_chars: usize,

    #[serde(default = "default_site_title")]
    pub site_title: String,
}

fn default_preview_chars() -> usize {
    160
}

fn default_site_title() -> String {
    "Portal de Editais".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            description_preview_chars: default_preview_chars(),
            site_title: default_site_title(),
        }
    }
}

// ── Chat ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Sessions idle longer than this are dropped
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Upper bound on live sessions; the least recently used goes first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_session_ttl() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    10_000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl EditaisConfig {
    /// Load from `EDITAIS_CONFIG` or `editais.toml`, then apply env overrides.
    /// A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| "editais.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            warn!("Config file not found: {path}, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML or YAML file, chosen by extension.
    pub fn from_path(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EditaisError::Config(format!("cannot read {path}: {e}")))?;

        if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::from_str(&content)
                .map_err(|e| EditaisError::Config(format!("invalid YAML in {path}: {e}")))
        } else {
            Self::from_toml(&content)
                .map_err(|e| EditaisError::Config(format!("invalid TOML in {path}: {e}")))
        }
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `EDITAIS_API_URL` / `EDITAIS_BIND` style overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api.base_url = url;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }
    }

    /// Check invariants the rest of the crate relies on.
    pub fn validate(&mut self) -> Result<()> {
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&self.api.base_url)
            .map_err(|e| EditaisError::Config(format!("api.base_url {:?}: {e}", self.api.base_url)))?;

        if self.api.timeout_secs == 0 {
            return Err(EditaisError::Config("api.timeout_secs must be positive".to_string()));
        }
        if self.chat.max_sessions == 0 {
            return Err(EditaisError::Config("chat.max_sessions must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.search.fuzzy_threshold) {
            return Err(EditaisError::Config(format!(
                "search.fuzzy_threshold must be within 0.0..=1.0, got {}",
                self.search.fuzzy_threshold
            )));
        }
        if self.ui.description_preview_chars == 0 {
            return Err(EditaisError::Config(
                "ui.description_preview_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
