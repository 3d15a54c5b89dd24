use crate::directline::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default conversation-analysis API version.
pub const DEFAULT_API_VERSION: &str = "2023-04-01";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Total timeout per HTTP request in seconds. Default: 120.
    pub request_timeout_secs: u64,
    pub directline: DirectLineConfig,
    pub orchestration: OrchestrationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            directline: DirectLineConfig::default(),
            orchestration: OrchestrationConfig::default(),
        }
    }
}

/// DirectLine channel settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectLineConfig {
    pub base_url: String,
    /// Channel secret, used once per session to mint a token.
    pub secret: Option<String>,
    /// Activity fetches per interaction. Default: 1 (single fetch).
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for DirectLineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret: None,
            poll_attempts: 1,
            poll_interval_ms: 1000,
        }
    }
}

impl fmt::Debug for DirectLineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectLineConfig")
            .field("base_url", &self.base_url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl DirectLineConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Conversation-analysis (orchestration project) settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub project: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            key: None,
            project: None,
            deployment: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl fmt::Debug for OrchestrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestrationConfig")
            .field("endpoint", &self.endpoint)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("project", &self.project)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Config {
    /// Default location: `<config dir>/botwire/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("botwire").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".botwire/config.toml"))
    }

    /// Load from `path`, then apply `.env` and environment overrides.
    pub fn load_with(path: &Path) -> Result<Self> {
        // A missing .env is normal outside development
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a TOML config file, or defaults if it doesn't exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment-style overrides. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DIRECT_LINE_SECRET") {
            self.directline.secret = Some(v);
        }
        if let Some(v) = get("DIRECT_LINE_ENDPOINT") {
            self.directline.base_url = v;
        }
        if let Some(v) = get("CONVERSATION_ANALYSIS_ENDPOINT") {
            self.orchestration.endpoint = Some(v);
        }
        if let Some(v) = get("CONVERSATION_ANALYSIS_KEY") {
            self.orchestration.key = Some(v);
        }
        if let Some(v) = get("CONVERSATION_ANALYSIS_PROJECT") {
            self.orchestration.project = Some(v);
        }
        if let Some(v) = get("CONVERSATION_ANALYSIS_DEPLOYMENT") {
            self.orchestration.deployment = Some(v);
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Check the settings `botwire chat` depends on.
    pub fn validate_directline(&self) -> Result<()> {
        validate_url("directline.base_url", &self.directline.base_url)?;
        if self.directline.secret.is_none() {
            return Err(Error::Config(
                "DirectLine secret missing. Set DIRECT_LINE_SECRET".into(),
            ));
        }
        if self.directline.poll_attempts == 0 {
            return Err(Error::Config(
                "directline.poll_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check the settings `botwire orchestrate` depends on.
    pub fn validate_orchestration(&self) -> Result<()> {
        let o = &self.orchestration;
        let missing: Vec<&str> = [
            ("CONVERSATION_ANALYSIS_ENDPOINT", o.endpoint.is_none()),
            ("CONVERSATION_ANALYSIS_KEY", o.key.is_none()),
            ("CONVERSATION_ANALYSIS_PROJECT", o.project.is_none()),
            ("CONVERSATION_ANALYSIS_DEPLOYMENT", o.deployment.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Orchestration settings missing. Set: {}",
                missing.join(", ")
            )));
        }

        if let Some(endpoint) = &o.endpoint {
            validate_url("orchestration.endpoint", endpoint)?;
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("{field} is not a valid URL ({value}): {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{field} must use http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(())
}
