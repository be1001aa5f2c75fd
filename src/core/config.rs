use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    /// Path of an announcement below `base_url`. Understands `{direction}`,
    /// `{month}` and `{year}`.
    pub url_template: String,
    pub fetch_timeout_seconds: u64,
    /// Probe each candidate with a HEAD request before downloading it.
    pub precheck: bool,
    pub not_found_marker: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: "https://company.meralco.com.ph/news-and-advisories".to_string(),
            url_template: "{direction}-rates-{month}".to_string(),
            fetch_timeout_seconds: 30,
            precheck: true,
            not_found_marker: "page not found".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// How often fallback (previous month) data rechecks upstream.
    pub fallback_retry_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            fallback_retry_seconds: 3600,
        }
    }
}

impl CacheConfig {
    pub fn fallback_retry_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.fallback_retry_seconds).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    /// Offset of the utility's local time from UTC; decides when a month starts.
    pub utc_offset_hours: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            utc_offset_hours: 8,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ph", "meralco", "meralco-api")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let template = &self.source.url_template;
        if !template.contains("{direction}") || !template.contains("{month}") {
            bail!("url_template must contain {{direction}} and {{month}}: {template}");
        }
        if self.cache.fallback_retry_seconds == 0 {
            bail!("cache.fallback_retry_seconds must be greater than zero");
        }
        if self.source.fetch_timeout_seconds == 0 {
            bail!("source.fetch_timeout_seconds must be greater than zero");
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("Invalid utc_offset_hours: {}", self.utc_offset_hours))
    }
}
