use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the notifier service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Campaign Monitor REST settings
    pub campaign_monitor: CampaignMonitorConfig,
    /// Where the settings record is persisted
    pub storage: StorageConfig,
    /// Admin surface settings
    pub admin: AdminConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CampaignMonitorConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Outbound request budget; bursts up to the same amount
    pub requests_per_second: u32,
    /// TTL for cached template/list/client lookups
    pub lookup_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// JSON options document
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Address the HTTP host listens on. Keep it on loopback unless
    /// `hook_secret` is set: the post-status hook can trigger a send.
    pub bind_address: String,
    /// Secret for anti-forgery tokens; generated per process when unset
    pub nonce_secret: Option<String>,
    /// Shared secret callers of the post-status hook must present in the
    /// `X-Hook-Secret` header; unset accepts any caller
    pub hook_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for CampaignMonitorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.createsend.com/api/v3.3".to_string(),
            timeout_seconds: 30,
            requests_per_second: 10,
            lookup_cache_ttl_seconds: 300, // 5 minutes
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            campaign_monitor: CampaignMonitorConfig::default(),
            storage: StorageConfig {
                path: ".cm-notifier/options.json".to_string(),
            },
            admin: AdminConfig {
                bind_address: "127.0.0.1:8787".to_string(),
                nonce_secret: None,
                hook_secret: None,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json: true,
            },
        }
    }
}

impl NotifierConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file at `path`, when present
    /// 3. Environment variables (prefixed with CM_NOTIFIER_, `__` between sections)
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&NotifierConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CM_NOTIFIER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_createsend() {
        let config = NotifierConfig::default();
        assert_eq!(
            config.campaign_monitor.base_url,
            "https://api.createsend.com/api/v3.3"
        );
        assert!(config.admin.nonce_secret.is_none());
        assert!(config.admin.hook_secret.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cm-notifier.toml");
        std::fs::write(
            &path,
            "[storage]\npath = \"/var/lib/cm/options.json\"\n\n[observability]\nlog_level = \"debug\"\njson = false\n",
        )
        .unwrap();

        let config = NotifierConfig::load_from(&path).unwrap();
        assert_eq!(config.storage.path, "/var/lib/cm/options.json");
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.json);
        // untouched sections keep their defaults
        assert_eq!(config.campaign_monitor.timeout_seconds, 30);
    }

    #[test]
    fn test_save_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = NotifierConfig::default();
        config.admin.bind_address = "0.0.0.0:9000".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = NotifierConfig::load_from(&path).unwrap();
        assert_eq!(loaded.admin.bind_address, "0.0.0.0:9000");
    }
}
