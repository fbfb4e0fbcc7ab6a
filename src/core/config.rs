use crate::policy::{PriorityKind, SamplingKind};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub peer_handout: PeerHandoutConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub announce: AnnounceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: false,
        }
    }
}

/// Which peers an announce gets back, and in what order
#[derive(Debug, Clone, Deserialize)]
pub struct PeerHandoutConfig {
    #[serde(default)]
    pub priority: PriorityKind,
    #[serde(default)]
    pub sampling: SamplingKind,
    /// Upper bound on disclosed peers for bounded sampling strategies
    #[serde(default = "default_handout_limit")]
    pub limit: usize,
    /// Seconds advertised to peers as the announce interval (0 = no guidance)
    #[serde(default)]
    pub interval: i64,
}

impl Default for PeerHandoutConfig {
    fn default() -> Self {
        Self {
            priority: PriorityKind::default(),
            sampling: SamplingKind::default(),
            limit: default_handout_limit(),
            interval: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_peer_timeout")]
    pub peer_timeout: i64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            peer_timeout: default_peer_timeout(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnounceConfig {
    /// Answer malformed announces with 400 instead of the legacy 500
    #[serde(default)]
    pub strict_client_errors: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_handout_limit() -> usize {
    50
}

fn default_peer_timeout() -> i64 {
    3600 // 1 hour
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.peer_handout.limit == 0 {
            bail!("peer_handout.limit must be greater than 0");
        }

        if self.peer_handout.interval < 0 {
            bail!("peer_handout.interval must be non-negative");
        }

        if self.storage.cleanup_interval == 0 {
            bail!("cleanup_interval must be greater than 0");
        }

        let Ok(cleanup_interval) = i64::try_from(self.storage.cleanup_interval) else {
            bail!(
                "cleanup_interval ({}) is out of range",
                self.storage.cleanup_interval
            );
        };

        if self.storage.peer_timeout <= cleanup_interval {
            bail!(
                "peer_timeout ({}) must be greater than cleanup_interval ({})",
                self.storage.peer_timeout,
                self.storage.cleanup_interval
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_CONFIG: &str = r#"
        [server]
        port = 7070
        num_threads = 2

        [logging]
        level = "debug"
        format = "console"

        [peer_handout]
        priority = "datacenter"
        sampling = "random"
        limit = 10
        interval = 30

        [storage]
        peer_timeout = 600
        cleanup_interval = 60

        [announce]
        strict_client_errors = true
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml("[server]\nport = 7070\n").unwrap();

        assert_eq!(config.peer_handout.priority, PriorityKind::Default);
        assert_eq!(config.peer_handout.sampling, SamplingKind::Default);
        assert_eq!(config.peer_handout.limit, 50);
        assert_eq!(config.peer_handout.interval, 0);
        assert_eq!(config.storage.peer_timeout, 3600);
        assert_eq!(config.storage.cleanup_interval, 300);
        assert!(!config.announce.strict_client_errors);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert!(config.server.num_threads > 0);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(FULL_CONFIG).unwrap();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.server.num_threads, 2);
        assert_eq!(config.peer_handout.priority, PriorityKind::Datacenter);
        assert_eq!(config.peer_handout.sampling, SamplingKind::Random);
        assert_eq!(config.peer_handout.limit, 10);
        assert_eq!(config.peer_handout.interval, 30);
        assert_eq!(config.storage.peer_timeout, 600);
        assert!(config.announce.strict_client_errors);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Config::from_file(&dir.path().join("missing.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = Config::from_toml("[server]\nport = 7070\n[peer_handout]\npriority = \"fastest\"\n");
        assert!(result.is_err());

        let result = Config::from_toml("[server]\nport = 7070\n[peer_handout]\nsampling = \"some\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::from_toml(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.peer_handout.limit, 50);
    }

    #[test]
    fn test_zero_port_rejected() {
        assert!(Config::from_toml("[server]\nport = 0\n").is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = Config::from_toml("[server]\nport = 7070\n[peer_handout]\nlimit = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_peer_timeout_must_exceed_cleanup_interval() {
        let result = Config::from_toml(
            "[server]\nport = 7070\n[storage]\npeer_timeout = 60\ncleanup_interval = 60\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cleanup_interval_beyond_i64_rejected() {
        let mut config = Config::from_toml("[server]\nport = 7070\n").unwrap();
        config.storage.peer_timeout = i64::MAX;
        config.storage.cleanup_interval = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Config::from_toml("[server]\nport = 7070\n[logging]\nlevel = \"loud\"\n");
        assert!(result.is_err());
    }
}
