//! Configuration management for remote-relay.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::session::RemoteConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote host configuration.
    pub remote: RemoteSection,
    /// Execution configuration.
    pub execution: ExecutionSection,
    /// Transfer configuration.
    pub transfer: TransferSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Remote host configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    /// Host name or address.
    pub host: String,
    /// Port to connect to.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Password for password authentication.
    pub password: Option<String>,
    /// Private key path for public-key authentication.
    pub identity_file: Option<PathBuf>,
    /// Optional ssh config file consulted for host overrides.
    pub ssh_config_file: Option<PathBuf>,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: None,
            identity_file: None,
            ssh_config_file: None,
            connect_timeout_secs: 5,
        }
    }
}

/// Execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Per-iteration wait timeout in seconds for the drain loop.
    pub wait_timeout_secs: u64,
    /// Keep stderr bytes in the result.
    pub capture_stderr: bool,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 5,
            capture_stderr: true,
        }
    }
}

/// Transfer configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSection {
    /// Transfer directories recursively.
    pub recursive: bool,
    /// Preserve modification and access times.
    pub preserve_times: bool,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level filter (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&contents).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides (`REMOTE_RELAY_*`).
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("REMOTE_RELAY_HOST") {
            self.remote.host = host;
        }
        if let Ok(port) = std::env::var("REMOTE_RELAY_PORT") {
            if let Ok(port) = port.parse() {
                self.remote.port = port;
            }
        }
        if let Ok(user) = std::env::var("REMOTE_RELAY_USER") {
            self.remote.username = user;
        }
        if let Ok(password) = std::env::var("REMOTE_RELAY_PASSWORD") {
            self.remote.password = Some(password);
        }
        if let Ok(identity) = std::env::var("REMOTE_RELAY_IDENTITY") {
            self.remote.identity_file = Some(PathBuf::from(identity));
        }
        if let Ok(level) = std::env::var("REMOTE_RELAY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides (highest priority).
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref host) = args.host {
            self.remote.host = host.clone();
        }
        if let Some(port) = args.port {
            self.remote.port = port;
        }
        if let Some(ref user) = args.user {
            self.remote.username = user.clone();
        }
        if let Some(ref identity) = args.identity {
            self.remote.identity_file = Some(identity.clone());
        }
        if let Some(ref ssh_config) = args.ssh_config {
            self.remote.ssh_config_file = Some(ssh_config.clone());
        }
        if let Some(timeout) = args.wait_timeout_secs {
            self.execution.wait_timeout_secs = timeout;
        }
        if args.no_capture_stderr {
            self.execution.capture_stderr = false;
        }
        if args.recursive {
            self.transfer.recursive = true;
        }
        if args.preserve_times {
            self.transfer.preserve_times = true;
        }
        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to a session [`RemoteConfig`].
    pub fn to_remote_config(&self) -> Result<RemoteConfig, ConfigError> {
        if self.remote.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.remote.username.is_empty() {
            return Err(ConfigError::MissingUser);
        }

        let mut remote = RemoteConfig::new(&self.remote.host, &self.remote.username)
            .port(self.remote.port)
            .connect_timeout(Duration::from_secs(self.remote.connect_timeout_secs));

        if let Some(ref password) = self.remote.password {
            remote = remote.password(password.clone());
        }
        if let Some(ref identity) = self.remote.identity_file {
            remote = remote.identity_file(identity.clone());
        }
        if let Some(ref ssh_config) = self.remote.ssh_config_file {
            remote = remote.ssh_config_file(ssh_config.clone());
        }

        Ok(remote)
    }

    /// Per-iteration wait timeout for the drain loop.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.execution.wait_timeout_secs)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// No remote host configured.
    MissingHost,
    /// No login user configured.
    MissingUser,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::MissingHost => write!(f, "no remote host configured"),
            Self::MissingUser => write!(f, "no login user configured"),
        }
    }
}

impl std::error::Error for ConfigError {}
