//! # Node Configuration
//!
//! Loaded once at startup from a TOML file, then overridden from the
//! environment. Immutable afterwards.
//!
//! ## Config File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//! drain_timeout_secs = 30
//!
//! [[shard_stores]]
//! host = "127.0.0.1"
//! port = 5001
//! # one entry per shard, in shard order
//!
//! [storage]
//! data_file = "./data/shards.bin"
//! max_blob_size = 536870912
//!
//! [coordinator]
//! fan_out = "parallel"
//! max_file_size = 1073741824
//! shard_timeout_secs = 30
//! ```
//!
//! ## Environment Overrides
//!
//! `SERVER_HOST`, `SERVER_PORT`, `SUB_SERVER_{1,2,3}_HOST`,
//! `SUB_SERVER_{1,2,3}_PORT`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use ts_01_shard_store::{StoreConfig, DEFAULT_MAX_BLOB_SIZE};
use ts_02_shard_router::{ShardRouter, StoreAddress, SHARD_COUNT};
use ts_03_coordinator::{CoordinatorConfig, FanOutMode, DEFAULT_MAX_FILE_SIZE};

/// Config file read when none is named.
pub const DEFAULT_CONFIG_PATH: &str = "ts-node.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Cannot read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Invalid config file: {0}")]
    Parse(String),

    /// A value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Listening address of this node.
    pub server: ServerConfig,
    /// Shard stores in shard order (coordinator role).
    pub shard_stores: Vec<StoreAddress>,
    /// Blob persistence (store role).
    pub storage: StorageConfig,
    /// Fan-out behaviour (coordinator role).
    pub coordinator: CoordinatorConfig,
}

/// Listening address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Wait for open connections after shutdown; `None` keeps the server
    /// default.
    pub drain_timeout: Option<Duration>,
}

impl ServerConfig {
    /// `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            drain_timeout: None,
        }
    }
}

/// Shard store persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Snapshot file; `None` keeps blobs in memory only.
    pub data_file: Option<PathBuf>,
    /// Largest blob a store accepts.
    pub max_blob_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

impl StorageConfig {
    /// Store service configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.max_blob_size)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            shard_stores: default_shard_stores(),
            storage: StorageConfig::default(),
            coordinator: CoordinatorConfig::default(),
        }
    }
}

fn default_shard_stores() -> Vec<StoreAddress> {
    (1..=SHARD_COUNT as u16)
        .map(|n| StoreAddress::new("127.0.0.1", 5000 + n))
        .collect()
}

// ----------------------------------------------------------------------------
// File schema
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    server: ServerSection,
    shard_stores: Option<Vec<StoreAddress>>,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    coordinator: CoordinatorSection,
}

#[derive(Debug, Deserialize, Default)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
    drain_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct StorageSection {
    data_file: Option<PathBuf>,
    max_blob_size: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct CoordinatorSection {
    fan_out: Option<FanOutMode>,
    max_file_size: Option<u64>,
    shard_timeout_secs: Option<u64>,
}

impl NodeConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] if it exists.
    ///
    /// A missing default file yields defaults; a missing named file is an
    /// error. Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read and parse a config file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let server = ServerConfig {
            host: file.server.host.unwrap_or(defaults.server.host),
            port: file.server.port.unwrap_or(defaults.server.port),
            drain_timeout: file.server.drain_timeout_secs.map(Duration::from_secs),
        };

        let storage = StorageConfig {
            data_file: file.storage.data_file,
            max_blob_size: file
                .storage
                .max_blob_size
                .unwrap_or(defaults.storage.max_blob_size),
        };

        let cc = file.coordinator;
        let coordinator = CoordinatorConfig {
            fan_out: cc.fan_out.unwrap_or_default(),
            max_file_size: cc.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            shard_timeout: cc.shard_timeout_secs.map(Duration::from_secs),
        };

        Ok(Self {
            server,
            shard_stores: file.shard_stores.unwrap_or(defaults.shard_stores),
            storage,
            coordinator,
        })
    }

    /// Apply the legacy property names on top of the file values.
    ///
    /// `lookup` returns the value of a variable if set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_port("SERVER_PORT", &port)?;
        }

        for n in 1..=SHARD_COUNT {
            let host_var = format!("SUB_SERVER_{}_HOST", n);
            let port_var = format!("SUB_SERVER_{}_PORT", n);
            let host = lookup(&host_var);
            let port = lookup(&port_var);
            if host.is_none() && port.is_none() {
                continue;
            }

            let defaults = default_shard_stores();
            while self.shard_stores.len() < n {
                let next = defaults[self.shard_stores.len()].clone();
                self.shard_stores.push(next);
            }
            let store = &mut self.shard_stores[n - 1];
            if let Some(host) = host {
                store.host = host;
            }
            if let Some(port) = port {
                store.port = parse_port(&port_var, &port)?;
            }
        }

        Ok(())
    }

    /// Checks shared by every role.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server port must be non-zero".into()));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server host must be set".into()));
        }
        Ok(())
    }

    /// Routing table for the coordinator role.
    pub fn router(&self) -> Result<ShardRouter, ConfigError> {
        ShardRouter::new(self.shard_stores.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::Invalid(format!(
            "{} must be a port number, got {:?}",
            name, value
        ))),
    }
}
