//! # Configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. An optional TOML file (`--config` / `GREETER_CONFIG`).
//! 3. Individual CLI flags, each also readable from an environment variable.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8787"
//!
//! [object]
//! name = "foo"
//! flavor = "presence"
//! recount_delay_ms = 500
//!
//! [storage]
//! backend = "file"
//! path = "data/greeter.json"
//!
//! [cors]
//! allowed_origins = ["http://localhost:5173"]
//! ```

use crate::greeter::{Flavor, DEFAULT_MAILBOX, DEFAULT_RECOUNT_DELAY};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid CORS setting: {0}")]
    InvalidCors(String),
    #[error("object.mailbox must be at least 1")]
    ZeroMailbox,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub object: ObjectConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8787)),
        }
    }
}

/// Settings of the greeter object.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// The fixed logical name every request is routed to.
    pub name: String,
    pub flavor: Flavor,
    pub recount_delay_ms: u64,
    pub mailbox: usize,
}

impl ObjectConfig {
    pub fn recount_delay(&self) -> Duration {
        Duration::from_millis(self.recount_delay_ms)
    }
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            name: "foo".to_string(),
            flavor: Flavor::default(),
            recount_delay_ms: DEFAULT_RECOUNT_DELAY.as_millis() as u64,
            mailbox: DEFAULT_MAILBOX,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost when the process exits.
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from("data/greeter.json"),
        }
    }
}

/// Cross-origin policy applied to the HTTP routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let strings =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            allowed_origins: strings(&[
                "http://localhost:5173",
                "https://durable-object-frontend.pages.dev",
            ]),
            allowed_methods: strings(&["GET", "OPTIONS", "POST", "PUT", "DELETE"]),
            allowed_headers: strings(&["Origin", "Content-Type", "Authorization"]),
            allow_credentials: true,
        }
    }
}

impl Config {
    /// Loads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Rejects settings that parse but can't be run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object.mailbox == 0 {
            return Err(ConfigError::ZeroMailbox);
        }
        Ok(())
    }
}

/// `--flavor` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlavorArg {
    Presence,
    Basic,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Presence => Flavor::Presence,
            FlavorArg::Basic => Flavor::Basic,
        }
    }
}

/// Command line of the `greeter-object` binary.
#[derive(Debug, Parser)]
#[command(name = "greeter-object", version, about = "Serve the greeter object over HTTP and WebSocket")]
pub struct Cli {
    /// TOML config file
    #[arg(long, env = "GREETER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "GREETER_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Protocol flavor of the object
    #[arg(long, env = "GREETER_FLAVOR", value_enum)]
    pub flavor: Option<FlavorArg>,

    /// Persist state to this file instead of memory
    #[arg(long, env = "GREETER_DATA")]
    pub data: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file, if any, and applies the flags on top.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(flavor) = self.flavor {
            config.object.flavor = flavor.into();
        }
        if let Some(path) = self.data {
            config.storage.backend = StorageBackend::File;
            config.storage.path = path;
        }
        config.validate()?;
        Ok(config)
    }
}
