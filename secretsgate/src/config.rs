//! Configuration management

use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Which secret store backs the handlers
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// AWS Secrets Manager via the ambient credential chain
    #[serde(rename = "aws")]
    Aws {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        profile: Option<String>,
        #[serde(default)]
        endpoint_url: Option<String>,
    },

    /// Process-local store, lost on exit
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Aws {
            region: None,
            profile: None,
            endpoint_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Aws,
    Memory,
}

/// Command-line values that take precedence over the loaded configuration
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store: Option<StoreKind>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Without `path`, an optional `secretsgate.{toml,yaml,json}` in the
    /// working directory is read. `SECRETSGATE__SERVER__PORT` style
    /// variables override file values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::with_name("secretsgate").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SECRETSGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        match overrides.store {
            Some(StoreKind::Memory) => self.store = StoreConfig::Memory,
            Some(StoreKind::Aws) if self.store == StoreConfig::Memory => {
                self.store = StoreConfig::default();
            }
            _ => {}
        }

        match &mut self.store {
            StoreConfig::Aws {
                region,
                profile,
                endpoint_url,
            } => {
                if overrides.region.is_some() {
                    *region = overrides.region;
                }
                if overrides.profile.is_some() {
                    *profile = overrides.profile;
                }
                if overrides.endpoint_url.is_some() {
                    *endpoint_url = overrides.endpoint_url;
                }
            }
            StoreConfig::Memory => {
                if overrides.region.is_some()
                    || overrides.profile.is_some()
                    || overrides.endpoint_url.is_some()
                {
                    warn!("AWS options ignored with the in-memory store");
                }
            }
        }
    }

    /// Bind the listener, resolving `host` as a name or address
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind((self.server.host.as_str(), self.server.port)).await
    }
}
