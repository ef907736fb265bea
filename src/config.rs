use anyhow::{Context, bail};
use serde::Deserialize;

use crate::http::connection::ConnectionLimits;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub read_chunk_size: usize,
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = ConnectionLimits::default();
        Self {
            listen_addr: "127.0.0.1:8081".to_string(),
            read_chunk_size: limits.read_chunk_size,
            max_request_bytes: limits.max_request_bytes,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file from `RELAY_CONFIG`, then `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                serde_yaml::from_str::<Self>(&raw)
                    .with_context(|| format!("invalid config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            read_chunk_size: self.server.read_chunk_size,
            max_request_bytes: self.server.max_request_bytes,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.read_chunk_size == 0 {
            bail!("server.read_chunk_size must be greater than zero");
        }
        if self.server.max_request_bytes == 0 {
            bail!("server.max_request_bytes must be greater than zero");
        }
        Ok(())
    }
}
