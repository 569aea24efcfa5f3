//! Command line and file configuration of the relayer.

use alloy_primitives::{Address, Bytes, U256};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use stylustx_chain_eip155::chain::Eip155PaymasterConfig;

/// Environment variable that overrides the configured CORS origins.
pub const CORS_ENV: &str = "STYLUSTX_CORS_ALLOWED_ORIGINS";

#[derive(Debug, Parser)]
#[command(name = "stylustx-relayer", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the canonical encoding and digest of an authorization without touching the chain.
    Digest(DigestArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 9090)]
    pub port: u16,
    /// Path to the JSON configuration file
    #[arg(long, env = "CONFIG", default_value = "config.json")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct DigestArgs {
    #[arg(long)]
    pub actor: Address,
    #[arg(long)]
    pub target: Address,
    #[arg(long, default_value = "0")]
    pub value: U256,
    /// Hex call data, with or without `0x`
    #[arg(long, default_value = "0x")]
    pub payload: Bytes,
    #[arg(long, default_value = "0")]
    pub nonce: U256,
    /// Absolute deadline in Unix seconds
    #[arg(long)]
    pub deadline: U256,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Contents of the JSON config file.
///
/// ```json
/// {
///   "chain": "arbitrum-sepolia",
///   "paymaster": "0x...",
///   "confirmations": 1,
///   "signerEnv": "RELAYER_PRIVATE_KEY",
///   "corsAllowedOrigins": ["http://localhost:3000"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(flatten)]
    pub paymaster: Eip155PaymasterConfig,
    #[serde(default)]
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// CORS origins from the environment, falling back to the file. `None` means
    /// the built-in localhost defaults.
    pub fn cors_origins(&self) -> Option<String> {
        std::env::var(CORS_ENV)
            .ok()
            .or_else(|| self.cors_allowed_origins.as_ref().map(|o| o.join(",")))
    }
}
