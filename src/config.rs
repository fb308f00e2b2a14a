//! Configuration management for the lookup table resolver
//!
//! Loads configuration from YAML/TOML files and environment variables.
//! Environment variables override file values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::programs;
use crate::error::{AltError, AltResult};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// RPC endpoint configuration
    pub rpc: RpcConfig,
    /// Lookup table cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Program addresses
    #[serde(default)]
    pub program: ProgramConfig,
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
    /// processed, confirmed or finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_rpc_timeout() -> u64 {
    10_000
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_ms: default_rpc_timeout(),
            commitment: default_commitment(),
        }
    }
}

/// Lookup table cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached tables
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: i64,
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_cache_ttl() -> i64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Program addresses
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    /// Address Lookup Table program id
    #[serde(default = "default_lookup_table_program_id")]
    pub lookup_table_program_id: String,
}

fn default_lookup_table_program_id() -> String {
    programs::ADDRESS_LOOKUP_TABLE.to_string()
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            lookup_table_program_id: default_lookup_table_program_id(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (ALT_RESOLVER__*)
    /// 2. config/config.{yaml,toml} (if exists)
    /// 3. config.{yaml,toml} (if exists)
    /// 4. Default values
    pub fn load() -> AltResult<Self> {
        let config = Self::with_defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false))
            // ALT_RESOLVER__RPC__URL=http://localhost:8899 -> rpc.url
            .add_source(
                Environment::with_prefix("ALT_RESOLVER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from an explicit file, defaults filling the gaps
    pub fn load_from(path: impl AsRef<Path>) -> AltResult<Self> {
        let config = Self::with_defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("rpc.url", default_rpc_url())?
            .set_default("rpc.timeout_ms", default_rpc_timeout())?
            .set_default("rpc.commitment", default_commitment())?
            .set_default("cache.capacity", default_cache_capacity() as u64)?
            .set_default("cache.ttl_seconds", default_cache_ttl())?
            .set_default(
                "program.lookup_table_program_id",
                default_lookup_table_program_id(),
            )
    }

    /// Validate configuration values
    pub fn validate(&self) -> AltResult<()> {
        if self.rpc.url.is_empty() {
            return Err(invalid("RPC URL must be set".to_string()));
        }

        if self.cache.capacity == 0 {
            return Err(invalid(
                "Cache capacity must be greater than zero".to_string(),
            ));
        }

        self.commitment_config()?;
        self.program_id()?;

        Ok(())
    }

    /// Commitment level for account fetches
    pub fn commitment_config(&self) -> AltResult<CommitmentConfig> {
        match self.rpc.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(invalid(format!(
                "Unknown commitment level '{}', expected processed, confirmed or finalized",
                other
            ))),
        }
    }

    /// Parsed lookup table program id
    pub fn program_id(&self) -> AltResult<Pubkey> {
        Pubkey::from_str(&self.program.lookup_table_program_id).map_err(|e| {
            invalid(format!(
                "Invalid lookup table program id '{}': {}",
                self.program.lookup_table_program_id, e
            ))
        })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc.timeout_ms)
    }
}

fn invalid(message: String) -> AltError {
    AltError::Config(ConfigError::Message(message))
}
