//! # Configuration
//!
//! Loading of [`MintConfig`] from static values or TOML.
//!
//! ## Config File Format
//!
//! ```toml
//! [mint]
//! owner = "0x1111111111111111111111111111111111111111"
//! max_mint_limit = 100
//! platform_mint_limit = 20
//! ```

use crate::domain::entities::MintConfig;
use qm_types::parse_address;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Values parsed but are inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Source of the mint configuration.
pub trait ConfigProvider: Send + Sync {
    /// The validated configuration.
    fn mint_config(&self) -> MintConfig;
}

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider.
///
/// Useful for testing and development. For deployments, use `TomlConfigProvider`.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: MintConfig,
}

impl StaticConfigProvider {
    /// Wrap a configuration after validating it.
    pub fn new(config: MintConfig) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self { config })
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn mint_config(&self) -> MintConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading
// ============================================================================

#[derive(Debug, Deserialize)]
struct ConfigFile {
    mint: MintSection,
}

#[derive(Debug, Deserialize)]
struct MintSection {
    owner: String,
    max_mint_limit: u64,
    #[serde(default)]
    platform_mint_limit: u64,
}

/// TOML-based configuration provider.
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: MintConfig,
}

impl TomlConfigProvider {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let owner = parse_address(&file.mint.owner)
            .map_err(|e| ConfigError::Invalid(format!("owner: {e}")))?;
        let config = MintConfig {
            owner,
            max_mint_limit: file.mint.max_mint_limit,
            platform_mint_limit: file.mint.platform_mint_limit,
        };
        config.validate().map_err(ConfigError::Invalid)?;

        Ok(Self { config })
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn mint_config(&self) -> MintConfig {
        self.config.clone()
    }
}
