//! Configuration management for cibauth
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CibauthError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cibauth/config.yml";

/// Main configuration structure for cibauth
///
/// This structure holds everything the login flow needs: the
/// authorization server endpoint, the identity announced at issuance,
/// terminal QR rendering options, and the user-facing prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the authorization server (scheme + host, no trailing slash required)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Identity of this machine towards the authorization server
    #[serde(default)]
    pub server: ServerConfig,

    /// Terminal QR rendering settings
    #[serde(default)]
    pub qr: QrConfig,

    /// Prompt template shown before polling starts
    ///
    /// `{url}` is replaced with the validation URL and `{qr}` with the
    /// rendered QR block.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_prompt() -> String {
    "Scan the code to log in:\n{qr}\nor visit {url}\n".to_string()
}

/// Server identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Value sent as `server_id` when opening an authorization transaction
    #[serde(default = "default_server_id")]
    pub id: String,
}

fn default_server_id() -> String {
    "default".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id: default_server_id(),
        }
    }
}

/// Terminal QR rendering configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QrConfig {
    /// Render two characters per module instead of packing two rows per line
    #[serde(default)]
    pub big: bool,

    /// Swap glyph shapes for light terminal themes
    #[serde(default)]
    pub inverse: bool,

    /// Prefix prepended to every rendered line
    #[serde(default)]
    pub before_line: String,

    /// Suffix appended to every rendered line
    #[serde(default)]
    pub after_line: String,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            endpoint: default_endpoint(),
            server: ServerConfig::default(),
            qr: QrConfig::default(),
            prompt: default_prompt(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CibauthError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CibauthError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("CIBAUTH_ENDPOINT") {
            tracing::debug!(endpoint = %endpoint, "Env override: CIBAUTH_ENDPOINT");
            self.endpoint = endpoint;
        }

        if let Ok(server_id) = std::env::var("CIBAUTH_SERVER_ID") {
            tracing::debug!(server_id = %server_id, "Env override: CIBAUTH_SERVER_ID");
            self.server.id = server_id;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the endpoint is a usable HTTP(S) URL and that the server
    /// identity is set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(CibauthError::Config("endpoint cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.endpoint)
            .map_err(|e| CibauthError::Config(format!("Invalid endpoint URL: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CibauthError::Config(format!(
                "Endpoint must use http or https, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.server.id.is_empty() {
            return Err(CibauthError::Config("server.id cannot be empty".to_string()).into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
