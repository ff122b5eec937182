//! Configuration module.
//!
//! Handles loading, validating, and layering configuration. Every setting has
//! a stock default; a TOML file, the environment, and CLI flags override it in
//! that order:
//!
//! ```text
//! Config::default()        ← stock defaults
//!   ← --config squarefit.toml   (sparse, merged key by key)
//!   ← PORT=9000                 (environment)
//!   ← --port 9001               (CLI flags, applied by main)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! addr = "0.0.0.0"             # Bind address (all interfaces)
//! port = 8080                  # TCP port; PORT env var overrides
//! public_dir = "public"        # Static files served for every other path
//! max_upload_bytes = 33554432  # Largest accepted upload body (32 MiB)
//!
//! [imaging]
//! output = "jpeg"              # "jpeg" or "preserve"
//! quality = 90                 # JPEG quality (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality, SquareParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full application configuration, passed explicitly to the server and the
/// batch walker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP listener and upload limits.
    pub server: ServerConfig,
    /// Encoding policy shared by the upload endpoint and batch mode.
    pub imaging: ImagingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.imaging.quality) {
            return Err(ConfigError::Validation(
                "imaging.quality must be 1-100".into(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be greater than zero".into(),
            ));
        }
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.addr must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production
    /// and a map in tests.
    ///
    /// - `PORT` → `server.port`
    ///
    /// An empty `PORT` is treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("PORT must be a TCP port number, got {port:?}"))
            })?;
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address. `0.0.0.0` listens on all interfaces.
    pub addr: String,
    /// TCP port.
    pub port: u16,
    /// Directory served for every path other than `/upload`.
    pub public_dir: PathBuf,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// `addr:port` in the form `TcpListener::bind` accepts.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".to_string(),
            port: 8080,
            public_dir: PathBuf::from("public"),
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagingConfig {
    /// Output format policy.
    pub output: OutputFormat,
    /// JPEG quality (1 = worst, 100 = best). Ignored for PNG output.
    pub quality: u32,
}

impl ImagingConfig {
    pub fn params(&self) -> SquareParams {
        SquareParams {
            output: self.output,
            quality: Quality::new(self.quality),
        }
    }
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            quality: Quality::default().value(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an optional TOML file.
///
/// Merges file values on top of stock defaults, rejects unknown keys, and
/// validates the result. `None` yields the stock defaults. Environment
/// overrides are applied separately with [`Config::apply_env`].
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# squarefit configuration
# =======================
#
# Every key is optional. Pass this file with `squarefit --config <FILE>`.
# Precedence: stock defaults < this file < environment < CLI flags.

# -----------------------------------------------------------------------------
# HTTP server (`squarefit serve`)
# -----------------------------------------------------------------------------
[server]
# Bind address. "0.0.0.0" listens on all interfaces.
addr = "0.0.0.0"

# TCP port. The PORT environment variable overrides this value.
port = 8080

# Directory served for every path other than /upload.
public_dir = "public"

# Largest accepted upload body in bytes (32 MiB).
max_upload_bytes = 33554432

# -----------------------------------------------------------------------------
# Imaging (upload endpoint and `squarefit batch`)
# -----------------------------------------------------------------------------
[imaging]
# Output format policy:
#   "jpeg"     - always re-encode as JPEG
#   "preserve" - re-encode in the format the source was decoded from
output = "jpeg"

# JPEG quality, 1 (smallest) to 100 (best). Ignored for PNG output.
quality = 90
"##
}
