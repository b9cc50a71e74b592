//! # Configuration Management
//!
//! Protocol constants and centralized configuration for the comms library.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Environment variables via `from_env()` (`COMMS_*`)
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - The frame size ceiling bounds memory allocation against malicious or
//!   corrupt length fields; it is validated before any payload is read.

use crate::error::{CommsError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic bytes that open every frame (0x434F4D53 → "COMS")
pub const MAGIC_BYTES: [u8; 4] = [0x43, 0x4F, 0x4D, 0x53];

/// Full frame header length: magic bytes plus the 4-byte big-endian length
pub const HEADER_LEN: usize = MAGIC_BYTES.len() + 4;

/// Ceiling on a declared frame length (16 MB). Deliberately far below the
/// full u32 range so a declared length can never overflow arithmetic on it.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Chunk size for assembling an inbound payload
pub const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Buffer size used by relay forwarding tasks
pub const RELAY_BUFFER_SIZE: usize = 64 * 1024;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CommsConfig {
    /// Server-specific configuration
    #[serde(default)]
    pub server: ServerSection,

    /// Client-specific configuration
    #[serde(default)]
    pub client: ClientSection,

    /// Relay-specific configuration
    #[serde(default)]
    pub relay: RelaySection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSection,
}

impl CommsConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CommsError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CommsError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CommsError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("COMMS_SERVER_ADDRESS") {
            config.server.address = addr;
        }

        if let Ok(cert) = std::env::var("COMMS_SERVER_CERT_PATH") {
            config.server.cert_path = cert;
        }

        if let Ok(key) = std::env::var("COMMS_SERVER_KEY_PATH") {
            config.server.key_path = key;
        }

        if let Ok(name) = std::env::var("COMMS_CLIENT_SERVER_NAME") {
            config.client.server_name = name;
        }

        if let Ok(size) = std::env::var("COMMS_RELAY_BUFFER_SIZE") {
            if let Ok(val) = size.parse::<usize>() {
                config.relay.buffer_size = val;
            }
        }

        if let Ok(level) = std::env::var("COMMS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.relay.validate());
        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CommsError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    /// Server listen address (e.g., "0.0.0.0:7878")
    pub address: String,

    /// Path to the PEM certificate chain
    pub cert_path: String,

    /// Path to the PEM PKCS#8 private key
    pub key_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:7878"),
            cert_path: String::from("cert.pem"),
            key_path: String::from("key.pem"),
        }
    }
}

impl ServerSection {
    /// Validate server configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid server address format: '{}' (expected format: '0.0.0.0:7878')",
                self.address
            ));
        }

        if self.cert_path.is_empty() {
            errors.push("Server certificate path cannot be empty".to_string());
        }

        if self.key_path.is_empty() {
            errors.push("Server key path cannot be empty".to_string());
        }

        errors
    }
}

/// Client-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSection {
    /// Name presented for TLS server certificate verification
    pub server_name: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            server_name: String::from("localhost"),
        }
    }
}

/// Relay-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelaySection {
    /// Forwarding buffer size in bytes
    pub buffer_size: usize,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            buffer_size: RELAY_BUFFER_SIZE,
        }
    }
}

impl RelaySection {
    /// Validate relay configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.buffer_size == 0 {
            errors.push("Relay buffer size must be greater than 0".to_string());
        } else if self.buffer_size > MAX_MESSAGE_SIZE {
            errors.push(format!(
                "Relay buffer size too large: {} (max: {MAX_MESSAGE_SIZE})",
                self.buffer_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Log level filter ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Emit JSON-structured log lines instead of human-readable ones
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
        }
    }
}

impl LoggingSection {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let known = ["trace", "debug", "info", "warn", "error"];
        if !known.contains(&self.level.as_str()) {
            errors.push(format!(
                "Unknown log level: '{}' (expected one of: {})",
                self.level,
                known.join(", ")
            ));
        }

        errors
    }
}
