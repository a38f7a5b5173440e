//! Error types for crxforge-core

use thiserror::Error;

/// Result type alias using crxforge-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for crxforge
///
/// Every failure a build can hit maps to one of these variants so callers
/// can tell key trouble apart from manifest trouble apart from signing
/// trouble. A per-extension build either fully succeeds or surfaces exactly
/// one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Signing key could not be read
    #[error("Failed to read signing key {path}: {source}")]
    KeyRead {
        path: String,
        source: std::io::Error,
    },

    /// Signing key material could not be parsed or its public component
    /// could not be encoded
    #[error("Failed to decode signing key {path}: {message}")]
    KeyEncoding { path: String, message: String },

    /// Extension manifest is missing a required field or is malformed
    #[error("Invalid extension manifest: {message}")]
    ManifestSchema { message: String },

    /// Invalid semver version
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Malformed extension identifier
    #[error("Invalid extension identifier: {value} (expected 32 chars in a-p)")]
    InvalidIdentifier { value: String },

    /// Package signing failed
    #[error("Package signing failed: {message}")]
    Signing { message: String },

    /// Unknown extension name
    #[error("Unknown extension: {extension}")]
    UnknownExtension { extension: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a key read error
    pub fn key_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::KeyRead {
            path: path.into(),
            source,
        }
    }

    /// Create a key encoding error
    pub fn key_encoding(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KeyEncoding {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a manifest schema error
    pub fn manifest_schema(message: impl Into<String>) -> Self {
        Self::ManifestSchema {
            message: message.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.into(),
        }
    }

    /// Create a signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Create an unknown extension error
    pub fn unknown_extension(extension: impl Into<String>) -> Self {
        Self::UnknownExtension {
            extension: extension.into(),
        }
    }
}
