//! Shared type definitions for the packaging pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in a Chrome extension identifier
pub const EXTENSION_ID_LEN: usize = 32;

/// A canonical extension identifier.
///
/// Exactly 32 lowercase characters in `a`..=`p`, each encoding one nibble of
/// the SHA-256 digest of the signing key's public component. This is the
/// identity the installer computes on its side, so the derivation must be
/// reproduced bit-exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Validate and wrap an identifier string
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() != EXTENSION_ID_LEN || !value.bytes().all(|b| (b'a'..=b'p').contains(&b)) {
            return Err(Error::invalid_identifier(value));
        }
        Ok(Self(value))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExtensionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ExtensionId> for String {
    fn from(id: ExtensionId) -> Self {
        id.0
    }
}

/// Outcome of one extension's successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// Extension name (directory and artifact naming)
    pub name: String,

    /// Identifier derived from the signing key
    pub id: ExtensionId,

    /// Version taken from the rewritten manifest
    pub version: semver::Version,
}

/// Pipeline stage, used to name where a build failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Reading the key and deriving the identifier
    KeyDerivation,
    /// Creating the staging copy of the source tree
    Staging,
    /// Rewriting the staged manifest
    ManifestRewrite,
    /// Signing the staged payload
    Signing,
    /// Writing the package file to the output directory
    PackageWrite,
    /// Writing the update feed
    FeedWrite,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::KeyDerivation => "key derivation",
            BuildStage::Staging => "staging",
            BuildStage::ManifestRewrite => "manifest rewrite",
            BuildStage::Signing => "signing",
            BuildStage::PackageWrite => "package write",
            BuildStage::FeedWrite => "feed write",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifier() {
        let id = ExtensionId::new("abcdefghijklmnopabcdefghijklmnop").unwrap();
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(id.to_string(), "abcdefghijklmnopabcdefghijklmnop");
    }

    #[test]
    fn test_identifier_rejects_wrong_length() {
        let err = ExtensionId::new("abc").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_identifier_rejects_out_of_alphabet() {
        // 'q' is one past the 16-symbol alphabet
        let err = ExtensionId::new("qbcdefghijklmnopabcdefghijklmnop").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));

        // Hex digits are not valid either; the id is the mapped form
        assert!(ExtensionId::new("0123456789abcdef0123456789abcdef").is_err());
    }

    #[test]
    fn test_identifier_roundtrips_through_serde() {
        let id = ExtensionId::new("ppppppppppppppppaaaaaaaaaaaaaaaa").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ppppppppppppppppaaaaaaaaaaaaaaaa\"");
        let back: ExtensionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_build_result_serializes() {
        let result = BuildResult {
            name: "widget".to_string(),
            id: ExtensionId::new("abcdefghijklmnopabcdefghijklmnop").unwrap(),
            version: semver::Version::new(1, 2, 3),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "widget");
        assert_eq!(json["id"], "abcdefghijklmnopabcdefghijklmnop");
        assert_eq!(json["version"], "1.2.3");
    }

    #[test]
    fn test_identifier_serde_rejects_invalid() {
        let result: std::result::Result<ExtensionId, _> = serde_json::from_str("\"nope\"");
        assert!(result.is_err());
    }
}
