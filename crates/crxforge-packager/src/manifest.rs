//! Staged manifest rewriting
//!
//! Two fields of the extension manifest change between the source tree and
//! the package: the embedded `key` is stripped (a leftover key would make
//! Chrome compute the identity from it instead of the signing key file) and
//! `update_url` is pointed at the self-hosted feed. Everything else passes
//! through untouched. Only the staged copy is ever mutated.

use camino::Utf8Path;
use crxforge_core::{Error, Result};
use semver::Version;
use serde_json::Value;
use std::fs;
use tracing::debug;

/// Manifest file name inside an extension source tree
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Embedded trust field stripped from the staged manifest
const KEY_FIELD: &str = "key";

/// Distribution-source field written to the staged manifest
const UPDATE_URL_FIELD: &str = "update_url";

/// Rewrite a staged manifest in place and return its version.
///
/// Idempotent on `update_url`: rewriting a manifest that already carries the
/// expected value changes nothing but the serialization.
pub fn rewrite_manifest(manifest_path: &Utf8Path, update_url: &str) -> Result<Version> {
    let content = fs::read_to_string(manifest_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::manifest_schema(format!("missing {MANIFEST_FILENAME}: {manifest_path}"))
        } else {
            Error::Io(e)
        }
    })?;

    let mut doc: Value = serde_json::from_str(&content)
        .map_err(|e| Error::manifest_schema(format!("malformed {MANIFEST_FILENAME}: {e}")))?;

    let fields = doc
        .as_object_mut()
        .ok_or_else(|| Error::manifest_schema(format!("{MANIFEST_FILENAME} must be a JSON object")))?;

    let version_str = fields
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::manifest_schema("missing required field: version"))?;
    let version =
        Version::parse(version_str).map_err(|_| Error::invalid_version(version_str))?;

    fields.remove(KEY_FIELD);
    fields.insert(UPDATE_URL_FIELD.to_string(), Value::from(update_url));

    // Pretty-printed so the staged copy stays auditable
    let serialized = serde_json::to_string_pretty(&doc)?;
    fs::write(manifest_path, serialized)?;

    debug!("Rewrote {} with update_url: {}", manifest_path, update_url);
    Ok(version)
}
