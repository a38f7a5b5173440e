//! Package signing capability
//!
//! The container format is the one thing a downstream installer is strict
//! about, so signing sits behind a trait: the pipeline hands a staged tree
//! and a key path to a signer and gets package bytes back. [`crate::crx3`]
//! provides the Chrome CRX3 implementation; tests substitute mocks.

use camino::Utf8Path;
use crxforge_core::Result;

/// Produces a signed package from a staged source tree
pub trait PackageSigner {
    /// Sign the staged tree with the given private key, returning the
    /// complete package bytes
    fn sign(&self, staging_dir: &Utf8Path, key_path: &Utf8Path) -> Result<Vec<u8>>;

    /// File extension of the produced package
    fn package_extension(&self) -> &'static str {
        "crx"
    }
}
