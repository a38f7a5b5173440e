//! # crxforge-packager
//!
//! The packaging pipeline behind the crxforge CLI:
//! - Extension identity derivation from RSA signing keys
//! - Staged manifest rewriting (strip `key`, point `update_url` at the feed)
//! - CRX3 package signing
//! - Update feed, distribution policy, and release manifest generation
//! - Sequential batch orchestration with per-extension failure isolation

pub mod batch;
pub mod builder;
pub mod crx3;
pub mod feed;
pub mod identity;
pub mod manifest;
pub mod policy;
pub mod signer;
pub mod staging;

pub use batch::{BatchReport, BatchRunner, BuildFailure};
pub use builder::{BuildRequest, PackageBuilder, StageError};
pub use crx3::Crx3Signer;
pub use identity::{derive_id, id_from_key, PublicKeyExtractor, RsaPublicKeyExtractor};
pub use signer::PackageSigner;
pub use staging::StagingArea;
