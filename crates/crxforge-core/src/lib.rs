//! # crxforge-core
//!
//! Core library for the crxforge CLI providing:
//! - Configuration file parsing (crxforge.yaml)
//! - Error types shared by the packaging pipeline
//! - Domain types (extension identifiers, build results)

pub mod config;
pub mod error;
pub mod types;

pub use config::{ExtensionEntry, ForgeConfig, SiteConfig};
pub use error::{Error, Result};
pub use types::{BuildResult, BuildStage, ExtensionId};
