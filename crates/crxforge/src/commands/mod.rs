//! CLI command implementations

pub mod batch;
pub mod build;
pub mod config;
pub mod id;
