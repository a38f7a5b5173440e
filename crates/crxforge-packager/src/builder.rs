//! Per-extension package build
//!
//! Build protocol: derive the identifier from the key before any filesystem
//! mutation, stage a clean copy of the source, rewrite the staged manifest,
//! sign, write the package. The staging guard removes the working copy on
//! every exit path, so a build either fully succeeds or leaves nothing
//! behind. Builds of the same name share a staging path and must run
//! sequentially.

use camino::{Utf8Path, Utf8PathBuf};
use crxforge_core::{BuildResult, BuildStage, Error};
use std::fs;
use thiserror::Error as ThisError;
use tracing::{debug, info};

use crate::feed::write_feed;
use crate::identity::{id_from_key, PublicKeyExtractor};
use crate::manifest::rewrite_manifest;
use crate::signer::PackageSigner;
use crate::staging::StagingArea;

/// A build failure, tagged with the pipeline stage it happened in
#[derive(Debug, ThisError)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    /// Stage the build failed in
    pub stage: BuildStage,
    /// Underlying error
    #[source]
    pub source: Error,
}

impl StageError {
    fn new(stage: BuildStage, source: Error) -> Self {
        Self { stage, source }
    }
}

/// Everything one extension's build needs
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    /// Extension name
    pub name: &'a str,
    /// Unpacked extension source
    pub source_dir: &'a Utf8Path,
    /// PEM signing key
    pub key_path: &'a Utf8Path,
    /// Root output directory (artifacts land in `{output_dir}/{name}/`)
    pub output_dir: &'a Utf8Path,
    /// Base distribution URL, without a trailing slash
    pub base_url: &'a str,
}

/// Builds signed packages from extension sources
pub struct PackageBuilder<'a> {
    extractor: &'a dyn PublicKeyExtractor,
    signer: &'a dyn PackageSigner,
}

impl<'a> PackageBuilder<'a> {
    /// Create a builder over the given key-extraction and signing
    /// capabilities
    pub fn new(extractor: &'a dyn PublicKeyExtractor, signer: &'a dyn PackageSigner) -> Self {
        Self { extractor, signer }
    }

    /// Build one extension: package at
    /// `{output_dir}/{name}/{name}.{ext}`, returning the identifier and
    /// manifest version.
    pub fn build(&self, request: &BuildRequest<'_>) -> Result<BuildResult, StageError> {
        let name = request.name;
        info!("Building extension: {}", name);

        // Identity first: a key problem aborts before anything is written
        let id = id_from_key(self.extractor, request.key_path)
            .map_err(|e| StageError::new(BuildStage::KeyDerivation, e))?;
        debug!("Extension id for {}: {}", name, id);

        let staging = StagingArea::create(request.output_dir, name, request.source_dir)
            .map_err(|e| StageError::new(BuildStage::Staging, e))?;

        let update_url = format!("{}/{}/update.xml", request.base_url, name);
        let version = rewrite_manifest(&staging.manifest_path(), &update_url)
            .map_err(|e| StageError::new(BuildStage::ManifestRewrite, e))?;

        let package = self
            .signer
            .sign(staging.path(), request.key_path)
            .map_err(|e| StageError::new(BuildStage::Signing, e))?;

        let package_path = self.package_path(request.output_dir, name);
        let write = || -> crxforge_core::Result<()> {
            fs::create_dir_all(package_path.parent().expect("package path has a parent"))?;
            fs::write(&package_path, &package)?;
            Ok(())
        };
        write().map_err(|e| StageError::new(BuildStage::PackageWrite, e))?;
        info!("Created package: {}", package_path);

        // Guard drop removes staging here, success or failure above
        Ok(BuildResult {
            name: name.to_string(),
            id,
            version,
        })
    }

    /// Build one extension and write its update feed; the per-extension
    /// pipeline only counts as succeeded once both files are on disk.
    pub fn build_with_feed(
        &self,
        request: &BuildRequest<'_>,
    ) -> Result<BuildResult, StageError> {
        let result = self.build(request)?;
        write_feed(
            request.output_dir,
            request.name,
            &result.id,
            &result.version,
            request.base_url,
            self.signer.package_extension(),
        )
        .map_err(|e| StageError::new(BuildStage::FeedWrite, e))?;
        Ok(result)
    }

    /// Deterministic package path for an extension
    pub fn package_path(&self, output_dir: &Utf8Path, name: &str) -> Utf8PathBuf {
        output_dir
            .join(name)
            .join(format!("{name}.{}", self.signer.package_extension()))
    }
}
