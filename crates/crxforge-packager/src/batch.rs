//! Batch orchestration over the configured extension set
//!
//! Builds run strictly sequentially (the staging naming scheme is shared
//! per name). One extension's failure does not abort the batch: failures
//! are collected per extension with the stage they happened in, and the
//! policy and release documents are projected from the successes at the
//! end. An all-failed batch writes no projection documents.

use crxforge_core::{BuildResult, BuildStage, Error, ForgeConfig, Result};
use tracing::{info, warn};

use crate::builder::{BuildRequest, PackageBuilder, StageError};
use crate::policy::{DistributionPolicy, ReleaseManifest};

/// One extension's build failure within a batch
#[derive(Debug)]
pub struct BuildFailure {
    /// Extension name
    pub name: String,
    /// Stage the build failed in
    pub stage: BuildStage,
    /// Underlying error
    pub error: Error,
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} failed: {}", self.name, self.stage, self.error)
    }
}

/// Outcome of a whole batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful builds, in configuration order
    pub built: Vec<BuildResult>,
    /// Failures, in configuration order
    pub failures: Vec<BuildFailure>,
}

impl BatchReport {
    /// True when every configured extension built
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the package builder across all configured extensions
pub struct BatchRunner<'a> {
    config: &'a ForgeConfig,
    builder: PackageBuilder<'a>,
    fail_fast: bool,
}

impl<'a> BatchRunner<'a> {
    /// Create a runner over a loaded configuration
    pub fn new(config: &'a ForgeConfig, builder: PackageBuilder<'a>) -> Self {
        Self {
            config,
            builder,
            fail_fast: false,
        }
    }

    /// Stop at the first failing extension instead of continuing
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Build every configured extension, then write the distribution policy
    /// and release manifest projected from the successes.
    ///
    /// Returns `Err` only for batch-level problems (output directory or
    /// projection writes); per-extension failures land in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let output_dir = self.config.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        let base_url = self.config.base_url();
        let mut report = BatchReport::default();

        for entry in self.config.extensions() {
            let source_dir = self.config.source_dir(entry);
            let key_path = self.config.key_path(&entry.name);
            let request = BuildRequest {
                name: &entry.name,
                source_dir: &source_dir,
                key_path: &key_path,
                output_dir: &output_dir,
                base_url: &base_url,
            };

            match self.builder.build_with_feed(&request) {
                Ok(result) => {
                    info!("Built {} {} ({})", result.name, result.version, result.id);
                    report.built.push(result);
                }
                Err(StageError { stage, source }) => {
                    warn!("Build of {} failed during {}: {}", entry.name, stage, source);
                    report.failures.push(BuildFailure {
                        name: entry.name.clone(),
                        stage,
                        error: source,
                    });
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        // A fail-fast halt leaves the batch incomplete; projections over a
        // partial result set would misrepresent what is being served.
        if !report.built.is_empty() && !(self.fail_fast && !report.failures.is_empty()) {
            DistributionPolicy::new(&base_url, &report.built).write(&output_dir)?;
            ReleaseManifest::new(&report.built).write(&output_dir)?;
        }

        Ok(report)
    }
}
