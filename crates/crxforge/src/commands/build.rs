//! Build command - package a single configured extension

use anyhow::{Context, Result};
use camino::Utf8Path;
use crxforge_core::ForgeConfig;
use crxforge_packager::{BuildRequest, Crx3Signer, PackageBuilder, RsaPublicKeyExtractor};

use crate::cli::BuildArgs;
use crate::output;

pub fn run(args: BuildArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = ForgeConfig::load(config_path).context("Failed to load configuration")?;
    let entry = config.extension(&args.name)?;

    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {output_dir}"))?;

    let source_dir = config.source_dir(entry);
    let key_path = config.key_path(&entry.name);
    let base_url = config.base_url();

    let extractor = RsaPublicKeyExtractor;
    let signer = Crx3Signer;
    let builder = PackageBuilder::new(&extractor, &signer);
    let request = BuildRequest {
        name: &entry.name,
        source_dir: &source_dir,
        key_path: &key_path,
        output_dir: &output_dir,
        base_url: &base_url,
    };

    match builder.build_with_feed(&request) {
        Ok(result) => {
            output::success(&format!("Built {} v{}", result.name, result.version));
            output::kv("ID", result.id.as_str());
            output::kv(
                "Package",
                builder.package_path(&output_dir, &result.name).as_str(),
            );
            output::kv(
                "Feed",
                &format!("{base_url}/{}/update.xml", result.name),
            );
            Ok(())
        }
        Err(e) => {
            output::error(&format!("{}: {} failed: {}", args.name, e.stage, e.source));
            Err(e.into())
        }
    }
}
