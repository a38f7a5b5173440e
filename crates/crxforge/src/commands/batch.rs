//! Batch command - build every configured extension

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use crxforge_core::ForgeConfig;
use crxforge_packager::policy::POLICY_FILENAME;
use crxforge_packager::{
    BatchRunner, Crx3Signer, PackageBuilder, RsaPublicKeyExtractor,
};
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::cli::BatchArgs;
use crate::output;

#[derive(Tabled)]
struct BuildRow {
    #[tabled(rename = "Extension")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Version")]
    version: String,
}

pub fn run(args: BatchArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = ForgeConfig::load(config_path).context("Failed to load configuration")?;
    if config.extensions().is_empty() {
        output::info("No extensions configured");
        return Ok(());
    }

    let extractor = RsaPublicKeyExtractor;
    let signer = Crx3Signer;
    let builder = PackageBuilder::new(&extractor, &signer);
    let report = BatchRunner::new(&config, builder)
        .with_fail_fast(args.fail_fast)
        .run()?;

    if !report.built.is_empty() {
        output::header("Built extensions");
        let rows: Vec<BuildRow> = report
            .built
            .iter()
            .map(|r| BuildRow {
                name: r.name.clone(),
                id: r.id.to_string(),
                version: r.version.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());
        println!("{table}");

        output::kv(
            "Policy",
            config.output_dir().join(POLICY_FILENAME).as_str(),
        );
    }

    if report.all_succeeded() {
        output::success(&format!(
            "Built {} extension(s) into {}",
            report.built.len(),
            config.output_dir()
        ));
        Ok(())
    } else {
        for failure in &report.failures {
            output::error(&failure.to_string());
        }
        Err(anyhow!(
            "{} of {} extension(s) failed to build",
            report.failures.len(),
            config.extensions().len()
        ))
    }
}
