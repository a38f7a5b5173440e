//! Config command

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use crxforge_core::config::{starter_config, ForgeConfig};

use crate::cli::{ConfigCommands, ConfigInitArgs, ConfigValidateArgs};
use crate::output;

pub fn run(cmd: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => init(args),
        ConfigCommands::Validate(args) => validate(args, config_path),
    }
}

fn init(args: ConfigInitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow!(
            "File {} already exists. Use --force to overwrite.",
            args.output
        ));
    }

    std::fs::write(&args.output, starter_config(&args.owner, &args.repo))?;

    output::success(&format!("Created {}", args.output));
    output::info("Add extensions under the `extensions:` list and drop one PEM key per extension into `keys/`");
    Ok(())
}

fn validate(args: ConfigValidateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = ForgeConfig::load(config_path)?;

    output::success(&format!("Configuration is valid: {}", config.config_path));
    output::kv("Base URL", &config.base_url());
    output::kv("Output", config.output_dir().as_str());
    output::kv("Extensions", &config.extensions().len().to_string());

    if args.check_paths {
        let mut missing = 0;
        for entry in config.extensions() {
            let source = config.source_dir(entry);
            if !source.exists() {
                output::error(&format!("{}: source directory missing: {}", entry.name, source));
                missing += 1;
            }
            let key = config.key_path(&entry.name);
            if !key.exists() {
                output::error(&format!("{}: signing key missing: {}", entry.name, key));
                missing += 1;
            }
        }
        if missing > 0 {
            return Err(anyhow!("{missing} path(s) missing"));
        }
        output::success("All source directories and keys exist");
    }

    Ok(())
}
