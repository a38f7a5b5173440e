//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// crxforge - package and self-host Chrome extensions
#[derive(Parser, Debug)]
#[command(name = "crxforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to crxforge.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build one configured extension (package + update feed)
    Build(BuildArgs),

    /// Build all configured extensions and write the policy documents
    Batch(BatchArgs),

    /// Print the extension identifier for a signing key
    Id(IdArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Extension name, as listed in crxforge.yaml
    pub name: String,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Stop at the first failing extension instead of continuing
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Path to a PEM signing key
    pub key: Utf8PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new crxforge.yaml
    Init(ConfigInitArgs),

    /// Validate the configuration
    Validate(ConfigValidateArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// GitHub Pages owner
    #[arg(long, default_value = "my-user")]
    pub owner: String,

    /// GitHub Pages repository name
    #[arg(long, default_value = "my-extensions")]
    pub repo: String,

    /// Output file path
    #[arg(short, long, default_value = "crxforge.yaml")]
    pub output: Utf8PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Check that source directories and key files exist
    #[arg(long)]
    pub check_paths: bool,
}
