//! Configuration file loading and parsing
//!
//! All identity and layout for a build comes from `crxforge.yaml`: the
//! publisher (GitHub Pages owner/repo or an explicit base URL), the keys
//! directory, the output directory, and the extension list. Nothing is read
//! from ambient state.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["crxforge.yaml", "crxforge.yml"];

/// Publisher identity used to derive distribution URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// GitHub Pages owner (e.g. "code1factor")
    pub owner: String,

    /// GitHub Pages repository name (e.g. "chrome-extensions")
    pub repo: String,

    /// Explicit base URL, overriding the github.io derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl SiteConfig {
    /// Base URL packages and feeds are served under, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.github.io/{}", self.owner, self.repo),
        }
    }
}

/// One extension to package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionEntry {
    /// Extension name (lowercase, hyphens allowed); names the key file,
    /// the staging directory, and the output subdirectory
    pub name: String,

    /// Directory holding the unpacked extension source
    pub source: Utf8PathBuf,
}

/// Parsed contents of crxforge.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfigFile {
    /// Publisher identity
    pub site: SiteConfig,

    /// Directory holding one PEM key per extension ({keys_dir}/{name}.pem)
    #[serde(default = "default_keys_dir")]
    pub keys_dir: Utf8PathBuf,

    /// Directory artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,

    /// Extensions to build
    pub extensions: Vec<ExtensionEntry>,
}

fn default_keys_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("keys")
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("dist")
}

/// Loaded crxforge configuration
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// The parsed configuration
    pub config: ForgeConfigFile,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,

    /// Directory relative paths in the config are resolved against
    pub working_dir: Utf8PathBuf,
}

impl ForgeConfig {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let (config_path, content) = if let Some(p) = path {
            let content = fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::config_not_found(p.as_str())
                } else {
                    Error::Io(e)
                }
            })?;
            (p.to_owned(), content)
        } else {
            Self::find_config()?
        };

        let working_dir = config_path
            .parent()
            .map(|p| p.to_owned())
            .unwrap_or_else(|| Utf8PathBuf::from("."));

        let config: ForgeConfigFile = serde_yaml_ng::from_str(&content)?;

        let loaded = Self {
            config,
            config_path,
            working_dir,
        };
        loaded.validate()?;
        debug!(
            "Loaded configuration from {} ({} extensions)",
            loaded.config_path,
            loaded.config.extensions.len()
        );
        Ok(loaded)
    }

    /// Find configuration file in current directory or parent directories
    fn find_config() -> Result<(Utf8PathBuf, String)> {
        let cwd = std::env::current_dir().map_err(Error::Io)?;
        let cwd = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;

        let mut current = cwd.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok((path, content));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::config_not_found(
            "crxforge.yaml (searched current and parent directories)",
        ))
    }

    /// Structural checks beyond what serde enforces
    fn validate(&self) -> Result<()> {
        let site = &self.config.site;
        if site.base_url.is_none() && (site.owner.is_empty() || site.repo.is_empty()) {
            return Err(Error::invalid_config(
                "site.owner and site.repo are required unless site.base_url is set",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.config.extensions {
            if entry.name.is_empty()
                || !entry
                    .name
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            {
                return Err(Error::invalid_config(format!(
                    "extension name '{}' must be lowercase alphanumeric with hyphens",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate extension name '{}'",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a configured extension by name
    pub fn extension(&self, name: &str) -> Result<&ExtensionEntry> {
        self.config
            .extensions
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::unknown_extension(name))
    }

    /// All configured extensions
    pub fn extensions(&self) -> &[ExtensionEntry] {
        &self.config.extensions
    }

    /// Base distribution URL
    pub fn base_url(&self) -> String {
        self.config.site.base_url()
    }

    /// Signing key path for an extension, by convention {keys_dir}/{name}.pem
    pub fn key_path(&self, name: &str) -> Utf8PathBuf {
        self.resolve(&self.config.keys_dir).join(format!("{name}.pem"))
    }

    /// Output directory, resolved against the config's directory
    pub fn output_dir(&self) -> Utf8PathBuf {
        self.resolve(&self.config.output_dir)
    }

    /// Source directory for an extension, resolved against the config's directory
    pub fn source_dir(&self, entry: &ExtensionEntry) -> Utf8PathBuf {
        self.resolve(&entry.source)
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Generate a starter crxforge.yaml
pub fn starter_config(owner: &str, repo: &str) -> String {
    format!(
        r#"---
# crxforge configuration
site:
  owner: {owner}
  repo: {repo}

# One PEM signing key per extension: {{keys_dir}}/{{name}}.pem
keys_dir: keys
output_dir: dist

extensions: []
#  - name: my-extension
#    source: ../my-extension
"#
    )
}
