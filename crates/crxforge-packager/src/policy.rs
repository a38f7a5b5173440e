//! Batch-level projections: distribution policy and release manifest
//!
//! Both documents are pure projections of the successful build results.
//! The policy is a macOS managed-preferences plist force-installing each
//! extension from its feed; the release manifest is the human-readable
//! table published alongside the artifacts.

use camino::{Utf8Path, Utf8PathBuf};
use crxforge_core::{BuildResult, Result};
use std::fs;
use tracing::info;

use crate::feed::FEED_FILENAME;

/// Policy file name inside the output directory
pub const POLICY_FILENAME: &str = "com.google.Chrome.plist";

/// Release manifest file name inside the output directory
pub const RELEASE_FILENAME: &str = "README.md";

/// Managed-preferences policy binding identifiers to trusted feeds
#[derive(Debug)]
pub struct DistributionPolicy<'a> {
    base_url: &'a str,
    results: &'a [BuildResult],
}

impl<'a> DistributionPolicy<'a> {
    /// Build a policy over the given results
    pub fn new(base_url: &'a str, results: &'a [BuildResult]) -> Self {
        Self { base_url, results }
    }

    /// One `identifier;feed-url` entry per extension
    pub fn entries(&self) -> Vec<String> {
        self.results
            .iter()
            .map(|r| {
                format!(
                    "{};{}/{}/{}",
                    r.id, self.base_url, r.name, FEED_FILENAME
                )
            })
            .collect()
    }

    /// Render the plist document
    pub fn render(&self) -> String {
        let forcelist = self
            .entries()
            .iter()
            .map(|entry| format!("        <string>{entry}</string>"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>ExtensionInstallForcelist</key>
    <array>
{forcelist}
    </array>
    <key>ExtensionInstallSources</key>
    <array>
        <string>{base_url}/*</string>
    </array>
</dict>
</plist>
"#,
            base_url = self.base_url,
        )
    }

    /// Write the policy into the output directory
    pub fn write(&self, output_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = output_dir.join(POLICY_FILENAME);
        fs::write(&path, self.render())?;
        info!("Wrote distribution policy: {}", path);
        Ok(path)
    }
}

/// Human-readable table of what the batch produced
#[derive(Debug)]
pub struct ReleaseManifest<'a> {
    results: &'a [BuildResult],
}

impl<'a> ReleaseManifest<'a> {
    /// Build a release manifest over the given results
    pub fn new(results: &'a [BuildResult]) -> Self {
        Self { results }
    }

    /// Render the markdown document
    pub fn render(&self) -> String {
        let rows = self
            .results
            .iter()
            .map(|r| format!("| {} | `{}` | {} |", r.name, r.id, r.version))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# Self-hosted Chrome extensions

Signed extension packages with a force-install policy.

## Extensions

| Extension | ID | Version |
|-----------|-----|---------|
{rows}

## Installation

1. Enable GitHub Pages for this repository (Settings -> Pages -> Source: main branch)
2. Copy `{POLICY_FILENAME}` to `/Library/Managed Preferences/`
3. Restart Chrome

```bash
sudo cp {POLICY_FILENAME} "/Library/Managed Preferences/"
sudo chmod 644 "/Library/Managed Preferences/{POLICY_FILENAME}"
```
"#
        )
    }

    /// Write the release manifest into the output directory
    pub fn write(&self, output_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = output_dir.join(RELEASE_FILENAME);
        fs::write(&path, self.render())?;
        info!("Wrote release manifest: {}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crxforge_core::ExtensionId;
    use semver::Version;

    fn results() -> Vec<BuildResult> {
        vec![
            BuildResult {
                name: "blocktube".to_string(),
                id: ExtensionId::new("abcdefghijklmnopabcdefghijklmnop").unwrap(),
                version: Version::new(1, 2, 3),
            },
            BuildResult {
                name: "stayfocusd".to_string(),
                id: ExtensionId::new("ppppppppppppppppaaaaaaaaaaaaaaaa").unwrap(),
                version: Version::new(2, 0, 0),
            },
        ]
    }

    #[test]
    fn test_policy_has_one_entry_per_extension() {
        let results = results();
        let policy = DistributionPolicy::new("https://user.github.io/repo", &results);

        let entries = policy.entries();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            let (id, url) = entry.split_once(';').expect("entry should be id;url");
            assert_eq!(id.len(), 32);
            assert!(url.starts_with("https://user.github.io/repo/"));
            assert!(url.ends_with("/update.xml"));
        }
    }

    #[test]
    fn test_policy_plist_contents() {
        let results = results();
        let policy = DistributionPolicy::new("https://user.github.io/repo", &results);
        let plist = policy.render();

        assert!(plist.contains("<key>ExtensionInstallForcelist</key>"));
        assert!(plist.contains(
            "<string>abcdefghijklmnopabcdefghijklmnop;https://user.github.io/repo/blocktube/update.xml</string>"
        ));
        assert!(plist.contains("<string>https://user.github.io/repo/*</string>"));
    }

    #[test]
    fn test_release_manifest_table() {
        let results = results();
        let manifest = ReleaseManifest::new(&results);
        let markdown = manifest.render();

        assert!(markdown.contains("| blocktube | `abcdefghijklmnopabcdefghijklmnop` | 1.2.3 |"));
        assert!(markdown.contains("| stayfocusd | `ppppppppppppppppaaaaaaaaaaaaaaaa` | 2.0.0 |"));
        assert!(markdown.contains(POLICY_FILENAME));
    }

    #[test]
    fn test_write_projections() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let out = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();

        let results = results();
        DistributionPolicy::new("https://user.github.io/repo", &results)
            .write(&out)
            .unwrap();
        ReleaseManifest::new(&results).write(&out).unwrap();

        assert!(out.join(POLICY_FILENAME).exists());
        assert!(out.join(RELEASE_FILENAME).exists());
    }
}
