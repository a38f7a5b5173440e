//! Update feed generation
//!
//! Chrome polls a small `gupdate` XML document to discover new versions.
//! The schema is fixed (protocol 2.0, one `app` with an `updatecheck`
//! carrying `codebase` and `version`); generation is pure field
//! substitution, with input validation pushed into the argument types.

use camino::{Utf8Path, Utf8PathBuf};
use crxforge_core::{ExtensionId, Result};
use semver::Version;
use std::fs;
use tracing::debug;

/// Feed file name inside an extension's output directory
pub const FEED_FILENAME: &str = "update.xml";

/// Render the update feed document
pub fn update_feed(id: &ExtensionId, version: &Version, codebase: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?>\n\
         <gupdate xmlns='http://www.google.com/update2/response' protocol='2.0'>\n\
         \x20 <app appid='{id}'>\n\
         \x20   <updatecheck codebase='{codebase}' version='{version}' />\n\
         \x20 </app>\n\
         </gupdate>"
    )
}

/// Write an extension's update feed next to its package.
///
/// `package_extension` names the package file the feed points at
/// (`{base_url}/{name}/{name}.{package_extension}`).
pub fn write_feed(
    output_dir: &Utf8Path,
    name: &str,
    id: &ExtensionId,
    version: &Version,
    base_url: &str,
    package_extension: &str,
) -> Result<Utf8PathBuf> {
    let codebase = format!("{base_url}/{name}/{name}.{package_extension}");
    let document = update_feed(id, version, &codebase);

    let feed_path = output_dir.join(name).join(FEED_FILENAME);
    if let Some(parent) = feed_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&feed_path, document)?;
    debug!("Wrote update feed: {}", feed_path);
    Ok(feed_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_id() -> ExtensionId {
        ExtensionId::new("abcdefghijklmnopabcdefghijklmnop").unwrap()
    }

    #[test]
    fn test_feed_binds_id_version_and_codebase() {
        let id = test_id();
        let version = Version::new(1, 2, 3);
        let feed = update_feed(
            &id,
            &version,
            "https://user.github.io/repo/widget/widget.crx",
        );

        assert!(feed.starts_with("<?xml version='1.0' encoding='UTF-8'?>"));
        assert!(feed.contains("protocol='2.0'"));
        assert!(feed.contains("appid='abcdefghijklmnopabcdefghijklmnop'"));
        assert!(feed.contains("codebase='https://user.github.io/repo/widget/widget.crx'"));
        assert!(feed.contains("version='1.2.3'"));
    }

    #[test]
    fn test_feed_is_deterministic() {
        let id = test_id();
        let version = Version::new(0, 9, 0);
        let a = update_feed(&id, &version, "https://example.com/w/w.crx");
        let b = update_feed(&id, &version, "https://example.com/w/w.crx");
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_feed_creates_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let out = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();

        let path = write_feed(
            &out,
            "widget",
            &test_id(),
            &Version::new(1, 2, 3),
            "https://user.github.io/repo",
            "crx",
        )
        .unwrap();

        assert_eq!(path, out.join("widget").join(FEED_FILENAME));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("codebase='https://user.github.io/repo/widget/widget.crx'"));
    }
}
