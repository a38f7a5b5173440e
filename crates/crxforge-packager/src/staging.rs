//! Ephemeral staging area for package assembly
//!
//! A build never touches the extension's source tree: the source is copied
//! into `{output_dir}/{name}-temp`, the manifest is rewritten there, and the
//! signer consumes that copy. The directory is removed when the guard drops,
//! on every exit path. The fixed naming scheme means builds of the same name
//! must not run concurrently.

use camino::{Utf8Path, Utf8PathBuf};
use crxforge_core::Result;
use std::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::manifest::MANIFEST_FILENAME;

/// Working copy of an extension's source, removed on drop
#[derive(Debug)]
pub struct StagingArea {
    path: Utf8PathBuf,
}

impl StagingArea {
    /// Create the staging directory and fill it with a copy of the source.
    ///
    /// A stale directory left behind by an aborted run is removed first, so
    /// setup is idempotent and the copy always starts clean.
    pub fn create(output_dir: &Utf8Path, name: &str, source_dir: &Utf8Path) -> Result<Self> {
        let path = output_dir.join(format!("{name}-temp"));
        if path.exists() {
            warn!("Removing stale staging directory: {}", path);
            fs::remove_dir_all(&path)?;
        }

        let staging = Self { path };
        copy_tree(source_dir.as_std_path(), staging.path.as_std_path())?;
        debug!("Staged {} at {}", source_dir, staging.path);
        Ok(staging)
    }

    /// Path of the staging directory
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Path of the staged manifest
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.path.join(MANIFEST_FILENAME)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if self.path.exists() {
                warn!("Failed to remove staging directory {}: {}", self.path, e);
            }
        }
    }
}

/// Recursively copy a directory tree
fn copy_tree(source: &std::path::Path, dest: &std::path::Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walkdir entries are rooted at the source");
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
