//! Per-session Chrome profile directories
//!
//! Every rendering session runs its own Chrome process, so each one needs a
//! private `--user-data-dir`. Two Chromes pointed at the same profile fight
//! over `SingletonLock` and the second one exits immediately.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const PROFILE_PREFIX: &str = "entel_scrape_chrome";

/// RAII wrapper for a Chrome profile directory
///
/// Removes the directory on drop unless ownership was handed off with
/// [`BrowserProfile::into_path`].
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the directory to another owner (the session wrapper), disabling
    /// cleanup here.
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            debug!("Removing unused profile directory {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to remove profile directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Create a fresh, uniquely named profile directory under the temp dir.
pub fn create_unique_profile() -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));

    // create_dir, not create_dir_all: an existing directory means a collision
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory: {}", path.display());
    Ok(BrowserProfile {
        path,
        cleanup_on_drop: true,
    })
}
