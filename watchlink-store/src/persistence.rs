//! On-disk locations and JSON document I/O.
//!
//! Documents are staged in a sibling temp file, locked down to the owner
//! on Unix, then renamed over the target, so readers only ever see a
//! complete file.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::StoreError;

/// Directory name used under the platform config and cache roots.
const APP_DIR: &str = "watchlink";

// ============================================================================
// Default Paths
// ============================================================================

fn app_dir(root: Option<PathBuf>) -> PathBuf {
    root.map_or_else(|| PathBuf::from("."), |root| root.join(APP_DIR))
}

/// Per-user configuration directory, e.g. `~/.config/watchlink` on Linux.
///
/// Falls back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    app_dir(dirs::config_dir())
}

/// Per-user cache directory, e.g. `~/.cache/watchlink` on Linux or
/// `~/Library/Caches/watchlink` on macOS.
pub fn default_cache_dir() -> PathBuf {
    app_dir(dirs::cache_dir())
}

/// `{config}/settings.yaml`
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.yaml")
}

/// `{cache}/agent_links.json`
pub fn default_cache_path() -> PathBuf {
    default_cache_dir().join("agent_links.json")
}

/// `{cache}/screenshots`
pub fn default_screenshot_dir() -> PathBuf {
    default_cache_dir().join("screenshots")
}

// ============================================================================
// JSON Documents
// ============================================================================

/// Writes `data` as pretty JSON to `path`, creating parent directories.
///
/// The temp file carries the process id so two processes flushing the
/// same document never share a staging file.
#[instrument(skip(data), fields(path = %path.display()))]
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = staging_path(path);
    tokio::fs::write(&staging, &json).await?;
    owner_only(&staging).await?;

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }

    debug!(bytes = json.len(), "Saved JSON document");
    Ok(())
}

/// Reads and parses the JSON document at `path`.
///
/// A missing file surfaces as a [`StoreError::Io`] for which
/// [`StoreError::is_not_found`] is true.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(unix)]
async fn owner_only(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn owner_only(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(default_settings_path().ends_with("watchlink/settings.yaml"));
        assert!(default_cache_path().ends_with("watchlink/agent_links.json"));
        assert!(default_screenshot_dir().ends_with("watchlink/screenshots"));
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let staging = staging_path(Path::new("/var/cache/watchlink/agent_links.json"));
        assert_eq!(staging.parent(), Some(Path::new("/var/cache/watchlink")));
        assert!(
            staging
                .to_string_lossy()
                .ends_with(&format!("agent_links.json.{}.tmp", std::process::id()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent_links.json");

        save_json(&path, &serde_json::json!({"movies": {}})).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
