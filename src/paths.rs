// Filesystem locations.
// Resolves per-user directories for rill's log output.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/rill on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rill").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Default log file.
pub fn log_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("rill.log"))
}
