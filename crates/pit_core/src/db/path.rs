//! Store location resolution.
//!
//! Precedence, evaluated on every call: explicit path, then the
//! `PIT_DATABASE_PATH` environment variable, then `data/pit.db` next to the
//! running executable.

use super::{DbError, DbResult};
use std::path::{Path, PathBuf};

/// Environment variable overriding the on-disk store location.
pub const DATABASE_PATH_ENV: &str = "PIT_DATABASE_PATH";
/// Directory (relative to the installation) holding the default store.
pub const DEFAULT_DB_DIR_NAME: &str = "data";
/// File name of the default store.
pub const DEFAULT_DB_FILE_NAME: &str = "pit.db";

/// Resolves the store path for one call.
///
/// # Errors
/// - Returns `DbError::Io` when the default location is needed and the
///   executable path cannot be determined.
pub fn resolve_db_path(explicit: Option<&Path>) -> DbResult<PathBuf> {
    let env_override = std::env::var(DATABASE_PATH_ENV).ok();
    if explicit.is_some() || non_blank(env_override.as_deref()).is_some() {
        return Ok(resolve_with(
            explicit,
            env_override.as_deref(),
            Path::new("."),
        ));
    }

    let exe = std::env::current_exe().map_err(|source| DbError::Io {
        path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        source,
    })?;
    let install_dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(resolve_with(None, None, install_dir))
}

fn resolve_with(explicit: Option<&Path>, env_override: Option<&str>, install_dir: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(raw) = non_blank(env_override) {
        return PathBuf::from(raw);
    }
    install_dir
        .join(DEFAULT_DB_DIR_NAME)
        .join(DEFAULT_DB_FILE_NAME)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}
