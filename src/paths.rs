//! Path utilities for locating the variant settings document.

use std::path::{Path, PathBuf};

/// Conventional settings filename, looked up in the working directory.
pub const SETTINGS_FILENAME: &str = ".varbuild.json";

/// Default settings path: `.varbuild.json` relative to the current directory.
pub fn default_settings_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILENAME)
}

/// Resolve `path` against `base` unless it is already absolute.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use varbuild::paths::resolve_against;
///
/// let base = Path::new("/work/app");
/// assert_eq!(
///     resolve_against(base, Path::new(".varbuild.json")),
///     PathBuf::from("/work/app/.varbuild.json")
/// );
/// assert_eq!(
///     resolve_against(base, Path::new("/etc/variants.json")),
///     PathBuf::from("/etc/variants.json")
/// );
/// ```
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expands a leading `~` in a path to the user's home directory.
///
/// This handles the common case where shell tilde expansion doesn't occur,
/// such as `--settings=~/variants.json`.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    path.to_path_buf()
}
