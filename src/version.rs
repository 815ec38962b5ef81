//! Version information for the varbuild binary.
//!
//! Release builds may set `VARBUILD_GIT_REV` at compile time to stamp the git
//! revision into `--version`.

use crate::payload::PAYLOAD_VERSION;
use std::sync::LazyLock;

/// The package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git revision set at build time (empty string if not set).
pub const GIT_REV: &str = match option_env!("VARBUILD_GIT_REV") {
    Some(rev) => rev,
    None => "",
};

static FULL_VERSION: LazyLock<String> = LazyLock::new(|| {
    if GIT_REV.is_empty() {
        PKG_VERSION.to_string()
    } else {
        format!("{} ({})", PKG_VERSION, GIT_REV)
    }
});

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}\nvariant payload format {}",
        FULL_VERSION.as_str(),
        PAYLOAD_VERSION
    )
});

/// Returns the full version string for display.
///
/// If built with a git revision, returns `"X.Y.Z (abcdef0)"`.
/// Otherwise, returns just `"X.Y.Z"`.
///
/// # Examples
///
/// ```
/// use varbuild::version::full_version;
///
/// let version = full_version();
/// assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
/// ```
pub fn full_version() -> &'static str {
    FULL_VERSION.as_str()
}

/// Version string for `--version`, including the payload format children can expect.
pub fn long_version() -> &'static str {
    LONG_VERSION.as_str()
}
