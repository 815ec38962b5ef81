//! Consumer side of the variant payload.
//!
//! A build configuration calls [`from_env`] to learn what it should build:
//! when launched by `varbuild run` it gets exactly one variant back; when run
//! directly it gets the whole matrix and is expected to configure one target
//! per variant.

use crate::error::Result;
use crate::matrix::{self, Variant};
use crate::payload::{OPTIONS_ENV, VariantOptions};
use crate::settings;
use std::path::Path;

/// What a build configuration should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Launched by the orchestrator: build only this variant.
    Single(VariantOptions),
    /// No orchestrator present: build every variant.
    All(Vec<Variant>),
}

impl Resolved {
    /// Number of build targets the consumer should configure.
    pub fn target_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::All(variants) => variants.len(),
        }
    }
}

/// Resolve using an arbitrary environment lookup.
///
/// Settings are only read when no payload is present.
pub fn resolve<F>(lookup: F, settings_path: &Path) -> Result<Resolved>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(payload) = lookup(OPTIONS_ENV) {
        let options = VariantOptions::decode(&payload)?;
        tracing::debug!(variant = %options.name, "Resolved variant from payload");
        return Ok(Resolved::Single(options));
    }

    let axes = settings::load(settings_path)?;
    let variants = matrix::expand(&axes);
    tracing::debug!(variants = variants.len(), "No payload present, resolved full matrix");
    Ok(Resolved::All(variants))
}

/// Resolve using the process environment.
pub fn from_env(settings_path: &Path) -> Result<Resolved> {
    resolve(|key| std::env::var(key).ok(), settings_path)
}
