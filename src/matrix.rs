//! Variant matrix generation.
//!
//! Expands an [`AxisSet`] into the Cartesian product of its axes. The
//! expansion is a plain accumulator loop: starting from a single empty
//! variant, every axis multiplies the partial list by its value count.
//! Later axes vary fastest:
//!
//! ```text
//! theme: [light, dark], arch: [x86, arm]
//!
//!   light-x86
//!   light-arm
//!   dark-x86
//!   dark-arm
//! ```

use crate::error::{Result, VarbuildError};
use crate::settings::{AxisSet, AxisValue};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

/// Separator used to join variant values into a variant name.
pub const IDENTITY_SEPARATOR: &str = "-";

/// One concrete combination: exactly one value per axis, in axis order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Variant {
    entries: Vec<(String, AxisValue)>,
}

impl Variant {
    /// The variant of an axis set with no axes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A copy of this variant extended with one more axis.
    fn extended(&self, axis: &str, value: &AxisValue) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push((axis.to_string(), value.clone()));
        Self { entries }
    }

    /// Value chosen for `axis`.
    pub fn get(&self, axis: &str) -> Option<&AxisValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| value)
    }

    /// `(axis, value)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable variant name: values joined with `-` in axis order.
    pub fn identity(&self) -> String {
        self.entries
            .iter()
            .map(|(_, v)| v.as_string())
            .collect::<Vec<_>>()
            .join(IDENTITY_SEPARATOR)
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Expand `axes` into every combination of their values.
///
/// Zero axes yield one empty variant; an axis with no values yields no
/// variants at all.
pub fn expand(axes: &AxisSet) -> Vec<Variant> {
    let mut partials = vec![Variant::empty()];

    for axis in axes.iter() {
        let mut next = Vec::with_capacity(partials.len() * axis.values.len());
        for partial in &partials {
            for value in &axis.values {
                next.push(partial.extended(&axis.name, value));
            }
        }
        partials = next;
    }

    partials
}

/// Number of variants [`expand`] would produce, without building them.
pub fn variant_count(axes: &AxisSet) -> usize {
    axes.iter().map(|a| a.values.len()).product()
}

/// Fail if two variants would be launched under the same name.
pub fn ensure_unique_identities(variants: &[Variant]) -> Result<()> {
    let mut seen = HashSet::with_capacity(variants.len());
    for variant in variants {
        let identity = variant.identity();
        if !seen.insert(identity.clone()) {
            return Err(VarbuildError::AmbiguousIdentity { identity });
        }
    }
    Ok(())
}
