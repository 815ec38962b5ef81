//! Variant settings: the declared axes and their candidate values.
//!
//! The settings document is a JSON object mapping each axis name to an
//! ordered array of scalar values:
//!
//! ```json
//! {
//!   "theme": ["light", "dark"],
//!   "arch": ["x86", "arm"],
//!   "level": [1, 2]
//! }
//! ```
//!
//! Key order in the document is significant: it fixes the order of axes in
//! every variant, and therefore the variant order and the variant names.

use crate::error::{Result, VarbuildError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Prefix reserved for transport fields inside the variant payload.
pub const RESERVED_PREFIX: &str = "__";

/// A single candidate value for an axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Text(String),
    Number(serde_json::Number),
}

impl AxisValue {
    /// The string form that crosses the process boundary.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AxisValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AxisValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for AxisValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// One named configuration dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<AxisValue>,
}

/// The full, ordered set of axes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSet {
    axes: Vec<Axis>,
}

impl AxisSet {
    /// Create an empty axis set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis, replacing the values of an existing axis with the same name.
    pub fn with_axis<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AxisValue>,
    {
        let name = name.into();
        let values: Vec<AxisValue> = values.into_iter().map(Into::into).collect();
        match self.axes.iter_mut().find(|a| a.name == name) {
            Some(axis) => axis.values = values,
            None => self.axes.push(Axis { name, values }),
        }
        self
    }

    /// Build an axis set from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(VarbuildError::InvalidSettings(format!(
                "top level must be an object of axis name to value list, found {}",
                json_kind(&value)
            )));
        };

        let mut axes = Vec::with_capacity(map.len());
        for (name, raw) in map {
            let Value::Array(items) = raw else {
                return Err(VarbuildError::InvalidSettings(format!(
                    "axis '{}' must be an array of values, found {}",
                    name,
                    json_kind(&raw)
                )));
            };

            let mut values = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let value = match item {
                    Value::String(s) => AxisValue::Text(s),
                    Value::Number(n) => AxisValue::Number(n),
                    other => {
                        return Err(VarbuildError::InvalidSettings(format!(
                            "axis '{}' value #{} must be a string or number, found {}",
                            name,
                            i,
                            json_kind(&other)
                        )));
                    }
                };
                values.push(value);
            }
            axes.push(Axis { name, values });
        }

        Ok(Self { axes })
    }

    /// Iterate axes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        self.axes.iter()
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// True when no axis is declared.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Look up an axis by name.
    pub fn get(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Reject axis sets that cannot be launched.
    ///
    /// Axis names may not use the reserved transport prefix, every axis must
    /// have at least one value, and no axis may repeat a value. Values are
    /// compared in their string form, so `1` and `"1"` are the same value.
    pub fn validate(&self) -> Result<()> {
        for axis in &self.axes {
            if axis.name.starts_with(RESERVED_PREFIX) {
                return Err(VarbuildError::ReservedAxisName(axis.name.clone()));
            }
            if axis.values.is_empty() {
                return Err(VarbuildError::EmptyAxis(axis.name.clone()));
            }

            let mut seen = HashSet::with_capacity(axis.values.len());
            for value in &axis.values {
                let value = value.as_string();
                if !seen.insert(value.clone()) {
                    return Err(VarbuildError::DuplicateAxisValue {
                        axis: axis.name.clone(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load and parse the settings document at `path`.
pub fn load(path: &Path) -> Result<AxisSet> {
    let raw = std::fs::read_to_string(path).map_err(|source| VarbuildError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| VarbuildError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })?;
    let axes = AxisSet::from_value(value)?;

    tracing::debug!(
        path = %path.display(),
        axes = axes.len(),
        "Loaded variant settings"
    );
    Ok(axes)
}
