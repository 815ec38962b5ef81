//! Transport payload passed to each child build through its environment.
//!
//! A variant is flattened into a single query-string style value:
//!
//! ```text
//! __v=1&__name=dark-arm&theme=dark&arch=arm
//! ```
//!
//! Keys and values are percent-encoded, so any axis value survives the trip.
//! Numbers are carried as their string form; the decoder only ever sees
//! strings.

use crate::error::{Result, VarbuildError};
use crate::matrix::Variant;
use serde::Serialize;
use std::borrow::Cow;
use std::str::FromStr;

/// Environment key carrying the encoded payload.
pub const OPTIONS_ENV: &str = "__VARBUILD_BUILD_OPTIONS";

/// Environment key carrying the plain variant name.
pub const NAME_ENV: &str = "VARBUILD_BUILD_NAME";

/// Payload field holding the format version.
pub const VERSION_FIELD: &str = "__v";

/// Payload field holding the variant name.
pub const NAME_FIELD: &str = "__name";

/// Current payload format version.
pub const PAYLOAD_VERSION: u32 = 1;

/// Encode a variant and its name into a flat payload string.
pub fn encode(variant: &Variant) -> String {
    let identity = variant.identity();
    let mut pairs: Vec<(&str, Cow<'_, str>)> = Vec::with_capacity(variant.len() + 2);
    pairs.push((VERSION_FIELD, Cow::Owned(PAYLOAD_VERSION.to_string())));
    pairs.push((NAME_FIELD, Cow::Borrowed(identity.as_str())));
    for (axis, value) in variant.iter() {
        pairs.push((axis, Cow::Owned(value.as_string())));
    }
    join_pairs(pairs.iter().map(|(k, v)| (*k, v.as_ref())))
}

fn join_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|e| VarbuildError::Payload(format!("invalid percent-encoding in '{}': {}", raw, e)))
}

/// A decoded payload: the variant a child process was launched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOptions {
    /// Variant name, as shown in the orchestrator's log prefixes.
    pub name: String,
    /// Axis values in axis order, all as strings.
    #[serde(serialize_with = "serialize_pairs")]
    pub values: Vec<(String, String)>,
}

fn serialize_pairs<S>(pairs: &[(String, String)], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

impl VariantOptions {
    /// Decode a payload string.
    pub fn decode(payload: &str) -> Result<Self> {
        let mut name = None;
        let mut values = Vec::new();

        for pair in payload.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key)?;
            let value = decode_component(raw_value)?;

            match key.as_str() {
                VERSION_FIELD => {
                    let version: u32 = value.parse().map_err(|_| {
                        VarbuildError::Payload(format!("invalid payload version '{}'", value))
                    })?;
                    if version != PAYLOAD_VERSION {
                        return Err(VarbuildError::Payload(format!(
                            "unsupported payload version {} (expected {})",
                            version, PAYLOAD_VERSION
                        )));
                    }
                }
                NAME_FIELD => name = Some(value),
                _ => {
                    if values.iter().any(|(k, _)| *k == key) {
                        return Err(VarbuildError::Payload(format!(
                            "axis '{}' appears more than once",
                            key
                        )));
                    }
                    values.push((key, value));
                }
            }
        }

        let name = name.ok_or_else(|| {
            VarbuildError::Payload(format!("missing '{}' field", NAME_FIELD))
        })?;
        Ok(Self { name, values })
    }

    /// Re-encode these options into a payload string.
    pub fn encode(&self) -> String {
        let version = PAYLOAD_VERSION.to_string();
        let head = [
            (VERSION_FIELD, version.as_str()),
            (NAME_FIELD, self.name.as_str()),
        ];
        join_pairs(
            head.into_iter()
                .chain(self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        )
    }

    /// Raw string value of `axis`.
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == axis)
            .map(|(_, v)| v.as_str())
    }

    /// Parse the value of `axis` into a typed value.
    ///
    /// Returns an error when the axis is missing or the value does not parse.
    pub fn parse<T>(&self, axis: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .get(axis)
            .ok_or_else(|| VarbuildError::Payload(format!("axis '{}' is not set", axis)))?;
        raw.parse().map_err(|e: T::Err| {
            VarbuildError::Payload(format!("axis '{}' value '{}': {}", axis, raw, e))
        })
    }

    /// Axis values as an ordered JSON object.
    pub fn values_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect()
    }

    /// Axis names carried by this payload, in order.
    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }
}
