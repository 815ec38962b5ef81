//! Error types for varbuild.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for varbuild.
#[derive(Error, Debug)]
pub enum VarbuildError {
    #[error("Cannot read variant settings at {}: {source}", path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Variant settings at {} are not valid JSON: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid variant settings: {0}")]
    InvalidSettings(String),

    #[error("Axis '{0}' declares no values, so no variant would be built")]
    EmptyAxis(String),

    #[error("Axis name '{0}' is reserved (names starting with '__' carry transport fields)")]
    ReservedAxisName(String),

    #[error("Axis '{axis}' lists the value '{value}' more than once")]
    DuplicateAxisValue { axis: String, value: String },

    #[error(
        "Two variants share the name '{identity}' once their values are joined with the '-' separator"
    )]
    AmbiguousIdentity { identity: String },

    #[error("Malformed variant payload: {0}")]
    Payload(String),

    #[error("Failed to launch build for '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for varbuild operations.
pub type Result<T> = std::result::Result<T, VarbuildError>;
