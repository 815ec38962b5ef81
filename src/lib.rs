//! varbuild - parallel builds over a configuration matrix.
//!
//! A settings document declares named axes, each with a list of values.
//! `varbuild run` expands them into every combination and launches the build
//! command once per combination. Each child learns its variant from the
//! environment and reads it back with [`resolve::from_env`].

pub mod batch;
pub mod cli;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod output;
pub mod paths;
pub mod payload;
pub mod resolve;
pub mod settings;
pub mod theme;
pub mod version;
