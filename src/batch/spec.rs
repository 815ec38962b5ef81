//! Launch descriptions for child builds.

use crate::matrix::Variant;
use crate::payload::{self, NAME_ENV, OPTIONS_ENV};
use std::process::{Command, Stdio};

/// The build command every child runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Program to execute (looked up on `PATH`).
    pub program: String,
    /// Arguments forwarded verbatim to every child.
    pub args: Vec<String>,
}

impl BuildCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Command line as shown in logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How to launch the child for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSpec {
    /// Position in launch order.
    pub index: usize,
    /// Variant name (unpadded).
    pub name: String,
    /// Name used for output prefixes, padded to the batch's widest name.
    pub display_name: String,
    pub command: BuildCommand,
    /// Environment entries added on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl ChildSpec {
    /// Create the `std::process::Command` for this child.
    ///
    /// Stdout and stderr are piped so the supervisor can prefix them; stdin
    /// is closed. On Unix the child leads its own process group so that
    /// termination also reaches processes the build tool starts.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args);
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        cmd
    }
}

/// Build one spec per variant, in variant order.
///
/// With `pad`, display names are right-padded so every prefix has the same width.
pub fn build_specs(variants: &[Variant], command: &BuildCommand, pad: bool) -> Vec<ChildSpec> {
    let names: Vec<String> = variants.iter().map(Variant::identity).collect();
    let width = if pad {
        names.iter().map(|n| n.chars().count()).max().unwrap_or(0)
    } else {
        0
    };

    variants
        .iter()
        .zip(names)
        .enumerate()
        .map(|(index, (variant, name))| ChildSpec {
            index,
            display_name: format!("{:<width$}", name, width = width),
            command: command.clone(),
            env: vec![
                (OPTIONS_ENV.to_string(), payload::encode(variant)),
                (NAME_ENV.to_string(), name.clone()),
            ],
            name,
        })
        .collect()
}
