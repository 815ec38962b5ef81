//! Command-line interface definitions using clap.

use crate::output::OutputFormat;
use crate::paths;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Run a build command once per variant of a configuration matrix, in parallel.
#[derive(Parser, Debug)]
#[command(name = "varbuild")]
#[command(author, version = crate::version::long_version(), about, long_about = None)]
pub struct Cli {
    /// Path to the variant settings document.
    #[arg(
        long,
        global = true,
        env = "VARBUILD_SETTINGS",
        default_value_os_t = paths::default_settings_path()
    )]
    pub settings: PathBuf,

    /// Enable verbose output (-v for info, -vv for debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every variant in parallel, stopping all builds on the first failure.
    Run(RunArgs),

    /// List the variants the settings expand to.
    List(ListArgs),

    /// Show the variant configuration a build would see in this environment.
    Show(ShowArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the run command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Build program started once per variant.
    #[arg(long, env = "VARBUILD_PROGRAM", default_value = "webpack")]
    pub program: String,

    /// Do not pad output prefixes to a common width.
    #[arg(long)]
    pub no_pad: bool,

    /// Seconds stopped builds get before they are killed.
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub kill_grace: u64,

    /// Arguments passed verbatim to every build.
    ///
    /// Everything from the first argument varbuild does not recognise is
    /// forwarded. Put `--` first to forward flags varbuild would otherwise
    /// read itself, such as `-v`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl RunArgs {
    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace)
    }
}

/// Arguments for the list command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Table)]
    pub format: OutputFormatArg,

    /// Use ASCII table borders instead of Unicode.
    #[arg(long)]
    pub ascii: bool,
}

/// Arguments for the show command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ShowFormatArg::Plain)]
    pub format: ShowFormatArg,
}

/// Arguments for shell completions.
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate and print completions to stdout.
    pub fn generate(&self) {
        clap_complete::generate(
            self.shell,
            &mut Cli::command(),
            "varbuild",
            &mut std::io::stdout(),
        );
    }
}

/// Output format argument.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Colored table output.
    #[default]
    Table,
    /// JSON output.
    Json,
    /// Plain text output (no colors).
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

/// Output format for `show`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShowFormatArg {
    /// One `key=value` line per axis.
    #[default]
    Plain,
    /// JSON output.
    Json,
}

impl From<ShowFormatArg> for OutputFormat {
    fn from(arg: ShowFormatArg) -> Self {
        match arg {
            ShowFormatArg::Plain => OutputFormat::Plain,
            ShowFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let args = Cli::try_parse_from(["varbuild", "run"]).unwrap();
        match args.command {
            Commands::Run(run) => {
                assert!(!run.no_pad);
                assert_eq!(run.kill_grace(), Duration::from_secs(5));
                assert!(run.args.is_empty());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_forwards_trailing_args_verbatim() {
        let args = Cli::try_parse_from([
            "varbuild",
            "run",
            "--program",
            "npx",
            "--",
            "webpack",
            "--mode",
            "production",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.verbose, 0);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.program, "npx");
                assert_eq!(run.args, vec!["webpack", "--mode", "production", "-v"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_forwards_unknown_flags_without_separator() {
        let args = Cli::try_parse_from(["varbuild", "run", "--mode", "production", "-v"]).unwrap();
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.program, "webpack");
                assert_eq!(run.args, vec!["--mode", "production", "-v"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_options_before_forwarded_args() {
        let args = Cli::try_parse_from([
            "varbuild",
            "run",
            "--kill-grace",
            "1",
            "--program",
            "sh",
            "-c",
            "exit 0",
        ])
        .unwrap();
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.kill_grace, 1);
                assert_eq!(run.program, "sh");
                assert_eq!(run.args, vec!["-c", "exit 0"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_options() {
        let args =
            Cli::try_parse_from(["varbuild", "run", "--no-pad", "--kill-grace", "1"]).unwrap();
        match args.command {
            Commands::Run(run) => {
                assert!(run.no_pad);
                assert_eq!(run.kill_grace(), Duration::from_secs(1));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_list_command() {
        let args = Cli::try_parse_from(["varbuild", "list", "--format", "json"]).unwrap();
        match args.command {
            Commands::List(list) => {
                assert_eq!(list.format, OutputFormatArg::Json);
                assert!(!list.ascii);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_show_command() {
        let args = Cli::try_parse_from(["varbuild", "show"]).unwrap();
        match args.command {
            Commands::Show(show) => assert_eq!(show.format, ShowFormatArg::Plain),
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_show_rejects_table() {
        assert!(Cli::try_parse_from(["varbuild", "show", "--format", "table"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Cli::try_parse_from([
            "varbuild",
            "list",
            "-vv",
            "--no-color",
            "--settings",
            "/tmp/variants.json",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.no_color);
        assert_eq!(args.settings, PathBuf::from("/tmp/variants.json"));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["varbuild", "-v", "-q", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_completions_command() {
        let args = Cli::try_parse_from(["varbuild", "completions", "bash"]).unwrap();
        match args.command {
            Commands::Completions(c) => assert_eq!(c.shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }
}
