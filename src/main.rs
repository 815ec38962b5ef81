//! varbuild - parallel builds over a configuration matrix

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use varbuild::batch::{self, BatchOutcome, BuildCommand, ChildState, Supervisor, SupervisorConfig};
use varbuild::cli::{Cli, Commands, ListArgs, RunArgs, ShowArgs};
use varbuild::logging::{self, LogConfig};
use varbuild::output::{self, TableOptions};
use varbuild::theme::{self, Themed};
use varbuild::{matrix, paths, resolve, settings};

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag - affects owo_colors, comfy_table and log output
    if cli.no_color {
        theme::disable_colors();
    }

    logging::init(LogConfig::from_verbosity(cli.verbose, cli.quiet).with_env_overrides());

    let result = match &cli.command {
        Commands::Run(args) => cmd_run(&cli, args),
        Commands::List(args) => cmd_list(&cli, args),
        Commands::Show(args) => cmd_show(&cli, args),
        Commands::Completions(args) => {
            args.generate();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!(
            "{}: {}",
            "error"
                .if_supports_color(Stderr, |text| text.red())
                .if_supports_color(Stderr, |text| text.bold()),
            e
        );
        // Print the error chain if there are causes
        for cause in e.chain().skip(1) {
            eprintln!(
                "  {}: {}",
                "caused by".if_supports_color(Stderr, |text| text.yellow()),
                cause
            );
        }
        std::process::exit(1);
    }
}

/// Settings path from `--settings`, with `~` expanded and made absolute.
fn settings_path(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    Ok(paths::resolve_against(&cwd, &paths::expand_tilde(&cli.settings)))
}

fn load_axes(cli: &Cli) -> Result<settings::AxisSet> {
    let path = settings_path(cli)?;
    let axes = settings::load(&path)?;
    tracing::info!(
        path = %path.display(),
        axes = axes.len(),
        variants = matrix::variant_count(&axes),
        "Loaded variant settings"
    );
    Ok(axes)
}

/// Build every variant; exits with status 1 if any build fails or the run is interrupted.
fn cmd_run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let axes = load_axes(cli)?;
    let command = BuildCommand::new(args.program.clone(), args.args.clone());
    let specs = batch::prepare(&axes, &command, !args.no_pad)?;

    let supervisor = Supervisor::new(SupervisorConfig {
        kill_grace: args.kill_grace(),
        ..SupervisorConfig::default()
    });

    // Children run in their own process groups, so Ctrl+C only reaches us.
    let shutdown_flag = supervisor.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping all builds...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to install the Ctrl+C handler")?;

    tracing::info!(
        variants = specs.len(),
        command = %command.display(),
        "Starting parallel build"
    );
    let outcome = supervisor.run(&specs);
    report(&outcome);

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the batch summary, plus one line per failed or killed build.
fn report(outcome: &BatchOutcome) {
    if outcome.is_success() {
        eprintln!("{}", outcome.summary().success());
        return;
    }

    eprintln!("{}", outcome.summary().error_style());
    for child in outcome.children() {
        match &child.state {
            ChildState::Succeeded => {}
            ChildState::Killed(..) => {
                eprintln!("  {}: {}", child.name, child.state.to_string().warning())
            }
            ChildState::Failed(_) | ChildState::SpawnFailed(_) => {
                eprintln!("  {}: {}", child.name, child.state.to_string().error_style())
            }
        }
    }
}

fn cmd_list(cli: &Cli, args: &ListArgs) -> Result<()> {
    let axes = load_axes(cli)?;
    axes.validate()?;
    let variants = matrix::expand(&axes);
    output::print_variants(
        &axes,
        &variants,
        args.format.into(),
        TableOptions { ascii: args.ascii },
    );
    Ok(())
}

fn cmd_show(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let path = settings_path(cli)?;
    let resolved = resolve::from_env(&path).context("Failed to resolve the variant to build")?;
    tracing::debug!(targets = resolved.target_count(), "Resolved build targets");
    output::print_resolved(&resolved, args.format.into());
    Ok(())
}
