//! Shipyard - release-build orchestrator.
//!
//! Compile, stage, image, persist:
//! - `go build` into `save-dir/version`
//! - copy the Dockerfile and configured files/directories next to it
//! - `docker build`, then optionally `docker save` and `docker rmi`

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shipyard::config::{BuildConfig, DEFAULT_CONFIG_FILE};
use shipyard::console::Console;
use shipyard::paths::{target_os_from_env, PathResolver};

#[derive(Parser)]
#[command(name = "shipyard")]
#[command(about = "Release-build orchestrator: binary, artifact directory, container image")]
#[command(
    after_help = "QUICK START:\n  shipyard preflight    Check tools and sources\n  shipyard show plan    Print the commands a build would run\n  shipyard build        Run the pipeline"
)]
struct Cli {
    /// Configuration file (default: <dir>/docker-image-build.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source root; every relative path is resolved against it
    #[arg(short = 'C', long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Disable the build console output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline: compile, copy, build image, save, clean up
    Build {
        /// Stop after the first failed stage
        #[arg(long)]
        fail_fast: bool,

        /// Exit non-zero when any stage failed
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (tools on PATH, sources present)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show decoded configuration and derived names
    Config,
    /// Show the commands a build would run, without running them
    Plan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present; real environment variables win
    dotenvy::dotenv().ok();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.dir.join(DEFAULT_CONFIG_FILE));
    let config = BuildConfig::load(&config_path)
        .with_context(|| format!("Cannot start build: config {}", config_path.display()))?;
    let paths = PathResolver::new(&cli.dir, &config.basic, target_os_from_env());
    let console = Console::new(config.log.enable && !cli.quiet);
    init_tracing(console.is_enabled());

    match cli.command {
        Commands::Build { fail_fast, strict } => {
            let options = commands::build::BuildOptions {
                fail_fast,
                strict: strict || config.pipeline.strict_exit,
            };
            commands::cmd_build(&config, paths, console, options)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Plan => commands::show::ShowTarget::Plan,
            };
            commands::cmd_show(&config, &paths, show_target)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, &paths, strict)?;
        }
    }

    Ok(())
}

/// The console already reports stage and command failures, so tracing only
/// shows warnings unless `RUST_LOG` asks for more, and nothing when quiet.
fn init_tracing(console_enabled: bool) {
    let default = if console_enabled { "warn" } else { "off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
