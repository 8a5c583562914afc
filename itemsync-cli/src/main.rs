//! itemsync: plan and track remote item definitions from YAML manifests.
//!
//! # Usage
//!
//! ```text
//! itemsync formats [KIND]
//! itemsync validate <manifest.yaml>
//! itemsync compile <manifest.yaml> [--json]
//! itemsync plan <manifest.yaml> [--json]
//! itemsync state list [--json]
//! itemsync state show <workspaceID/itemID>
//! itemsync state forget <workspaceID/itemID>
//! ```
//!
//! Log verbosity follows `ITEMSYNC_LOG` (an `EnvFilter` directive).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    compile::CompileArgs, formats::FormatsArgs, plan::PlanArgs, state::StateCommand,
    validate::ValidateArgs, Env,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "itemsync",
    version,
    about = "Plan and track remote item definitions from YAML manifests",
    long_about = None,
)]
struct Cli {
    /// Allow item kinds that are still in preview.
    #[arg(long, global = true)]
    preview: bool,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List item kinds and their definition formats.
    Formats(FormatsArgs),

    /// Check manifests against their kind's rules.
    Validate(ValidateArgs),

    /// Compile definition parts and show their fingerprints.
    Compile(CompileArgs),

    /// Show what applying manifests would change.
    Plan(PlanArgs),

    /// Inspect recorded item state.
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("ITEMSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr);
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Formats(args) => args.run(),
        Commands::Validate(args) => args.run(&Env::load(cli.preview)?),
        Commands::Compile(args) => args.run(),
        Commands::Plan(args) => args.run(&Env::load(cli.preview)?),
        Commands::State { command } => commands::state::run(command, &Env::load(cli.preview)?),
    }
}
