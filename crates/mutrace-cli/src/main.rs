//! Mutrace CLI
//!
//! Offline inspection of incident post dumps: propagation trees, per-post
//! diffs, and replay of recorded live channel traffic.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mutrace_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "mutrace")]
#[command(about = "Mutrace - rumor mutation tracing", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Logging profile: dev or prod
    #[arg(long, global = true, default_value = "prod")]
    log: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the propagation forest of a post dump
    Tree(commands::tree::TreeArgs),
    /// Diff one post against its parent
    Diff(commands::diff::DiffArgs),
    /// Replay a snapshot and recorded channel frames through the viewer
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &config),
        Commands::Diff(args) => commands::diff::execute(args, &config),
        Commands::Replay(args) => commands::replay::execute(args, &config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
