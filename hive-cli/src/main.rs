//! Hive CLI - command-line interface
//!
//! Commands:
//! - perft: Count action-tree leaves to a given depth
//! - selfplay: Play random games and check engine invariants
//! - show: Print a saved position and its legal actions

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hive_cli::perft::{self, PerftArgs};
use hive_cli::selfplay::{self, SelfPlayArgs};
use hive_cli::show::{self, ShowArgs};

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive rules engine verification tools")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes of the action tree
    Perft(PerftArgs),
    /// Play random games and check invariants after every action
    #[command(name = "selfplay")]
    SelfPlay(SelfPlayArgs),
    /// Render a saved snapshot and list its legal actions
    Show(ShowArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Perft(args) => perft::run(args),
        Commands::SelfPlay(args) => selfplay::run(args, cli.seed),
        Commands::Show(args) => show::run(args),
    }
}
