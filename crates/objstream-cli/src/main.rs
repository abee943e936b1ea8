//! ObjStream CLI
//!
//! Command-line interface for replaying recorded object streams

use clap::{Parser, Subcommand};
use objstream_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "objstream")]
#[command(about = "ObjStream - Incremental structured-object reconciliation", long_about = None)]
struct Cli {
    /// Log engine events to stderr (human-readable)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log engine events to stderr as JSON
    #[arg(long, global = true, conflicts_with = "verbose")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a recorded event stream through a session and print the tree
    Replay(commands::replay::ReplayArgs),
    /// Print the change set between two JSON snapshots
    Diff(commands::diff::DiffArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging_facility::init(Profile::Development);
    } else if cli.log_json {
        logging_facility::init(Profile::Production);
    }

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
