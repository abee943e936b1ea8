//! Diff command
//!
//! Usage: objstream diff [--before <FILE>] <AFTER> [--json]

use clap::Args;
use objstream_core::compute_changes;
use std::path::PathBuf;

use super::read_json;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// The newer snapshot
    pub after: PathBuf,

    /// The older snapshot (omit to treat AFTER as the first snapshot)
    #[arg(short, long)]
    pub before: Option<PathBuf>,

    /// Print the change set as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let before = args.before.as_deref().map(read_json).transpose()?;
    let after = read_json(&args.after)?;

    let changes = compute_changes(before.as_ref(), &after);

    if args.json {
        println!("{}", serde_json::to_string(&changes)?);
        return Ok(());
    }

    for path in &changes {
        if path.is_root() {
            println!("(root)");
        } else {
            println!("{}", path);
        }
    }
    Ok(())
}
