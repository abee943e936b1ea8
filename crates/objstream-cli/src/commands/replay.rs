//! Replay command
//!
//! Usage: objstream replay <EVENTS> [--schema <FILE>] [--config <FILE>] [options]
//!
//! EVENTS is a JSON Lines recording, one transport event per line:
//!
//! ```text
//! {"type":"snapshot","value":{"title":"Dra"}}
//! {"type":"error","error":{"kind":"interrupted","message":"reset"}}
//! {"type":"snapshot","value":{"title":"Draft"}}
//! {"type":"complete","value":{"title":"Draft","tags":[]}}
//! ```
//!
//! Each error event ends an attempt; the next line starts the retry.

use clap::Args;
use objstream_core::present::render_text;
use objstream_core::{
    run_with_retries, PresentOptions, ReconciliationSession, SchemaDescriptor, ScriptedTransport,
    StreamOptions, TransportEvent,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::read_json;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON Lines file of recorded transport events
    pub events: PathBuf,

    /// JSON-Schema-like description of the target object (progress denominator)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// TOML file with stream options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override max_retries
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Override debounce_delay_ms
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Disable update markers
    #[arg(long)]
    pub no_animations: bool,

    /// Hide progress
    #[arg(long)]
    pub no_progress: bool,

    /// Pause between a failure and its retry, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub backoff_ms: u64,

    /// Print the final tree as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute replay command
pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(&args)?;
    let events = read_events(&args.events)?;

    let mut session = ReconciliationSession::new(options);
    if let Some(path) = &args.schema {
        session = session.with_schema(SchemaDescriptor::from_json_schema(&read_json(path)?));
    }
    session.subscribe(|view| {
        let progress = view
            .progress
            .map(|p| format!("{:>3}%", p))
            .unwrap_or_else(|| "   -".to_string());
        let mut line = format!("#{} {:<9} {}", view.attempt, view.state.as_str(), progress);
        if let Some(err) = view.error {
            line.push_str(&format!("  {} [{}]", err, view.retry.label()));
        } else if !view.updated_paths.is_empty() {
            let paths: Vec<String> = view.updated_paths.iter().map(|p| p.to_string()).collect();
            line.push_str(&format!("  {}", paths.join(", ")));
        }
        println!("{}", line);
    });

    let transport = ScriptedTransport::from_recording(events);
    let backoff = Duration::from_millis(args.backoff_ms);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run_with_retries(&mut session, &transport, backoff));

    let tree = session.present(&PresentOptions::default());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", render_text(&tree));
    }

    outcome?;
    Ok(())
}

fn load_options(args: &ReplayArgs) -> Result<StreamOptions, Box<dyn std::error::Error>> {
    let mut options = match &args.config {
        Some(path) => StreamOptions::from_path(path)?,
        None => StreamOptions::default(),
    };
    if let Some(max_retries) = args.max_retries {
        options = options.with_max_retries(max_retries);
    }
    if let Some(ms) = args.debounce_ms {
        options = options.with_debounce(Duration::from_millis(ms));
    }
    if args.no_animations {
        options = options.with_animations(false);
    }
    if args.no_progress {
        options = options.with_show_progress(false);
    }
    options.validate()?;
    Ok(options)
}

fn read_events(path: &Path) -> Result<Vec<TransportEvent>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: TransportEvent = serde_json::from_str(line)
            .map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        events.push(event);
    }
    tracing::debug!(events = events.len(), "recording loaded");
    Ok(events)
}
