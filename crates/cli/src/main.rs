//! qgate replay tool entry point.
//!
//! Replays a JSON-lines query log through the configured admission policy and
//! prints one decision per query. Logging goes to stderr so the report on
//! stdout stays machine-readable.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qgate_core::{PolicyConfig, policy_from_config};
use tracing_subscriber::EnvFilter;

mod replay;

use replay::{Format, Replayer};

#[derive(Debug, Parser)]
#[command(name = "qgate", version, about = "Replay a query log through the adaptive cache-admission policy")]
struct Args {
    /// TOML configuration file. Defaults to QGATE_CONFIG_FILE when unset.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit one JSON record per query instead of text.
    #[arg(long)]
    json: bool,

    /// Query log with one JSON query per line. Reads stdin when omitted.
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();

    let config = PolicyConfig::load(args.config.as_deref()).context("failed to load policy configuration")?;
    tracing::info!(
        history_size = config.history_size,
        adaptive = config.adaptive,
        max_depth = config.max_depth,
        "starting query log replay"
    );

    let reader: Box<dyn BufRead> = match &args.log {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open query log {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let format = if args.json { Format::Json } else { Format::Text };

    let policy = policy_from_config(&config);
    let replayer = Replayer::new(&policy, config.max_depth);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = replayer.run(reader, &mut out, format)?;
    replay::write_summary(&mut out, &summary, format)?;
    out.flush()?;

    Ok(())
}
