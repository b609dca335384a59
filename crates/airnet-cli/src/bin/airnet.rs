//! Network planning from the command line.
//!
//! Usage:
//!   airnet --data-dir ./data scores UA
//!   airnet assign UA --fleet A320:12,E175:6 --json

use airnet_cli::{run, Cli};
use airnet_data::load_snapshot;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("airnet_cli=info".parse()?))
        .init();

    let snapshot = load_snapshot(&cli.data_dir)
        .with_context(|| format!("loading data from {}", cli.data_dir.display()))?;
    tracing::info!(
        markets = snapshot.report.markets,
        carriers = snapshot.report.carriers,
        "Snapshot ready"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, &snapshot, cli.json, &mut out)
}
