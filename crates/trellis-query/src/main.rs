//! CLI entry point for the trellis-query traversal runner.
//!
//! Reads a JSON graph fixture from stdin, writes a JSON report to stdout.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use trellis_core::{LogConfig, TrellisConfig};
use trellis_query::fixture::{build_query, read_fixture, LoadedGraph};
use trellis_query::Element;

#[derive(Parser)]
#[command(name = "trellis-query")]
#[command(about = "Run traversal pipelines over a Trellis graph fixture")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: trellis).
    #[arg(short, long, default_value = "trellis", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a step pipeline from the named start nodes.
    Run {
        /// Start node name. Repeat for several start nodes.
        #[arg(long, required = true)]
        start: Vec<String>,
        /// Pipeline step: out:<label>, in:<label> or kind:<Kind>.
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Include the provenance path of every result.
        #[arg(long)]
        full: bool,
    },
    /// Report node and edge counts, optionally after deleting nodes.
    Stats {
        /// Node name to delete before counting. Repeatable.
        #[arg(long)]
        delete: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TrellisConfig::load(&cli.config)?;
    init_tracing(&config.log);

    let fixture = read_fixture(std::io::stdin().lock())?;
    let mut loaded = LoadedGraph::from_fixture(&fixture, config.graph)?;

    match cli.command {
        Command::Run { start, steps, full } => {
            let query = build_query(&steps)?;
            let start = start
                .iter()
                .map(|name| loaded.resolve(name).map(Element::Node))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::info!(query = %query, start = start.len(), "Executing query");

            let results = query.execute_full(loaded.graph(), start);
            let report = loaded.report(&query, &results, full);
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Stats { delete } => {
            for name in &delete {
                loaded.delete(name)?;
            }
            println!("{}", serde_json::to_string(&loaded.stats(delete.len()))?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
