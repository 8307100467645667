use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dtn_broker::build_resource_manager;
use dtn_broker::domain::broker::BrokerHandle;
use dtn_broker::logger;

#[derive(Parser)]
#[command(name = "dtn_broker", version, about = "Admission control and path selection for DTN transfers")]
struct Cli {
    /// Site inventory exported as JSON (storages, dtns, storage_dtn_map).
    #[arg(long)]
    inventory: PathBuf,

    /// Optional broker configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Checks whether a rate can be read from a storage.
    Probe { storage: String, rate: f64 },
    /// Selects the DTNs carrying a rate out of a storage, preempting extra jobs if needed.
    Query { storage: String, rate: f64 },
    /// Prints the active topology.
    Topology,
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    log::info!("Logger initialized. Starting resource broker.");

    let cli = Cli::parse();

    let manager = build_resource_manager(&cli.inventory, cli.config.as_deref())
        .with_context(|| format!("failed to open inventory '{}'", cli.inventory.display()))?;
    let broker = BrokerHandle::start(manager);

    let summary = broker.construct().await.context("failed to construct the resource graph")?;
    log::info!("Resource graph constructed: {}", summary);

    match cli.command {
        Command::Probe { storage, rate } => {
            let status = broker.probe_path_rate(storage, rate).await?;
            println!("{}", serde_json::json!({ "status": status.code(), "decision": status }));
        }
        Command::Query { storage, rate } => {
            let fragments = broker.query_path_dtns(storage, rate).await?;
            println!("{}", serde_json::to_string_pretty(&fragments)?);
        }
        Command::Topology => {
            let snapshot = broker.topology().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
