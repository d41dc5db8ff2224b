//! RPC endpoint reactor CLI.
//!
//! ```text
//!     reactor.toml → validate → build selector
//!         → eligible | check | connect | retry | blocklist | reset | chain-params
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use rpc_reactor::config::load_config;
use rpc_reactor::lifecycle::{build_selector, signals, CancelSignal};
use rpc_reactor::network::NetworkId;
use rpc_reactor::observability::{logging, metrics};
use rpc_reactor::{EndpointSelector, ProbeOutcome};

#[derive(Parser)]
#[command(name = "rpc-reactor")]
#[command(about = "Health-checked JSON-RPC endpoint selection", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "reactor.toml")]
    config: PathBuf,

    /// Chain id to operate on. Defaults to the configured network.
    #[arg(short, long)]
    network: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List endpoints eligible for probing
    Eligible,
    /// Probe every eligible endpoint
    Check,
    /// Pick a live endpoint
    Connect,
    /// Consume the once-per-session retry
    Retry,
    /// Show blocked endpoints
    Blocklist,
    /// End the session: clear blocklist, retry marker and failure records
    Reset,
    /// Print wallet_addEthereumChain / wallet_switchEthereumChain params
    ChainParams,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let selector = build_selector(&config)?;
    let network = match cli.network {
        Some(id) => NetworkId(id),
        None => selector.context().catalog().supported_network()?.0,
    };

    let output = run(&selector, network, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    selector: &EndpointSelector,
    network: NetworkId,
    command: Commands,
) -> Result<Value, Box<dyn std::error::Error>> {
    let context = selector.context();

    let output = match command {
        Commands::Eligible => json!(selector.get_eligible_endpoints(network)?),
        Commands::Check => {
            let cancel = CancelSignal::new();
            let _ctrl_c = signals::cancel_on_ctrl_c(cancel.clone());

            let checked = selector.check_endpoints_cancellable(network, &cancel).await?;
            if cancel.is_triggered() {
                tracing::warn!(network = %network, "Sweep interrupted; unfinished probes recorded as failures");
            }
            let results: Vec<Value> = checked
                .iter()
                .map(|(uri, outcome)| match outcome {
                    ProbeOutcome::Alive(_) => json!({ "endpoint": uri, "alive": true }),
                    ProbeOutcome::Failed(failure) => json!({
                        "endpoint": uri,
                        "alive": false,
                        "error": failure.to_string(),
                    }),
                })
                .collect();
            json!(results)
        }
        Commands::Connect => json!({ "endpoint": selector.connect_endpoint(network).await? }),
        Commands::Retry => json!({ "retry": selector.retry_on_invalid() }),
        Commands::Blocklist => json!(context.blocklist().snapshot()),
        Commands::Reset => json!({ "cleared": context.reset_session() }),
        Commands::ChainParams => {
            let config = context.catalog().get(network)?;
            json!({
                "wallet_switchEthereumChain": config.switch_chain_params(),
                "wallet_addEthereumChain": config.add_chain_params(),
            })
        }
    };
    Ok(output)
}
