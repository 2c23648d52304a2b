// crates/neon-daemon/src/main.rs
//
// Binary entrypoint for the NEON development node.
//
// Initializes tracing, parses CLI arguments, loads configuration, mints the
// genesis economy, spawns the epoch scheduler and serves JSON-RPC.

mod config;
mod scheduler;
mod shared;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;
use scheduler::EpochScheduler;
use shared::DaemonSharedState;

use neon_core::SystemClock;
use neon_rpc::{NeonRpcServer, RpcConfig};

/// NEON daemon: runs the token economy and its RPC server.
#[derive(Parser, Debug)]
#[command(name = "neon-daemon", version, about = "NEON token economy node")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.neon/config.toml")]
    config: String,

    /// Override the RPC port from the config file.
    #[arg(long)]
    rpc_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Config first so its log level can seed the filter; load problems are
    // reported once the subscriber is up.
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    if let Some(port) = args.rpc_port {
        daemon_config.rpc_port = port;
    }

    tracing::info!("NEON Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!(
        "Reward period: {}s, dev fee: {} bps, transfer fee: {} bps",
        daemon_config.reward_period,
        daemon_config.dev_fee_bps,
        daemon_config.transfer_fee_bps
    );

    let genesis = daemon_config.genesis()?;
    tracing::info!("Governance: {}", genesis.governance);
    tracing::info!("Vault: {}", genesis.vault_address);
    if !genesis.auto_wire {
        tracing::warn!("auto_wire disabled: transfers carry no fee until the reward pool is set");
    }

    let shared_state = DaemonSharedState::new(&genesis, Arc::new(SystemClock))?;

    // Spawn the epoch scheduler.
    let mut epoch_scheduler = EpochScheduler::new(
        shared_state.economy.clone(),
        daemon_config.scheduler_tick_secs,
    );
    tokio::spawn(async move {
        if let Err(e) = epoch_scheduler.run().await {
            tracing::error!("Epoch scheduler error: {}", e);
        }
    });

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = NeonRpcServer::new(rpc_config, shared_state.economy.clone())
        .with_start_time(shared_state.start_time);

    tokio::select! {
        result = rpc_server.start() => {
            if let Err(e) = result {
                tracing::error!("RPC server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let economy = shared_state.economy.read().await;
    tracing::info!(
        "Shutting down at epoch {} ({} wei staked, {} wei routed)",
        economy.vault().current_epoch(),
        economy.vault().total_staked(),
        economy.router_stats().routed
    );
    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
