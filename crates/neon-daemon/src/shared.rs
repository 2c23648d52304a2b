// crates/neon-daemon/src/shared.rs
//
// DaemonSharedState: the shared economy handle plus process metadata.
//
// Constructed once in main.rs, then handed to the epoch scheduler and the
// RPC server.

use std::sync::Arc;
use std::time::Instant;

use neon_core::{Clock, NeonError};
use neon_economics::{shared, Economy, EconomyGenesis, SharedEconomy};

/// Shared state for the daemon's tokio tasks.
#[derive(Clone)]
pub struct DaemonSharedState {
    /// The single-writer economy. Every RPC mutation and scheduler tick
    /// takes the write lock for the duration of one operation.
    pub economy: SharedEconomy,
    /// Daemon start time for uptime calculation.
    pub start_time: Instant,
}

impl DaemonSharedState {
    /// Mint the genesis economy on `clock`.
    pub fn new(genesis: &EconomyGenesis, clock: Arc<dyn Clock>) -> Result<Self, NeonError> {
        let economy = Economy::genesis(genesis, clock)?;
        Ok(Self {
            economy: shared(economy),
            start_time: Instant::now(),
        })
    }
}
