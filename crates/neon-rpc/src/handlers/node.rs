// crates/neon-rpc/src/handlers/node.rs
//
// Node info and health handlers: GetNodeInfo, GetHealth.

use serde::{Deserialize, Serialize};

use neon_core::EpochIndex;
use neon_economics::{RouterStats, SharedEconomy};

// ---------------------------------------------------------------------------
// GetNodeInfo
// ---------------------------------------------------------------------------

/// Request for node information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoRequest {}

/// Response containing node information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoResponse {
    /// Software version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Economy clock, unix seconds.
    pub now: u64,
    pub current_epoch: EpochIndex,
    pub router: RouterStats,
}

/// Handle a GetNodeInfo request.
pub async fn handle_get_node_info(
    economy: &SharedEconomy,
    _request: GetNodeInfoRequest,
    uptime_seconds: u64,
) -> Result<GetNodeInfoResponse, String> {
    let guard = economy.read().await;
    Ok(GetNodeInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        now: guard.now(),
        current_epoch: guard.vault().current_epoch(),
        router: guard.router_stats().clone(),
    })
}

// ---------------------------------------------------------------------------
// GetHealth
// ---------------------------------------------------------------------------

/// Request for node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthRequest {}

/// Response containing node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHealthResponse {
    /// Overall health: "healthy" or "degraded".
    pub status: String,
    /// Both ledgers still sum to their supply.
    pub conserved: bool,
    /// Token transfers are paused.
    pub paused: bool,
    /// Human-readable details.
    pub details: Option<String>,
}

/// Handle a GetHealth request.
///
/// A supply mismatch reports "degraded"; a pause is informational only.
pub async fn handle_get_health(
    economy: &SharedEconomy,
    _request: GetHealthRequest,
) -> Result<GetHealthResponse, String> {
    let guard = economy.read().await;
    let conserved = guard.is_conserved();
    let paused = guard.token().paused();
    let details = match (conserved, paused) {
        (false, _) => Some("balance sum differs from total supply".to_string()),
        (true, true) => Some("token transfers paused".to_string()),
        (true, false) => None,
    };
    Ok(GetHealthResponse {
        status: if conserved { "healthy" } else { "degraded" }.to_string(),
        conserved,
        paused,
        details,
    })
}
