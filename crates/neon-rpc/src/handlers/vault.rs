// crates/neon-rpc/src/handlers/vault.rs
//
// Staking vault handlers: Info, Stake, Withdraw, Pending, Claim, Exit,
// Position, Epoch, Epochs.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, EpochIndex, Wei};
use neon_economics::{ExitOutcome, SharedEconomy};
use neon_vault::{ClaimReceipt, EpochAccumulator, PositionView, VaultInfo};

use super::{rpc_error, CallerRequest};

/// Upper bound on `Epochs` page size.
const MAX_EPOCH_PAGE: usize = 256;

// ---------------------------------------------------------------------------
// Info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultInfoRequest {}

pub async fn handle_info(economy: &SharedEconomy, _request: VaultInfoRequest) -> Result<VaultInfo, String> {
    Ok(economy.read().await.vault().info())
}

// ---------------------------------------------------------------------------
// Stake / Withdraw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeRequest {
    pub caller: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeResponse {
    pub staker: Address,
    /// Epoch the change takes effect in.
    pub epoch: EpochIndex,
    /// Position after the change.
    #[serde(with = "wei_string")]
    pub staked: Wei,
    #[serde(with = "wei_string")]
    pub total_staked: Wei,
}

/// Handle a Stake request. The caller must have approved the vault on the
/// LP ledger for at least `amount`.
pub async fn handle_stake(economy: &SharedEconomy, request: StakeRequest) -> Result<StakeResponse, String> {
    let mut guard = economy.write().await;
    let epoch = guard.stake(request.caller, request.amount).map_err(rpc_error)?;
    Ok(StakeResponse {
        staker: request.caller,
        epoch,
        staked: guard.vault().user_total_staked(&request.caller),
        total_staked: guard.vault().total_staked(),
    })
}

pub async fn handle_withdraw(economy: &SharedEconomy, request: StakeRequest) -> Result<StakeResponse, String> {
    let mut guard = economy.write().await;
    let epoch = guard.withdraw(request.caller, request.amount).map_err(rpc_error)?;
    Ok(StakeResponse {
        staker: request.caller,
        epoch,
        staked: guard.vault().user_total_staked(&request.caller),
        total_staked: guard.vault().total_staked(),
    })
}

// ---------------------------------------------------------------------------
// Pending / Claim / Exit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequest {
    pub staker: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    pub staker: Address,
    #[serde(with = "wei_string")]
    pub pending: Wei,
    /// Timestamp the preview was computed at.
    pub as_of: u64,
}

pub async fn handle_pending(economy: &SharedEconomy, request: PendingRequest) -> Result<PendingResponse, String> {
    let guard = economy.read().await;
    Ok(PendingResponse {
        staker: request.staker,
        pending: guard.pending_reward(&request.staker),
        as_of: guard.now(),
    })
}

pub async fn handle_claim(economy: &SharedEconomy, request: CallerRequest) -> Result<ClaimReceipt, String> {
    let mut guard = economy.write().await;
    guard.get_reward(request.caller).map_err(rpc_error)
}

pub async fn handle_exit(economy: &SharedEconomy, request: CallerRequest) -> Result<ExitOutcome, String> {
    let mut guard = economy.write().await;
    guard.exit(request.caller).map_err(rpc_error)
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

pub async fn handle_position(economy: &SharedEconomy, request: PendingRequest) -> Result<PositionView, String> {
    let guard = economy.read().await;
    guard
        .vault()
        .position_view(&request.staker, guard.now())
        .ok_or_else(|| format!("no position for {}", request.staker))
}

// ---------------------------------------------------------------------------
// Epoch / Epochs
// ---------------------------------------------------------------------------

/// Look up one epoch, by index or by a timestamp inside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpochRequest {
    #[serde(default)]
    pub index: Option<EpochIndex>,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

pub async fn handle_epoch(economy: &SharedEconomy, request: EpochRequest) -> Result<EpochAccumulator, String> {
    let guard = economy.read().await;
    let vault = guard.vault();
    let found = match (request.index, request.timestamp) {
        (Some(index), None) => vault.epochs().get(index),
        (None, Some(ts)) => vault.epochs().epoch_at(ts, vault.reward_period()),
        (None, None) => Some(vault.epochs().current()),
        (Some(_), Some(_)) => return Err("give either index or timestamp, not both".to_string()),
    };
    found
        .cloned()
        .ok_or_else(|| "no epoch recorded there".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochsRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochsResponse {
    /// Newest first; the open epoch leads.
    pub epochs: Vec<EpochAccumulator>,
    pub closed_count: usize,
}

pub async fn handle_epochs(economy: &SharedEconomy, request: EpochsRequest) -> Result<EpochsResponse, String> {
    let guard = economy.read().await;
    let book = guard.vault().epochs();
    Ok(EpochsResponse {
        epochs: book.recent(request.limit.min(MAX_EPOCH_PAGE)),
        closed_count: book.closed_count(),
    })
}
