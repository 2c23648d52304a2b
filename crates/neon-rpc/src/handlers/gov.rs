// crates/neon-rpc/src/handlers/gov.rs
//
// Governance handlers for the token and the vault. Every request names its
// caller; the economy rejects callers other than the component's principal.

use serde::{Deserialize, Serialize};

use neon_core::{Address, NeonError, Wei};
use neon_economics::{Economy, SharedEconomy};

use super::{rpc_error, AckResponse, CallerRequest};

/// Run one restricted setter under the write lock and acknowledge it.
async fn restricted<F>(economy: &SharedEconomy, message: String, op: F) -> Result<AckResponse, String>
where
    F: FnOnce(&mut Economy) -> Result<(), NeonError>,
{
    let mut guard = economy.write().await;
    op(&mut guard).map_err(rpc_error)?;
    Ok(AckResponse::ok(message))
}

// ---------------------------------------------------------------------------
// Token parameters
// ---------------------------------------------------------------------------

/// Request carrying a basis-point rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BpsRequest {
    pub caller: Address,
    pub bps: u16,
}

/// Request carrying an account to install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRequest {
    pub caller: Address,
    pub address: Address,
}

pub async fn handle_transfer_fee(economy: &SharedEconomy, request: BpsRequest) -> Result<AckResponse, String> {
    let message = format!("transfer fee set to {} bps", request.bps);
    restricted(economy, message, |e| e.change_transfer_fee(&request.caller, request.bps)).await
}

pub async fn handle_reward_pool(economy: &SharedEconomy, request: AddressRequest) -> Result<AckResponse, String> {
    let message = format!("reward pool set to {}", request.address);
    restricted(economy, message, |e| e.change_reward_pool(&request.caller, request.address)).await
}

pub async fn handle_presale(economy: &SharedEconomy, request: AddressRequest) -> Result<AckResponse, String> {
    let message = format!("presale set to {}", request.address);
    restricted(economy, message, |e| e.change_presale(&request.caller, request.address)).await
}

pub async fn handle_pause(economy: &SharedEconomy, request: CallerRequest) -> Result<AckResponse, String> {
    restricted(economy, "token paused".to_string(), |e| e.pause(&request.caller)).await
}

pub async fn handle_unpause(economy: &SharedEconomy, request: CallerRequest) -> Result<AckResponse, String> {
    restricted(economy, "token unpaused".to_string(), |e| e.unpause(&request.caller)).await
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Which ownership step to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipStep {
    /// Hand over immediately.
    Transfer,
    /// Record a nominee who must accept.
    Nominate,
    /// The caller accepts a pending nomination.
    Accept,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipRequest {
    pub caller: Address,
    pub step: OwnershipStep,
    /// New owner or nominee; ignored for `accept`.
    #[serde(default)]
    pub address: Option<Address>,
}

impl OwnershipRequest {
    fn target(&self) -> Result<Address, String> {
        self.address
            .ok_or_else(|| format!("{:?} needs an address", self.step))
    }
}

pub async fn handle_token_owner(economy: &SharedEconomy, request: OwnershipRequest) -> Result<AckResponse, String> {
    let caller = request.caller;
    match request.step {
        OwnershipStep::Transfer => {
            let to = request.target()?;
            restricted(economy, format!("token owner is now {}", to), |e| {
                e.transfer_token_ownership(&caller, to)
            })
            .await
        }
        OwnershipStep::Nominate => {
            let to = request.target()?;
            restricted(economy, format!("{} nominated as token owner", to), |e| {
                e.nominate_token_owner(&caller, to)
            })
            .await
        }
        OwnershipStep::Accept => {
            restricted(economy, format!("token owner is now {}", caller), |e| {
                e.accept_token_ownership(&caller)
            })
            .await
        }
    }
}

pub async fn handle_vault_owner(economy: &SharedEconomy, request: OwnershipRequest) -> Result<AckResponse, String> {
    let caller = request.caller;
    match request.step {
        OwnershipStep::Transfer => {
            let to = request.target()?;
            restricted(economy, format!("vault owner is now {}", to), |e| {
                e.transfer_vault_ownership(&caller, to)
            })
            .await
        }
        OwnershipStep::Nominate => {
            let to = request.target()?;
            restricted(economy, format!("{} nominated as vault owner", to), |e| {
                e.nominate_vault_owner(&caller, to)
            })
            .await
        }
        OwnershipStep::Accept => {
            restricted(economy, format!("vault owner is now {}", caller), |e| {
                e.accept_vault_ownership(&caller)
            })
            .await
        }
    }
}

// ---------------------------------------------------------------------------
// Vault parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRequest {
    pub caller: Address,
    /// New epoch length in seconds.
    pub period: u64,
}

pub async fn handle_reward_period(economy: &SharedEconomy, request: PeriodRequest) -> Result<AckResponse, String> {
    let message = format!("reward period set to {}s", request.period);
    restricted(economy, message, |e| e.change_reward_period(&request.caller, request.period)).await
}

pub async fn handle_dev_fee(economy: &SharedEconomy, request: BpsRequest) -> Result<AckResponse, String> {
    let message = format!("dev fee set to {} bps", request.bps);
    restricted(economy, message, |e| e.change_dev_fee(&request.caller, request.bps)).await
}

pub async fn handle_dev_fee_receiver(
    economy: &SharedEconomy,
    request: AddressRequest,
) -> Result<AckResponse, String> {
    let message = format!("dev fee receiver set to {}", request.address);
    restricted(economy, message, |e| {
        e.change_dev_fee_receiver(&request.caller, request.address)
    })
    .await
}

pub async fn handle_staking_asset(economy: &SharedEconomy, request: AddressRequest) -> Result<AckResponse, String> {
    let message = format!("staking asset set to {}", request.address);
    restricted(economy, message, |e| e.change_staking_asset(&request.caller, request.address)).await
}

pub async fn handle_reward_asset(economy: &SharedEconomy, request: AddressRequest) -> Result<AckResponse, String> {
    let message = format!("reward asset set to {}", request.address);
    restricted(economy, message, |e| e.change_reward_asset(&request.caller, request.address)).await
}

// ---------------------------------------------------------------------------
// Dev fee collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectResponse {
    pub receiver: Address,
    #[serde(with = "neon_core::units::wei_string")]
    pub collected: Wei,
}

pub async fn handle_collect_dev_fees(
    economy: &SharedEconomy,
    request: CallerRequest,
) -> Result<CollectResponse, String> {
    let mut guard = economy.write().await;
    let collected = guard.collect_dev_fees(&request.caller).map_err(rpc_error)?;
    Ok(CollectResponse {
        receiver: guard.vault().dev_fee_receiver(),
        collected,
    })
}
