// crates/neon-rpc/src/handlers/token.rs
//
// Value ledger handlers: Info, Balance, Transfer, Approve, TransferFrom,
// Allowance.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, Wei};
use neon_economics::{SharedEconomy, TransferOutcome};
use neon_token::TokenInfo;

use super::{rpc_error, AckResponse, ApproveRequest, BalanceRequest, BalanceResponse};

// ---------------------------------------------------------------------------
// Info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfoRequest {}

pub async fn handle_info(economy: &SharedEconomy, _request: TokenInfoRequest) -> Result<TokenInfo, String> {
    Ok(economy.read().await.token().info())
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

pub async fn handle_balance(economy: &SharedEconomy, request: BalanceRequest) -> Result<BalanceResponse, String> {
    let balance = economy.read().await.token().balance_of(&request.account);
    Ok(BalanceResponse::new(request.account, balance))
}

// ---------------------------------------------------------------------------
// Transfer / TransferFrom
// ---------------------------------------------------------------------------

/// Request to move NEON out of the caller's account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub caller: Address,
    pub to: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

/// Handle a Transfer request. The withheld fee is routed into the vault's
/// open epoch before the response is returned.
pub async fn handle_transfer(economy: &SharedEconomy, request: TransferRequest) -> Result<TransferOutcome, String> {
    let mut guard = economy.write().await;
    guard
        .transfer(request.caller, request.to, request.amount)
        .map_err(rpc_error)
}

/// Request for the caller to move NEON out of `from` using an allowance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferFromRequest {
    pub caller: Address,
    pub from: Address,
    pub to: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

pub async fn handle_transfer_from(
    economy: &SharedEconomy,
    request: TransferFromRequest,
) -> Result<TransferOutcome, String> {
    let mut guard = economy.write().await;
    guard
        .transfer_from(request.caller, request.from, request.to, request.amount)
        .map_err(rpc_error)
}

// ---------------------------------------------------------------------------
// Approve / Allowance
// ---------------------------------------------------------------------------

pub async fn handle_approve(economy: &SharedEconomy, request: ApproveRequest) -> Result<AckResponse, String> {
    let mut guard = economy.write().await;
    guard
        .approve(request.caller, request.spender, request.amount)
        .map_err(rpc_error)?;
    Ok(AckResponse::ok(format!(
        "{} may spend {} wei of {}",
        request.spender, request.amount, request.caller
    )))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRequest {
    pub owner: Address,
    pub spender: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "wei_string")]
    pub allowance: Wei,
}

pub async fn handle_allowance(
    economy: &SharedEconomy,
    request: AllowanceRequest,
) -> Result<AllowanceResponse, String> {
    let allowance = economy
        .read()
        .await
        .token()
        .allowance(&request.owner, &request.spender);
    Ok(AllowanceResponse {
        owner: request.owner,
        spender: request.spender,
        allowance,
    })
}
