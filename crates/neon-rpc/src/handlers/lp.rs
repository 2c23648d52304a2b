// crates/neon-rpc/src/handlers/lp.rs
//
// Staking-asset handlers: Balance, Approve.

use neon_economics::SharedEconomy;

use super::{rpc_error, AckResponse, ApproveRequest, BalanceRequest, BalanceResponse};

pub async fn handle_balance(economy: &SharedEconomy, request: BalanceRequest) -> Result<BalanceResponse, String> {
    let balance = economy.read().await.lp().balance_of(&request.account);
    Ok(BalanceResponse::new(request.account, balance))
}

/// Handle an Approve request. Staking pulls LP through this allowance, so
/// the spender is normally the vault.
pub async fn handle_approve(economy: &SharedEconomy, request: ApproveRequest) -> Result<AckResponse, String> {
    let mut guard = economy.write().await;
    guard
        .lp_approve(request.caller, request.spender, request.amount)
        .map_err(rpc_error)?;
    Ok(AckResponse::ok(format!(
        "{} may spend {} wei of LP from {}",
        request.spender, request.amount, request.caller
    )))
}
