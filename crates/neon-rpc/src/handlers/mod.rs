// crates/neon-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group. Amounts travel as decimal wei strings.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, Neon, NeonError, Wei};

pub mod gov;
pub mod lp;
pub mod node;
pub mod token;
pub mod vault;

/// Render a ledger error for the JSON-RPC envelope.
pub(crate) fn rpc_error(err: NeonError) -> String {
    err.to_string()
}

/// Request carrying only the acting account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerRequest {
    pub caller: Address,
}

/// Request for an account's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub account: Address,
}

/// An account balance in wei plus a human-readable rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account: Address,
    #[serde(with = "wei_string")]
    pub balance: Wei,
    pub display: String,
}

impl BalanceResponse {
    pub fn new(account: Address, balance: Wei) -> Self {
        Self {
            account,
            balance,
            display: Neon::from_wei(balance).to_string(),
        }
    }
}

/// Request to set an allowance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The owner granting the allowance.
    pub caller: Address,
    pub spender: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

/// Acknowledgement of a state change with no other payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}
