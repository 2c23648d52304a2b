use thiserror::Error;

use crate::address::Address;
use crate::units::Wei;

/// Error taxonomy for every ledger, vault and governance operation.
///
/// All errors are synchronous and local to the failing call. A call that
/// returns an error has not mutated any state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NeonError {
    /// The sender does not hold enough of the asset.
    #[error("Insufficient balance: {account} holds {available} wei, needs {needed} wei")]
    InsufficientBalance {
        account: Address,
        available: Wei,
        needed: Wei,
    },

    /// The spender's allowance does not cover a delegated transfer.
    #[error("Insufficient allowance: {spender} may move {available} wei, needs {needed} wei")]
    InsufficientAllowance {
        spender: Address,
        available: Wei,
        needed: Wei,
    },

    /// A withdrawal exceeds the staker's deposited amount.
    #[error("Insufficient stake: {staker} has {available} wei staked, requested {requested} wei")]
    InsufficientStake {
        staker: Address,
        available: Wei,
        requested: Wei,
    },

    /// Zero or out-of-bounds amount or rate.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Caller is not the governance principal.
    #[error("Unauthorized: {0} is not the governance principal")]
    Unauthorized(Address),

    /// A call into an external asset ledger failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Balance-mutating calls are blocked while the token is paused.
    #[error("Token is paused")]
    PausedState,

    /// Malformed or disallowed address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid state transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for NeonError {
    fn from(e: serde_json::Error) -> Self {
        NeonError::Serialization(e.to_string())
    }
}
