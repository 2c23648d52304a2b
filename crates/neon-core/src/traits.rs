// crates/neon-core/src/traits.rs

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::NeonError;
use crate::units::{wei_string, Wei};

/// Index of a reward epoch, counted from the vault's start time.
pub type EpochIndex = u64;

/// Outcome of a successful transfer.
///
/// `delivered + fee == amount` always holds. `fee_recipient` is `None` when
/// no fee was withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub from: Address,
    pub to: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
    /// Amount credited to `to`.
    #[serde(with = "wei_string")]
    pub delivered: Wei,
    /// Amount withheld and credited to the reward pool.
    #[serde(with = "wei_string")]
    pub fee: Wei,
    pub fee_recipient: Option<Address>,
}

impl TransferReceipt {
    /// A receipt for a transfer that carried no fee.
    pub fn fee_free(from: Address, to: Address, amount: Wei) -> Self {
        Self {
            from,
            to,
            amount,
            delivered: amount,
            fee: 0,
            fee_recipient: None,
        }
    }
}

/// A fungible asset ledger the vault can pull from and pay out of.
///
/// Implemented by the fee-bearing NEON token (reward asset) and by the
/// liquidity-pool token (staking asset).
pub trait TokenLedger: Send + Sync {
    /// The asset's own address, compared against the vault's configuration.
    fn address(&self) -> Address;

    /// Balance of `account` in wei.
    fn balance_of(&self, account: &Address) -> Wei;

    /// Move `amount` from `from` to `to`.
    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferReceipt, NeonError>;
}

/// Receiver of transfer-fee income.
///
/// Implemented by the staking vault.
pub trait FeeSink {
    /// The address whose fee credits this sink accounts for.
    fn fee_address(&self) -> Address;

    /// Credit `amount` of fee income to the epoch current at `now`.
    /// Returns the epoch the income was stamped with.
    fn record_fee_income(&mut self, amount: Wei, now: u64) -> Result<EpochIndex, NeonError>;
}
