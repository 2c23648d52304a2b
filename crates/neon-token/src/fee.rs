// crates/neon-token/src/fee.rs
//
// Transfer-fee configuration and fee math.
//
// Every NEON transfer withholds `floor(amount * rate / 10000)` and credits it
// to the reward pool instead of the recipient. Transfers that touch the pool
// itself (either side) are exempt, which stops fee-on-fee recursion when the
// vault pays rewards out. While the pool is unset no fee is withheld.

use serde::{Deserialize, Serialize};

use neon_core::units::{check_bps, mul_bps, wei_string};
use neon_core::{Address, NeonError, Wei};

/// Default transfer fee: 100 bps = 1%.
pub const DEFAULT_TRANSFER_FEE_BPS: u16 = 100;

/// Fee split of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Amount the recipient receives.
    #[serde(with = "wei_string")]
    pub delivered: Wei,
    /// Amount credited to the reward pool.
    #[serde(with = "wei_string")]
    pub fee: Wei,
}

/// Compute the fee owed on `amount` at `rate_bps`.
pub fn compute_fee(amount: Wei, rate_bps: u16) -> Wei {
    mul_bps(amount, rate_bps)
}

/// Governance-mutable transfer-fee settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFeeConfig {
    /// Fee rate in basis points (0..=10000).
    pub rate_bps: u16,
    /// Address credited with fees. Zero means "not configured".
    pub reward_pool: Address,
}

impl Default for TransferFeeConfig {
    fn default() -> Self {
        Self {
            rate_bps: DEFAULT_TRANSFER_FEE_BPS,
            reward_pool: Address::ZERO,
        }
    }
}

impl TransferFeeConfig {
    /// Change the rate. Takes effect for the next transfer.
    pub fn set_rate(&mut self, rate_bps: u16) -> Result<(), NeonError> {
        self.rate_bps = check_bps(rate_bps)?;
        Ok(())
    }

    /// Whether a transfer between `from` and `to` is fee-exempt.
    ///
    /// `extra_exempt` lists senders that never pay (the presale distributor).
    pub fn is_exempt(&self, from: &Address, to: &Address, extra_exempt: &[Address]) -> bool {
        self.reward_pool.is_zero()
            || *from == self.reward_pool
            || *to == self.reward_pool
            || extra_exempt.iter().any(|a| !a.is_zero() && a == from)
    }

    /// Split `amount` into the delivered part and the withheld fee.
    pub fn quote(&self, from: &Address, to: &Address, amount: Wei, extra_exempt: &[Address]) -> FeeQuote {
        if self.is_exempt(from, to, extra_exempt) {
            return FeeQuote {
                delivered: amount,
                fee: 0,
            };
        }
        let fee = compute_fee(amount, self.rate_bps);
        FeeQuote {
            delivered: amount - fee,
            fee,
        }
    }
}
