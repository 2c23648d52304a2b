// crates/neon-vault/src/config.rs
//
// Governance-mutable vault parameters.
//
// Defaults at deployment:
//   - reward_period: 86,400 seconds (one day)
//   - dev_fee_bps: 400 (4%)
//   - dev_fee_receiver, staking_asset, reward_asset: unset (zero)

use serde::{Deserialize, Serialize};

use neon_core::units::check_bps;
use neon_core::{Address, NeonError};

/// Default epoch length: one day.
pub const DEFAULT_REWARD_PERIOD: u64 = 86_400;

/// Default developer cut of each epoch's income: 400 bps = 4%.
pub const DEFAULT_DEV_FEE_BPS: u16 = 400;

/// Vault configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Epoch length in seconds. Always non-zero.
    pub reward_period: u64,
    /// Developer cut in basis points.
    pub dev_fee_bps: u16,
    /// Receiver of the developer cut.
    pub dev_fee_receiver: Address,
    /// The liquidity-pool token accepted for staking.
    pub staking_asset: Address,
    /// The fee-bearing token paid out as reward.
    pub reward_asset: Address,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            reward_period: DEFAULT_REWARD_PERIOD,
            dev_fee_bps: DEFAULT_DEV_FEE_BPS,
            dev_fee_receiver: Address::ZERO,
            staking_asset: Address::ZERO,
            reward_asset: Address::ZERO,
        }
    }
}

impl VaultConfig {
    /// Validate a reward period.
    pub fn check_period(period: u64) -> Result<u64, NeonError> {
        if period == 0 {
            return Err(NeonError::InvalidAmount(
                "reward period must be non-zero".to_string(),
            ));
        }
        Ok(period)
    }

    /// Validate a dev fee.
    pub fn check_dev_fee(bps: u16) -> Result<u16, NeonError> {
        check_bps(bps)
    }

    /// Fail with `TransferFailed` unless `asset` is the configured staking asset.
    pub fn ensure_staking_asset(&self, asset: &Address) -> Result<(), NeonError> {
        if self.staking_asset.is_zero() {
            return Err(NeonError::TransferFailed(
                "staking asset is not configured".to_string(),
            ));
        }
        if *asset != self.staking_asset {
            return Err(NeonError::TransferFailed(format!(
                "asset {} is not the staking asset {}",
                asset, self.staking_asset
            )));
        }
        Ok(())
    }

    /// Fail with `TransferFailed` unless `asset` is the configured reward asset.
    pub fn ensure_reward_asset(&self, asset: &Address) -> Result<(), NeonError> {
        if self.reward_asset.is_zero() {
            return Err(NeonError::TransferFailed(
                "reward asset is not configured".to_string(),
            ));
        }
        if *asset != self.reward_asset {
            return Err(NeonError::TransferFailed(format!(
                "asset {} is not the reward asset {}",
                asset, self.reward_asset
            )));
        }
        Ok(())
    }
}
