// crates/neon-vault/src/lib.rs
//
// neon-vault: Stake ledger and epoch reward accountant.
//
// The vault accepts a liquidity-pool token as stake, collects NEON transfer
// fees into fixed-length reward epochs, and pays each staker a pro-rata share
// of every closed epoch they participated in, minus a developer cut.

pub mod config;
pub mod epoch;
pub mod rewards;
pub mod stake;
pub mod vault;

pub use config::{VaultConfig, DEFAULT_DEV_FEE_BPS, DEFAULT_REWARD_PERIOD};
pub use epoch::{EpochAccumulator, EpochBook};
pub use rewards::{ClaimPlan, ClaimReceipt, DevCut, EpochPayout};
pub use stake::{StakeBook, StakeRecord};
pub use vault::{NeonVault, PositionView, VaultInfo};
