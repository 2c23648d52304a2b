// crates/neon-token/src/lib.rs
//
// neon-token: The fee-bearing NEON value ledger and the fee-less LP token
// staked in the vault.

pub mod balances;
pub mod fee;
pub mod lp;
pub mod token;

pub use balances::Balances;
pub use fee::{compute_fee, FeeQuote, TransferFeeConfig, DEFAULT_TRANSFER_FEE_BPS};
pub use lp::{LpInfo, LpToken, DEFAULT_LP_SUPPLY};
pub use token::{GenesisAllocation, NeonToken, TokenInfo, TOTAL_SUPPLY};
