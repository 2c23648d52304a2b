// crates/neon-core/src/lib.rs
//
// neon-core: Core types, errors, governance and ledger traits for the NEON
// token economy.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines account identity, amount arithmetic, the error taxonomy, the
// single-principal governance gate, and the trait seams between the token
// ledger and the staking vault.

pub mod address;
pub mod clock;
pub mod error;
pub mod governance;
pub mod traits;
pub mod units;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use neon_core::Address;`
pub use address::Address;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::NeonError;
pub use governance::Governance;
pub use traits::{EpochIndex, FeeSink, TokenLedger, TransferReceipt};
pub use units::{mul_bps, mul_div, Neon, Wei, BPS_DENOMINATOR, DECIMALS, WEI_PER_NEON};
