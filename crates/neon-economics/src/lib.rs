// crates/neon-economics/src/lib.rs
//
// neon-economics: The NEON economy as one serially-executed state machine.
//
// Owns the fee-bearing token, the LP staking asset and the staking vault,
// and routes every transfer fee into the vault's current epoch within the
// same operation.

pub mod economy;
pub mod genesis;
pub mod router;

pub use economy::{shared, Economy, ExitOutcome, SharedEconomy, TransferOutcome};
pub use genesis::{EconomyGenesis, LpHolder};
pub use router::{FeeRouter, RouterStats};
