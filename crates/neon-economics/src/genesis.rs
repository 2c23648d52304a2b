// crates/neon-economics/src/genesis.rs
//
// Genesis parameters for a fresh economy.
//
// The development preset derives every named account from a label so that a
// node, its CLI and its tests agree on addresses without a key registry.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, Wei, WEI_PER_NEON};
use neon_token::{GenesisAllocation, DEFAULT_LP_SUPPLY, DEFAULT_TRANSFER_FEE_BPS};
use neon_vault::VaultConfig;

/// An initial staking-asset holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpHolder {
    pub address: Address,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

/// Everything needed to build an `Economy` from nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyGenesis {
    /// Principal governing both the token and the vault.
    pub governance: Address,
    pub token_address: Address,
    pub lp_address: Address,
    pub vault_address: Address,
    pub allocation: GenesisAllocation,
    pub lp_symbol: String,
    pub lp_holders: Vec<LpHolder>,
    pub transfer_fee_bps: u16,
    pub vault: VaultConfig,
    /// Point the token's reward pool at the vault and configure the vault's
    /// assets right after genesis.
    pub auto_wire: bool,
}

impl EconomyGenesis {
    /// Development preset with label-derived accounts.
    ///
    /// The market wallet also holds the whole LP supply (1,000 LP).
    pub fn development() -> Self {
        let market = Address::derive("neon/market");
        Self {
            governance: Address::derive("neon/governance"),
            token_address: Address::derive("neon/token"),
            lp_address: Address::derive("neon/lp"),
            vault_address: Address::derive("neon/vault"),
            allocation: GenesisAllocation {
                presale: Address::derive("neon/presale"),
                uniswap_airdrop: Address::derive("neon/uniswap-airdrop"),
                market,
                team: Address::derive("neon/team"),
            },
            lp_symbol: "NEON-LP".to_string(),
            lp_holders: vec![LpHolder {
                address: market,
                amount: DEFAULT_LP_SUPPLY,
            }],
            transfer_fee_bps: DEFAULT_TRANSFER_FEE_BPS,
            vault: VaultConfig::default(),
            auto_wire: true,
        }
    }

    /// Total LP minted at genesis.
    pub fn lp_supply(&self) -> Wei {
        self.lp_holders.iter().map(|h| h.amount).sum()
    }
}

impl Default for EconomyGenesis {
    fn default() -> Self {
        Self::development()
    }
}
