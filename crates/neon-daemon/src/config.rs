// crates/neon-daemon/src/config.rs
//
// Runtime configuration for the NEON daemon.
// Loaded from a TOML file or populated with development defaults.

use serde::Deserialize;
use std::fs;

use neon_core::{Address, NeonError};
use neon_economics::{EconomyGenesis, LpHolder};
use neon_token::GenesisAllocation;
use neon_vault::{VaultConfig, DEFAULT_DEV_FEE_BPS, DEFAULT_REWARD_PERIOD};

/// Runtime configuration for the daemon.
///
/// Genesis accounts left out of the file fall back to the label-derived
/// development accounts, so an empty file boots the same economy the tests
/// use.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level when `RUST_LOG` is unset: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between scheduler ticks that close elapsed epochs.
    #[serde(default = "default_scheduler_tick_secs")]
    pub scheduler_tick_secs: u64,

    /// Principal governing both the token and the vault.
    #[serde(default)]
    pub governance: Option<Address>,

    #[serde(default)]
    pub presale: Option<Address>,

    #[serde(default)]
    pub uniswap_airdrop: Option<Address>,

    #[serde(default)]
    pub market: Option<Address>,

    #[serde(default)]
    pub team: Option<Address>,

    /// Initial staking-asset holders. Empty means the development preset.
    #[serde(default)]
    pub lp_holders: Vec<LpHolder>,

    /// Transfer fee in basis points.
    #[serde(default = "default_transfer_fee_bps")]
    pub transfer_fee_bps: u16,

    /// Epoch length in seconds.
    #[serde(default = "default_reward_period")]
    pub reward_period: u64,

    /// Developer cut of each epoch in basis points.
    #[serde(default = "default_dev_fee_bps")]
    pub dev_fee_bps: u16,

    #[serde(default)]
    pub dev_fee_receiver: Option<Address>,

    /// Point the reward pool at the vault and set the vault's assets at boot.
    #[serde(default = "default_auto_wire")]
    pub auto_wire: bool,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50051
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scheduler_tick_secs() -> u64 {
    10
}

fn default_transfer_fee_bps() -> u16 {
    neon_token::DEFAULT_TRANSFER_FEE_BPS
}

fn default_reward_period() -> u64 {
    DEFAULT_REWARD_PERIOD
}

fn default_dev_fee_bps() -> u16 {
    DEFAULT_DEV_FEE_BPS
}

fn default_auto_wire() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            scheduler_tick_secs: default_scheduler_tick_secs(),
            governance: None,
            presale: None,
            uniswap_airdrop: None,
            market: None,
            team: None,
            lp_holders: Vec::new(),
            transfer_fee_bps: default_transfer_fee_bps(),
            reward_period: default_reward_period(),
            dev_fee_bps: default_dev_fee_bps(),
            dev_fee_receiver: None,
            auto_wire: default_auto_wire(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build genesis parameters, filling unset accounts from the
    /// development preset.
    pub fn genesis(&self) -> Result<EconomyGenesis, NeonError> {
        if self.scheduler_tick_secs == 0 {
            return Err(NeonError::Config("scheduler_tick_secs must be positive".to_string()));
        }
        VaultConfig::check_period(self.reward_period)?;
        VaultConfig::check_dev_fee(self.dev_fee_bps)?;

        let dev = EconomyGenesis::development();
        let allocation = GenesisAllocation {
            presale: self.presale.unwrap_or(dev.allocation.presale),
            uniswap_airdrop: self.uniswap_airdrop.unwrap_or(dev.allocation.uniswap_airdrop),
            market: self.market.unwrap_or(dev.allocation.market),
            team: self.team.unwrap_or(dev.allocation.team),
        };
        let lp_holders = if self.lp_holders.is_empty() {
            vec![LpHolder {
                address: allocation.market,
                amount: neon_token::DEFAULT_LP_SUPPLY,
            }]
        } else {
            self.lp_holders.clone()
        };

        Ok(EconomyGenesis {
            governance: self.governance.unwrap_or(dev.governance),
            allocation,
            lp_holders,
            transfer_fee_bps: self.transfer_fee_bps,
            vault: VaultConfig {
                reward_period: self.reward_period,
                dev_fee_bps: self.dev_fee_bps,
                dev_fee_receiver: self.dev_fee_receiver.unwrap_or(Address::ZERO),
                ..VaultConfig::default()
            },
            auto_wire: self.auto_wire,
            ..dev
        })
    }
}
