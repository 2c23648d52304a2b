// crates/neon-economics/src/economy.rs
//
// Economy: the single owner of every ledger.
//
// Token, staking asset and vault live in one struct; each external call
// runs to completion as one serial step. Outer layers share it behind a
// single `RwLock`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use neon_core::{Address, Clock, EpochIndex, NeonError, TokenLedger, TransferReceipt, Wei};
use neon_token::{LpToken, NeonToken};
use neon_vault::{ClaimReceipt, NeonVault, VaultConfig};

use crate::genesis::EconomyGenesis;
use crate::router::{FeeRouter, RouterStats};

/// Shared handle used by the daemon tasks and the RPC server.
pub type SharedEconomy = Arc<RwLock<Economy>>;

/// Wrap an economy for sharing across tasks.
pub fn shared(economy: Economy) -> SharedEconomy {
    Arc::new(RwLock::new(economy))
}

/// A completed NEON transfer and the epoch its fee was stamped with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub receipt: TransferReceipt,
    pub fee_epoch: Option<EpochIndex>,
}

/// Outcome of `exit`: the claim plus the returned stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitOutcome {
    pub claim: ClaimReceipt,
    #[serde(with = "neon_core::units::wei_string")]
    pub withdrawn: Wei,
}

pub struct Economy {
    token: NeonToken,
    lp: LpToken,
    vault: NeonVault,
    router: FeeRouter,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Economy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Economy")
            .field("token", &self.token)
            .field("lp", &self.lp)
            .field("vault", &self.vault)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl Economy {
    /// Build an economy from genesis parameters. The vault's epoch clock
    /// starts at `clock.now()`.
    pub fn genesis(genesis: &EconomyGenesis, clock: Arc<dyn Clock>) -> Result<Self, NeonError> {
        let gov = genesis.governance;
        VaultConfig::check_period(genesis.vault.reward_period)?;
        VaultConfig::check_dev_fee(genesis.vault.dev_fee_bps)?;

        let mut token = NeonToken::genesis(genesis.token_address, gov, &genesis.allocation)?;
        if token.transfer_fee() != genesis.transfer_fee_bps {
            token.change_transfer_fee(&gov, genesis.transfer_fee_bps)?;
        }
        let lp = LpToken::genesis(
            genesis.lp_address,
            &genesis.lp_symbol,
            genesis.lp_holders.iter().map(|h| (h.address, h.amount)),
        )?;
        let vault = NeonVault::with_config(
            genesis.vault_address,
            gov,
            clock.now(),
            genesis.vault.clone(),
        );

        let mut economy = Self {
            token,
            lp,
            vault,
            router: FeeRouter::new(),
            clock,
        };
        if genesis.auto_wire {
            economy.auto_wire(&gov)?;
        }
        Ok(economy)
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn token(&self) -> &NeonToken {
        &self.token
    }

    pub fn lp(&self) -> &LpToken {
        &self.lp
    }

    pub fn vault(&self) -> &NeonVault {
        &self.vault
    }

    pub fn router_stats(&self) -> &RouterStats {
        self.router.stats()
    }

    /// Whether both asset ledgers still sum to their supply.
    pub fn is_conserved(&self) -> bool {
        self.token.is_conserved() && self.lp.is_conserved()
    }

    /// Reward `staker` would receive from a claim now.
    pub fn pending_reward(&self, staker: &Address) -> Wei {
        self.vault.pending_reward(staker, self.now())
    }

    fn ensure_live(&self) -> Result<(), NeonError> {
        if self.token.paused() {
            return Err(NeonError::PausedState);
        }
        Ok(())
    }

    /// Vault payouts move NEON out of the reward pool, which must be the
    /// vault (or unset) for them to arrive without a fee.
    fn ensure_fee_exempt_payouts(&self) -> Result<(), NeonError> {
        let pool = self.token.reward_pool();
        if pool.is_zero() || pool == self.vault.address() {
            return Ok(());
        }
        Err(NeonError::InvalidState(format!(
            "reward pool {} is not the vault {}; payouts would be charged a transfer fee",
            pool,
            self.vault.address()
        )))
    }

    // -----------------------------------------------------------------------
    // Value ledger + fee router
    // -----------------------------------------------------------------------

    fn route(&mut self, receipt: TransferReceipt, now: u64) -> Result<TransferOutcome, NeonError> {
        let fee_epoch = self.router.route(&receipt, &mut self.vault, now)?;
        Ok(TransferOutcome { receipt, fee_epoch })
    }

    /// Transfer NEON and record the withheld fee in the open epoch.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> Result<TransferOutcome, NeonError> {
        let now = self.now();
        let receipt = self.token.transfer(from, to, amount)?;
        self.route(receipt, now)
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Wei,
    ) -> Result<TransferOutcome, NeonError> {
        let now = self.now();
        let receipt = self.token.transfer_from(spender, from, to, amount)?;
        self.route(receipt, now)
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Wei) -> Result<(), NeonError> {
        self.token.approve(owner, spender, amount)
    }

    /// Approve `spender` over `owner`'s staking asset.
    pub fn lp_approve(&mut self, owner: Address, spender: Address, amount: Wei) -> Result<(), NeonError> {
        self.lp.approve(owner, spender, amount)
    }

    // -----------------------------------------------------------------------
    // Vault
    // -----------------------------------------------------------------------

    /// Close the open epoch if its period has elapsed.
    pub fn sync(&mut self) -> Option<EpochIndex> {
        let now = self.now();
        self.vault.sync(now)
    }

    pub fn stake(&mut self, staker: Address, amount: Wei) -> Result<EpochIndex, NeonError> {
        self.ensure_live()?;
        let now = self.now();
        self.vault.stake(staker, amount, &mut self.lp, now)
    }

    pub fn withdraw(&mut self, staker: Address, amount: Wei) -> Result<EpochIndex, NeonError> {
        self.ensure_live()?;
        let now = self.now();
        self.vault.withdraw(staker, amount, &mut self.lp, now)
    }

    pub fn get_reward(&mut self, staker: Address) -> Result<ClaimReceipt, NeonError> {
        self.ensure_live()?;
        self.ensure_fee_exempt_payouts()?;
        let now = self.now();
        self.vault.get_reward(staker, &mut self.token, now)
    }

    pub fn exit(&mut self, staker: Address) -> Result<ExitOutcome, NeonError> {
        self.ensure_live()?;
        self.ensure_fee_exempt_payouts()?;
        let now = self.now();
        let (claim, withdrawn) = self.vault.exit(staker, &mut self.lp, &mut self.token, now)?;
        Ok(ExitOutcome { claim, withdrawn })
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Point the token's fee credit at the vault and configure the vault's
    /// staking and reward assets. Requires the caller to govern both.
    pub fn auto_wire(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.token.governance().ensure(caller)?;
        self.vault.governance().ensure(caller)?;
        self.token.change_reward_pool(caller, self.vault.address())?;
        self.vault
            .change_staking_asset(caller, TokenLedger::address(&self.lp))?;
        self.vault
            .change_reward_asset(caller, TokenLedger::address(&self.token))?;
        tracing::info!(
            "Economy wired: token {} -> vault {}, staking asset {}",
            TokenLedger::address(&self.token),
            self.vault.address(),
            TokenLedger::address(&self.lp)
        );
        Ok(())
    }

    pub fn change_transfer_fee(&mut self, caller: &Address, bps: u16) -> Result<(), NeonError> {
        self.token.change_transfer_fee(caller, bps)
    }

    pub fn change_reward_pool(&mut self, caller: &Address, pool: Address) -> Result<(), NeonError> {
        self.token.change_reward_pool(caller, pool)
    }

    pub fn change_presale(&mut self, caller: &Address, presale: Address) -> Result<(), NeonError> {
        self.token.change_presale(caller, presale)
    }

    pub fn pause(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.token.pause(caller)
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.token.unpause(caller)
    }

    pub fn transfer_token_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NeonError> {
        self.token.transfer_ownership(caller, new_owner)
    }

    pub fn nominate_token_owner(&mut self, caller: &Address, candidate: Address) -> Result<(), NeonError> {
        self.token.nominate_owner(caller, candidate)
    }

    pub fn accept_token_ownership(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.token.accept_ownership(caller)
    }

    pub fn change_reward_period(&mut self, caller: &Address, period: u64) -> Result<(), NeonError> {
        let now = self.now();
        self.vault.change_reward_period(caller, period, now)
    }

    pub fn change_dev_fee(&mut self, caller: &Address, bps: u16) -> Result<(), NeonError> {
        let now = self.now();
        self.vault.change_dev_fee(caller, bps, now)
    }

    pub fn change_dev_fee_receiver(&mut self, caller: &Address, receiver: Address) -> Result<(), NeonError> {
        self.vault.change_dev_fee_receiver(caller, receiver)
    }

    pub fn change_staking_asset(&mut self, caller: &Address, asset: Address) -> Result<(), NeonError> {
        self.vault.change_staking_asset(caller, asset)
    }

    pub fn change_reward_asset(&mut self, caller: &Address, asset: Address) -> Result<(), NeonError> {
        self.vault.change_reward_asset(caller, asset)
    }

    pub fn transfer_vault_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NeonError> {
        self.vault.transfer_ownership(caller, new_owner)
    }

    pub fn nominate_vault_owner(&mut self, caller: &Address, candidate: Address) -> Result<(), NeonError> {
        self.vault.nominate_owner(caller, candidate)
    }

    pub fn accept_vault_ownership(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.vault.accept_ownership(caller)
    }

    pub fn collect_dev_fees(&mut self, caller: &Address) -> Result<Wei, NeonError> {
        self.ensure_live()?;
        self.ensure_fee_exempt_payouts()?;
        let now = self.now();
        self.vault.collect_dev_fees(caller, &mut self.token, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_core::{ManualClock, WEI_PER_NEON};

    const T0: u64 = 1_700_000_000;

    fn economy() -> (Economy, Arc<ManualClock>, EconomyGenesis) {
        let clock = Arc::new(ManualClock::new(T0));
        let genesis = EconomyGenesis::development();
        let economy = Economy::genesis(&genesis, clock.clone()).unwrap();
        (economy, clock, genesis)
    }

    #[test]
    fn test_genesis_is_wired() {
        let (e, _, g) = economy();
        assert_eq!(e.token().reward_pool(), g.vault_address);
        assert_eq!(e.vault().staking_asset(), g.lp_address);
        assert_eq!(e.vault().reward_asset(), g.token_address);
        assert_eq!(e.vault().contract_start_time(), T0);
        assert!(e.is_conserved());
    }

    #[test]
    fn test_unwired_genesis_charges_no_fee() {
        let clock = Arc::new(ManualClock::new(T0));
        let mut genesis = EconomyGenesis::development();
        genesis.auto_wire = false;
        let mut e = Economy::genesis(&genesis, clock).unwrap();
        let out = e
            .transfer(genesis.allocation.market, Address::repeat(0x42), 100 * WEI_PER_NEON)
            .unwrap();
        assert_eq!(out.receipt.fee, 0);
        assert_eq!(out.fee_epoch, None);
    }

    #[test]
    fn test_genesis_rejects_bad_vault_config() {
        let mut genesis = EconomyGenesis::development();
        genesis.vault.reward_period = 0;
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T0));
        assert!(Economy::genesis(&genesis, clock).is_err());
    }

    #[test]
    fn test_transfer_routes_fee() {
        let (mut e, clock, g) = economy();
        clock.advance(30);
        let out = e
            .transfer(g.allocation.market, Address::repeat(0x42), 100 * WEI_PER_NEON)
            .unwrap();
        assert_eq!(out.fee_epoch, Some(0));
        assert_eq!(e.vault().epoch_reward(T0), WEI_PER_NEON);
        assert_eq!(e.router_stats().routed, WEI_PER_NEON);
        assert_eq!(e.token().balance_of(&g.vault_address), WEI_PER_NEON);
    }

    #[test]
    fn test_pause_blocks_vault_operations() {
        let (mut e, _, g) = economy();
        let market = g.allocation.market;
        e.lp_approve(market, g.vault_address, 10).unwrap();
        e.pause(&g.governance).unwrap();
        assert_eq!(e.stake(market, 10), Err(NeonError::PausedState));
        assert_eq!(e.withdraw(market, 10), Err(NeonError::PausedState));
        assert_eq!(e.get_reward(market).map(|r| r.reward), Err(NeonError::PausedState));
        // Configuration is still allowed.
        e.change_dev_fee(&g.governance, 300).unwrap();
        e.unpause(&g.governance).unwrap();
        assert!(e.stake(market, 10).is_ok());
    }
}
