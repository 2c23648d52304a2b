// crates/neon-vault/src/vault.rs
//
// The NEON staking vault.
//
// Holds staked LP tokens and the NEON fee income credited to it, and pays
// each staker a pro-rata share of every closed epoch they were staked in.
// All mutating operations validate first and touch vault state only after
// the external asset transfers have succeeded.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, EpochIndex, FeeSink, Governance, NeonError, TokenLedger, Wei};

use crate::config::VaultConfig;
use crate::epoch::{EpochAccumulator, EpochBook};
use crate::rewards::{plan_claim, unpaid_dev_cuts, ClaimPlan, ClaimReceipt};
use crate::stake::{StakeBook, StakeRecord};

/// Read-only vault summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultInfo {
    pub address: Address,
    pub governance: Address,
    pub config: VaultConfig,
    pub contract_start_time: u64,
    pub last_rewarded_time: u64,
    pub current_epoch: EpochIndex,
    #[serde(with = "wei_string")]
    pub total_staked: Wei,
    pub active_stakers: usize,
}

/// A staker's position with its claimable reward.
#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    #[serde(flatten)]
    pub record: StakeRecord,
    #[serde(with = "wei_string")]
    pub pending_reward: Wei,
}

/// Map an asset-ledger failure to `TransferFailed`, keeping `PausedState`.
fn transfer_failed(err: NeonError) -> NeonError {
    match err {
        NeonError::PausedState | NeonError::TransferFailed(_) => err,
        other => NeonError::TransferFailed(other.to_string()),
    }
}

/// Stake ledger plus epoch reward accountant.
#[derive(Debug, Clone)]
pub struct NeonVault {
    /// The vault's own account in both asset ledgers.
    address: Address,
    governance: Governance,
    config: VaultConfig,
    epochs: EpochBook,
    stakes: StakeBook,
}

impl NeonVault {
    /// Deploy a vault at `start_time` with default configuration.
    pub fn new(address: Address, governance: Address, start_time: u64) -> Self {
        Self::with_config(address, governance, start_time, VaultConfig::default())
    }

    pub fn with_config(
        address: Address,
        governance: Address,
        start_time: u64,
        config: VaultConfig,
    ) -> Self {
        tracing::info!(
            "Vault {} deployed at {} (period {}s, dev fee {} bps)",
            address,
            start_time,
            config.reward_period,
            config.dev_fee_bps
        );
        Self {
            address,
            governance: Governance::new("vault", governance),
            config,
            epochs: EpochBook::new(start_time),
            stakes: StakeBook::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn governance(&self) -> &Governance {
        &self.governance
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn epochs(&self) -> &EpochBook {
        &self.epochs
    }

    pub fn reward_period(&self) -> u64 {
        self.config.reward_period
    }

    pub fn dev_fee(&self) -> u16 {
        self.config.dev_fee_bps
    }

    pub fn dev_fee_receiver(&self) -> Address {
        self.config.dev_fee_receiver
    }

    pub fn staking_asset(&self) -> Address {
        self.config.staking_asset
    }

    pub fn reward_asset(&self) -> Address {
        self.config.reward_asset
    }

    pub fn contract_start_time(&self) -> u64 {
        self.epochs.start_time()
    }

    pub fn last_rewarded_time(&self) -> u64 {
        self.epochs.last_rewarded_time()
    }

    pub fn current_epoch(&self) -> EpochIndex {
        self.epochs.current_index()
    }

    pub fn total_staked(&self) -> Wei {
        self.stakes.total_staked()
    }

    pub fn user_total_staked(&self, user: &Address) -> Wei {
        self.stakes.staked(user)
    }

    /// Start time of `user`'s current position (0 if never staked).
    pub fn user_started_time(&self, user: &Address) -> u64 {
        self.stakes.record(user).map(|r| r.started_time).unwrap_or(0)
    }

    pub fn position(&self, user: &Address) -> Option<&StakeRecord> {
        self.stakes.record(user)
    }

    /// Fee income of the epoch containing `ts`.
    pub fn epoch_reward(&self, ts: u64) -> Wei {
        self.epochs.epoch_reward(ts, self.config.reward_period)
    }

    /// Total stake recorded in the epoch containing `ts`. Skipped periods
    /// and periods past the open epoch report the stake carried into them.
    pub fn epoch_total_staked(&self, ts: u64) -> Wei {
        self.epochs
            .carried_at(ts)
            .map(|e| e.total_staked)
            .unwrap_or(0)
    }

    /// `user`'s stake recorded in the epoch containing `ts`.
    pub fn user_epoch_staked(&self, user: &Address, ts: u64) -> Wei {
        let Some(epoch) = self.epochs.carried_at(ts) else {
            return 0;
        };
        self.stakes
            .record(user)
            .map(|r| r.position_at(epoch.index))
            .unwrap_or(0)
    }

    /// The open epoch as it would close at `now`, if its period has elapsed.
    fn elapsed_preview(&self, now: u64) -> Option<EpochAccumulator> {
        let period = self.config.reward_period;
        self.epochs.is_elapsed(now, period).then(|| {
            self.epochs
                .current()
                .preview_closed(self.epochs.open_end(period), self.config.dev_fee_bps)
        })
    }

    fn plan_for(&self, record: &StakeRecord, now: u64) -> ClaimPlan {
        let preview = self.elapsed_preview(now);
        let next_open = match &preview {
            Some(p) => p.index + 1,
            None => self.epochs.current_index(),
        };
        plan_claim(
            record,
            self.epochs.closed_from(record.next_unclaimed).chain(preview.iter()),
            next_open,
        )
    }

    /// Reward `user` would receive from a claim at `now`.
    pub fn pending_reward(&self, user: &Address, now: u64) -> Wei {
        self.stakes
            .record(user)
            .map(|r| self.plan_for(r, now).reward())
            .unwrap_or(0)
    }

    pub fn position_view(&self, user: &Address, now: u64) -> Option<PositionView> {
        self.stakes.record(user).map(|record| PositionView {
            record: record.clone(),
            pending_reward: self.plan_for(record, now).reward(),
        })
    }

    pub fn info(&self) -> VaultInfo {
        VaultInfo {
            address: self.address,
            governance: self.governance.principal(),
            config: self.config.clone(),
            contract_start_time: self.contract_start_time(),
            last_rewarded_time: self.last_rewarded_time(),
            current_epoch: self.current_epoch(),
            total_staked: self.total_staked(),
            active_stakers: self.stakes.active_stakers(),
        }
    }

    // -----------------------------------------------------------------------
    // Epoch progression
    // -----------------------------------------------------------------------

    /// Close the open epoch if its period has elapsed by `now`.
    pub fn sync(&mut self, now: u64) -> Option<EpochIndex> {
        self.epochs
            .sync(now, self.config.reward_period, self.config.dev_fee_bps)
    }

    // -----------------------------------------------------------------------
    // Stake ledger
    // -----------------------------------------------------------------------

    /// Pull `amount` of the staking asset from `staker` and add it to their
    /// position in the current epoch.
    ///
    /// # Errors
    /// `InvalidAmount` for zero, `TransferFailed` if the staking asset is not
    /// configured or the pull fails (balance or allowance).
    pub fn stake(
        &mut self,
        staker: Address,
        amount: Wei,
        staking_asset: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<EpochIndex, NeonError> {
        if amount == 0 {
            return Err(NeonError::InvalidAmount("cannot stake zero".to_string()));
        }
        self.config.ensure_staking_asset(&staking_asset.address())?;
        self.sync(now);

        staking_asset
            .transfer_from(self.address, staker, self.address, amount)
            .map_err(transfer_failed)?;

        let epoch = self.epochs.current_index();
        let before = self.stakes.staked(&staker);
        let opening = self.stakes.opening_position(&staker, epoch);
        self.stakes.deposit(staker, amount, epoch, now);
        self.epochs
            .update_stake(before, self.stakes.staked(&staker), opening);
        tracing::info!(
            "Staked {} wei for {} in epoch {} (total staked {} wei)",
            amount,
            staker,
            epoch,
            self.stakes.total_staked()
        );
        Ok(epoch)
    }

    /// Return `amount` of the staking asset to `staker`.
    ///
    /// # Errors
    /// `InvalidAmount` for zero, `InsufficientStake` above the position,
    /// `TransferFailed` if the staking asset is not configured.
    pub fn withdraw(
        &mut self,
        staker: Address,
        amount: Wei,
        staking_asset: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<EpochIndex, NeonError> {
        if amount == 0 {
            return Err(NeonError::InvalidAmount("cannot withdraw zero".to_string()));
        }
        self.config.ensure_staking_asset(&staking_asset.address())?;
        self.stakes.check_withdraw(&staker, amount)?;
        self.sync(now);

        staking_asset
            .transfer(self.address, staker, amount)
            .map_err(transfer_failed)?;

        let epoch = self.epochs.current_index();
        let before = self.stakes.staked(&staker);
        let opening = self.stakes.opening_position(&staker, epoch);
        self.stakes.withdraw(&staker, amount, epoch);
        self.epochs
            .update_stake(before, self.stakes.staked(&staker), opening);
        tracing::info!(
            "Withdrew {} wei for {} in epoch {} (total staked {} wei)",
            amount,
            staker,
            epoch,
            self.stakes.total_staked()
        );
        Ok(epoch)
    }

    // -----------------------------------------------------------------------
    // Reward accountant
    // -----------------------------------------------------------------------

    /// Pay `staker` their share of every closed, unclaimed epoch.
    ///
    /// Developer cuts of those epochs are paid alongside when the receiver is
    /// set; otherwise they stay owed. Returns a zero receipt when nothing is
    /// claimable.
    pub fn get_reward(
        &mut self,
        staker: Address,
        reward_asset: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<ClaimReceipt, NeonError> {
        self.config.ensure_reward_asset(&reward_asset.address())?;
        self.sync(now);

        let Some(record) = self.stakes.record(&staker) else {
            return Ok(ClaimReceipt {
                staker,
                reward: 0,
                dev_fee_paid: 0,
                epochs: Vec::new(),
            });
        };
        let mut plan = self.plan_for(record, now);
        let receiver = self.config.dev_fee_receiver;
        if receiver.is_zero() {
            plan.dev_cuts.clear();
        }

        let reward = plan.reward();
        let dev_total = plan.dev_total();
        let held = reward_asset.balance_of(&self.address);
        if held < reward + dev_total {
            return Err(NeonError::TransferFailed(format!(
                "vault holds {} wei, claim needs {} wei",
                held,
                reward + dev_total
            )));
        }

        if dev_total > 0 {
            reward_asset
                .transfer(self.address, receiver, dev_total)
                .map_err(transfer_failed)?;
        }
        if reward > 0 {
            reward_asset
                .transfer(self.address, staker, reward)
                .map_err(transfer_failed)?;
        }

        for payout in &plan.payouts {
            if let Some(epoch) = self.epochs.closed_mut(payout.epoch) {
                epoch.claimed += payout.share;
            }
        }
        for cut in &plan.dev_cuts {
            if let Some(epoch) = self.epochs.closed_mut(cut.epoch) {
                epoch.dev_fee_paid = true;
            }
        }
        if let Some(record) = self.stakes.record_mut(&staker) {
            record.next_unclaimed = plan.next_unclaimed;
            record.compact(plan.next_unclaimed);
        }

        if reward > 0 || dev_total > 0 {
            tracing::info!(
                "Claim by {}: {} wei over {} epoch(s), dev fee {} wei",
                staker,
                reward,
                plan.payouts.len(),
                dev_total
            );
        }
        Ok(ClaimReceipt {
            staker,
            reward,
            dev_fee_paid: dev_total,
            epochs: plan.payouts.iter().map(|p| p.epoch).collect(),
        })
    }

    /// Claim everything, then withdraw the whole position.
    pub fn exit(
        &mut self,
        staker: Address,
        staking_asset: &mut dyn TokenLedger,
        reward_asset: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<(ClaimReceipt, Wei), NeonError> {
        let amount = self.stakes.staked(&staker);
        if amount == 0 {
            return Err(NeonError::InvalidState(format!("{} has nothing staked", staker)));
        }
        self.config.ensure_staking_asset(&staking_asset.address())?;
        if staking_asset.balance_of(&self.address) < amount {
            return Err(NeonError::TransferFailed(
                "vault does not hold the staked amount".to_string(),
            ));
        }

        let receipt = self.get_reward(staker, reward_asset, now)?;
        self.withdraw(staker, amount, staking_asset, now)?;
        Ok((receipt, amount))
    }

    /// Pay every owed developer cut of a closed, staked epoch to the receiver.
    pub fn collect_dev_fees(
        &mut self,
        caller: &Address,
        reward_asset: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<Wei, NeonError> {
        self.governance.ensure(caller)?;
        let receiver = self.config.dev_fee_receiver;
        if receiver.is_zero() {
            return Err(NeonError::InvalidState(
                "dev fee receiver is not configured".to_string(),
            ));
        }
        self.config.ensure_reward_asset(&reward_asset.address())?;
        self.sync(now);

        let cuts = unpaid_dev_cuts(self.epochs.closed_from(0));
        let total: Wei = cuts.iter().map(|c| c.amount).sum();
        if total == 0 {
            return Ok(0);
        }
        reward_asset
            .transfer(self.address, receiver, total)
            .map_err(transfer_failed)?;
        for cut in &cuts {
            if let Some(epoch) = self.epochs.closed_mut(cut.epoch) {
                epoch.dev_fee_paid = true;
            }
        }
        tracing::info!(
            "Collected {} wei of dev fees over {} epoch(s) to {}",
            total,
            cuts.len(),
            receiver
        );
        Ok(total)
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Change the epoch length. Epochs already elapsed close under the old
    /// period first; the open epoch and its successors use the new one. If
    /// the new period has already run out for the open epoch, it closes at
    /// `now` so income it received keeps its epoch.
    pub fn change_reward_period(
        &mut self,
        caller: &Address,
        period: u64,
        now: u64,
    ) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        VaultConfig::check_period(period)?;
        self.sync(now);
        let old = self.config.reward_period;
        self.config.reward_period = period;
        if self.epochs.is_elapsed(now, period) {
            self.epochs.close_at(now, self.config.dev_fee_bps);
        }
        tracing::info!("Reward period changed: {}s -> {}s", old, period);
        Ok(())
    }

    /// Change the dev fee. Applies to epochs that close after the change.
    pub fn change_dev_fee(&mut self, caller: &Address, bps: u16, now: u64) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        VaultConfig::check_dev_fee(bps)?;
        self.sync(now);
        let old = self.config.dev_fee_bps;
        self.config.dev_fee_bps = bps;
        tracing::info!("Dev fee changed: {} bps -> {} bps", old, bps);
        Ok(())
    }

    pub fn change_dev_fee_receiver(&mut self, caller: &Address, receiver: Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        tracing::info!(
            "Dev fee receiver changed: {} -> {}",
            self.config.dev_fee_receiver,
            receiver
        );
        self.config.dev_fee_receiver = receiver;
        Ok(())
    }

    /// Set the liquidity-pool token accepted for staking.
    pub fn change_staking_asset(&mut self, caller: &Address, asset: Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        if self.stakes.total_staked() > 0 && asset != self.config.staking_asset {
            tracing::warn!(
                "Staking asset changed to {} while {} wei of {} is staked",
                asset,
                self.stakes.total_staked(),
                self.config.staking_asset
            );
        }
        tracing::info!(
            "Staking asset changed: {} -> {}",
            self.config.staking_asset,
            asset
        );
        self.config.staking_asset = asset;
        Ok(())
    }

    /// Set the fee-bearing token paid out as reward.
    pub fn change_reward_asset(&mut self, caller: &Address, asset: Address) -> Result<(), NeonError> {
        self.governance.ensure(caller)?;
        tracing::info!(
            "Reward asset changed: {} -> {}",
            self.config.reward_asset,
            asset
        );
        self.config.reward_asset = asset;
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), NeonError> {
        self.governance.transfer_ownership(caller, new_owner)
    }

    pub fn nominate_owner(&mut self, caller: &Address, candidate: Address) -> Result<(), NeonError> {
        self.governance.nominate(caller, candidate)
    }

    pub fn accept_ownership(&mut self, caller: &Address) -> Result<(), NeonError> {
        self.governance.accept(caller)
    }
}

impl FeeSink for NeonVault {
    fn fee_address(&self) -> Address {
        self.address
    }

    fn record_fee_income(&mut self, amount: Wei, now: u64) -> Result<EpochIndex, NeonError> {
        self.sync(now);
        let epoch = self.epochs.credit_income(amount);
        tracing::debug!("Fee income {} wei credited to epoch {}", amount, epoch);
        Ok(epoch)
    }
}
