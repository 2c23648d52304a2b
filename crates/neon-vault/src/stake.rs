// crates/neon-vault/src/stake.rs
//
// Stake ledger: per-staker positions in the staking asset.
//
// Each staker has one record. Its amount accumulates across stake calls and
// falls on withdrawal; a fully withdrawn record stays in place (emptied, not
// deleted) so unclaimed rewards from earlier epochs remain claimable.
//
// Reward eligibility is computed per epoch slice. A checkpoint is written for
// every epoch in which the position changed, holding the position at that
// epoch's close. The slice for epoch `e` is the smaller of the position when
// `e` opened and when it closed: stake added during an epoch first earns in
// the next one, while a withdrawal reduces the epoch it happens in.

use std::collections::BTreeMap;

use serde::Serialize;

use neon_core::units::wei_string;
use neon_core::{Address, EpochIndex, NeonError, Wei};

/// A staker's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeRecord {
    pub staker: Address,
    /// Epoch index of the first stake of the current position.
    pub start_epoch: EpochIndex,
    /// Unix time of the first stake of the current position.
    pub started_time: u64,
    /// Amount currently staked.
    #[serde(with = "wei_string")]
    pub amount: Wei,
    /// First epoch not yet claimed.
    pub next_unclaimed: EpochIndex,
    /// Position at the close of each epoch in which it changed.
    #[serde(skip)]
    checkpoints: BTreeMap<EpochIndex, Wei>,
}

impl StakeRecord {
    fn new(staker: Address, epoch: EpochIndex, now: u64) -> Self {
        Self {
            staker,
            start_epoch: epoch,
            started_time: now,
            amount: 0,
            next_unclaimed: epoch,
            checkpoints: BTreeMap::new(),
        }
    }

    /// Position at the close of `epoch` (the current amount for the open one).
    pub fn position_at(&self, epoch: EpochIndex) -> Wei {
        self.checkpoints
            .range(..=epoch)
            .next_back()
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    /// Position held when `epoch` opened.
    pub fn opening_position(&self, epoch: EpochIndex) -> Wei {
        epoch.checked_sub(1).map(|prev| self.position_at(prev)).unwrap_or(0)
    }

    /// Stake held through the whole of `epoch`, which earns its rewards.
    pub fn slice_at(&self, epoch: EpochIndex) -> Wei {
        self.opening_position(epoch).min(self.position_at(epoch))
    }

    /// Whether the position is empty.
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    fn checkpoint(&mut self, epoch: EpochIndex) {
        self.checkpoints.insert(epoch, self.amount);
    }

    /// Drop checkpoints no longer needed to answer `slice_at(e)` for `e >= from`.
    pub(crate) fn compact(&mut self, from: EpochIndex) {
        let Some(keep) = from.checked_sub(1) else {
            return;
        };
        let floor = self.checkpoints.range(..=keep).next_back().map(|(k, _)| *k);
        if let Some(floor) = floor {
            self.checkpoints.retain(|k, _| *k >= floor);
        }
    }
}

/// All staker positions plus the global total.
#[derive(Debug, Clone, Default)]
pub struct StakeBook {
    records: BTreeMap<Address, StakeRecord>,
    total_staked: Wei,
}

impl StakeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_staked(&self) -> Wei {
        self.total_staked
    }

    pub fn record(&self, staker: &Address) -> Option<&StakeRecord> {
        self.records.get(staker)
    }

    pub(crate) fn record_mut(&mut self, staker: &Address) -> Option<&mut StakeRecord> {
        self.records.get_mut(staker)
    }

    /// Amount currently staked by `staker`.
    pub fn staked(&self, staker: &Address) -> Wei {
        self.records.get(staker).map(|r| r.amount).unwrap_or(0)
    }

    /// Position `staker` held when `epoch` opened.
    pub fn opening_position(&self, staker: &Address, epoch: EpochIndex) -> Wei {
        self.records
            .get(staker)
            .map(|r| r.opening_position(epoch))
            .unwrap_or(0)
    }

    /// Number of stakers with a non-empty position.
    pub fn active_stakers(&self) -> usize {
        self.records.values().filter(|r| !r.is_empty()).count()
    }

    pub fn records(&self) -> impl Iterator<Item = &StakeRecord> {
        self.records.values()
    }

    /// Add `amount` to `staker`'s position in epoch `epoch`.
    ///
    /// Starts a fresh position (new start time and start epoch) when the
    /// staker holds nothing. Validation of the amount happens in the vault.
    pub(crate) fn deposit(&mut self, staker: Address, amount: Wei, epoch: EpochIndex, now: u64) {
        let record = self
            .records
            .entry(staker)
            .or_insert_with(|| StakeRecord::new(staker, epoch, now));
        if record.is_empty() {
            record.start_epoch = epoch;
            record.started_time = now;
        }
        record.amount += amount;
        record.checkpoint(epoch);
        self.total_staked += amount;
    }

    /// Fail unless `staker` can withdraw `amount`.
    pub fn check_withdraw(&self, staker: &Address, amount: Wei) -> Result<(), NeonError> {
        let available = self.staked(staker);
        if amount > available {
            return Err(NeonError::InsufficientStake {
                staker: *staker,
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Remove `amount` from `staker`'s position in epoch `epoch`.
    /// Callers must have run `check_withdraw` first.
    pub(crate) fn withdraw(&mut self, staker: &Address, amount: Wei, epoch: EpochIndex) {
        if let Some(record) = self.records.get_mut(staker) {
            record.amount = record.amount.saturating_sub(amount);
            record.checkpoint(epoch);
            self.total_staked = self.total_staked.saturating_sub(amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat(1)
    }

    #[test]
    fn test_first_deposit_sets_start() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 3, 1_000);
        let r = book.record(&alice()).unwrap();
        assert_eq!(r.amount, 100);
        assert_eq!(r.start_epoch, 3);
        assert_eq!(r.started_time, 1_000);
        assert_eq!(r.next_unclaimed, 3);
        assert_eq!(book.total_staked(), 100);
    }

    #[test]
    fn test_repeat_deposit_keeps_start() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 3, 1_000);
        book.deposit(alice(), 50, 5, 2_000);
        let r = book.record(&alice()).unwrap();
        assert_eq!(r.amount, 150);
        assert_eq!(r.started_time, 1_000);
        assert_eq!(r.position_at(2), 0);
        assert_eq!(r.position_at(3), 100);
        assert_eq!(r.position_at(5), 150);
        // Each addition first earns in the epoch after it was made.
        assert_eq!(r.slice_at(3), 0);
        assert_eq!(r.slice_at(4), 100);
        assert_eq!(r.slice_at(5), 100);
        assert_eq!(r.slice_at(6), 150);
        assert_eq!(r.slice_at(9), 150);
    }

    #[test]
    fn test_withdraw_checks_and_empties() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 0, 1_000);
        assert!(matches!(
            book.check_withdraw(&alice(), 101),
            Err(NeonError::InsufficientStake { available: 100, requested: 101, .. })
        ));
        book.withdraw(&alice(), 100, 2);
        let r = book.record(&alice()).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.slice_at(1), 100);
        assert_eq!(r.slice_at(2), 0);
        assert_eq!(r.slice_at(3), 0);
        assert_eq!(book.total_staked(), 0);
        assert_eq!(book.active_stakers(), 0);
    }

    #[test]
    fn test_restake_after_exit_resets_start() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 0, 1_000);
        book.withdraw(&alice(), 100, 1);
        book.deposit(alice(), 10, 4, 9_000);
        let r = book.record(&alice()).unwrap();
        assert_eq!(r.started_time, 9_000);
        assert_eq!(r.start_epoch, 4);
        assert_eq!(r.next_unclaimed, 0);
    }

    #[test]
    fn test_compact_preserves_slices() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 0, 0);
        book.deposit(alice(), 100, 2, 0);
        book.deposit(alice(), 100, 5, 0);
        let r = book.record_mut(&alice()).unwrap();
        r.compact(3);
        assert_eq!(r.slice_at(3), 200);
        assert_eq!(r.slice_at(4), 200);
        assert_eq!(r.slice_at(5), 200);
        assert_eq!(r.slice_at(6), 300);
        assert_eq!(r.checkpoints.len(), 2);
    }

    #[test]
    fn test_compact_keeps_opening_position() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 100, 0, 0);
        book.deposit(alice(), 100, 3, 0);
        let r = book.record_mut(&alice()).unwrap();
        r.compact(3);
        assert_eq!(r.opening_position(3), 100);
        assert_eq!(r.slice_at(3), 100);
        assert_eq!(r.slice_at(4), 200);
    }

    #[test]
    fn test_stake_just_before_close_earns_nothing_that_epoch() {
        let mut book = StakeBook::new();
        book.deposit(alice(), 1_000, 0, 86_399);
        book.withdraw(&alice(), 1_000, 1);
        let r = book.record(&alice()).unwrap();
        assert_eq!(r.slice_at(0), 0);
        assert_eq!(r.slice_at(1), 0);
        assert_eq!(book.opening_position(&alice(), 1), 1_000);
    }
}
