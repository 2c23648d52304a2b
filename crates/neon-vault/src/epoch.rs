// crates/neon-vault/src/epoch.rs
//
// Epoch book: partitions elapsed time into reward epochs.
//
// Lifecycle: Open -> Closed. Exactly one epoch is open at a time. It closes
// when `reward_period` seconds have elapsed since it began; closure is a pure
// function of time and is applied lazily by `sync`. Closed epochs are kept in
// an append-only ordered map and never reopened.
//
// Epochs with no activity are not materialised. When several periods elapse
// at once the next open epoch gets the index and start time it would have
// had, so `index == floor((now - start_time) / period)` holds while the
// period is constant. A period change only affects the open epoch and its
// successors; closed epochs keep their recorded boundaries, and an open
// epoch cut short by a shorter period closes at the moment of the change.
//
// Each epoch tracks two stake totals. `total_staked` is the recorded
// position (every stake and withdrawal in the epoch moves it). Rewards are
// divided by `eligible_staked`: the sum over stakers of the smaller of their
// position when the epoch opened and their position now.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use neon_core::units::{mul_bps, mul_div, wei_string};
use neon_core::{EpochIndex, Wei, BPS_DENOMINATOR};

/// Fee income and stake participation of one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochAccumulator {
    pub index: EpochIndex,
    /// Unix time the epoch began.
    pub start_time: u64,
    /// Exclusive end, set when the epoch closes.
    pub end_time: Option<u64>,
    /// Fee income credited while the epoch was open.
    #[serde(with = "wei_string")]
    pub income: Wei,
    /// Total stake recorded in the epoch (position at close).
    #[serde(with = "wei_string")]
    pub total_staked: Wei,
    /// Stake held for the whole epoch; the pro-rata denominator.
    #[serde(with = "wei_string")]
    pub eligible_staked: Wei,
    /// Dev fee rate snapshotted at close.
    pub dev_fee_bps: Option<u16>,
    /// Whether the developer cut has been paid out.
    pub dev_fee_paid: bool,
    /// Staker rewards already paid from this epoch.
    #[serde(with = "wei_string")]
    pub claimed: Wei,
}

impl EpochAccumulator {
    fn open(index: EpochIndex, start_time: u64, total_staked: Wei) -> Self {
        Self {
            index,
            start_time,
            end_time: None,
            income: 0,
            total_staked,
            eligible_staked: total_staked,
            dev_fee_bps: None,
            dev_fee_paid: false,
            claimed: 0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Income left for stakers after the developer cut at `dev_fee_bps`.
    pub fn distributable_at(&self, dev_fee_bps: u16) -> Wei {
        mul_bps(self.income, BPS_DENOMINATOR - dev_fee_bps.min(BPS_DENOMINATOR))
    }

    /// Income left for stakers. Zero until closed, and zero for epochs
    /// nobody was staked through (their income is stranded).
    pub fn distributable(&self) -> Wei {
        match self.dev_fee_bps {
            Some(bps) if self.eligible_staked > 0 => self.distributable_at(bps),
            _ => 0,
        }
    }

    /// Developer cut owed for this epoch.
    pub fn dev_cut(&self) -> Wei {
        match self.dev_fee_bps {
            Some(bps) if self.eligible_staked > 0 => self.income - self.distributable_at(bps),
            _ => 0,
        }
    }

    /// Pro-rata share of the distributable income for a stake `slice`.
    pub fn share_of(&self, slice: Wei) -> Wei {
        if slice == 0 || self.eligible_staked == 0 {
            return 0;
        }
        mul_div(self.distributable(), slice, self.eligible_staked).unwrap_or(0)
    }

    /// This epoch as it will look once closed at `end_time` with `dev_fee_bps`.
    pub fn preview_closed(&self, end_time: u64, dev_fee_bps: u16) -> Self {
        let mut closed = self.clone();
        closed.end_time = Some(end_time);
        closed.dev_fee_bps = Some(dev_fee_bps);
        closed
    }
}

/// The vault's ordered record of epochs.
#[derive(Debug, Clone)]
pub struct EpochBook {
    /// Anchor of epoch-index arithmetic, fixed at deployment.
    start_time: u64,
    closed: BTreeMap<EpochIndex, EpochAccumulator>,
    /// Start time -> index of every closed epoch, for timestamp lookups.
    starts: BTreeMap<u64, EpochIndex>,
    open: EpochAccumulator,
}

impl EpochBook {
    /// Open epoch 0 at `start_time`.
    pub fn new(start_time: u64) -> Self {
        Self {
            start_time,
            closed: BTreeMap::new(),
            starts: BTreeMap::new(),
            open: EpochAccumulator::open(0, start_time, 0),
        }
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Start of the open epoch, i.e. the end of the last closed one.
    pub fn last_rewarded_time(&self) -> u64 {
        self.open.start_time
    }

    pub fn current(&self) -> &EpochAccumulator {
        &self.open
    }

    pub fn current_index(&self) -> EpochIndex {
        self.open.index
    }

    /// Exclusive end of the open epoch under `period`.
    pub fn open_end(&self, period: u64) -> u64 {
        self.open.start_time.saturating_add(period)
    }

    /// Whether the open epoch has run its full period by `now`.
    pub fn is_elapsed(&self, now: u64, period: u64) -> bool {
        now >= self.open_end(period)
    }

    /// Close the open epoch if its period has elapsed and open its successor.
    ///
    /// Returns the index of the epoch that closed, if any.
    pub fn sync(&mut self, now: u64, period: u64, dev_fee_bps: u16) -> Option<EpochIndex> {
        if period == 0 || !self.is_elapsed(now, period) {
            return None;
        }
        let end = self.open_end(period);
        let skipped = (now - end) / period;
        let next_start = end.saturating_add(skipped.saturating_mul(period));
        let next_index = self.open.index + 1 + skipped;

        let next = EpochAccumulator::open(next_index, next_start, self.open.total_staked);
        let mut finished = std::mem::replace(&mut self.open, next);
        finished.end_time = Some(end);
        finished.dev_fee_bps = Some(dev_fee_bps);

        let index = finished.index;
        tracing::info!(
            "Epoch {} closed: income {} wei, staked {} wei ({} eligible), {} empty epoch(s) skipped",
            index,
            finished.income,
            finished.total_staked,
            finished.eligible_staked,
            skipped
        );
        self.starts.insert(finished.start_time, index);
        self.closed.insert(index, finished);
        Some(index)
    }

    /// Close the open epoch at `now` and open its successor there.
    ///
    /// Used when a shorter period would put the open epoch's end before
    /// income it already holds. Returns `None` if the open epoch began at
    /// `now` and has nothing to close.
    pub fn close_at(&mut self, now: u64, dev_fee_bps: u16) -> Option<EpochIndex> {
        if now <= self.open.start_time {
            return None;
        }
        let next = EpochAccumulator::open(self.open.index + 1, now, self.open.total_staked);
        let mut finished = std::mem::replace(&mut self.open, next);
        finished.end_time = Some(now);
        finished.dev_fee_bps = Some(dev_fee_bps);

        let index = finished.index;
        tracing::info!(
            "Epoch {} closed early at {}: income {} wei, staked {} wei ({} eligible)",
            index,
            now,
            finished.income,
            finished.total_staked,
            finished.eligible_staked
        );
        self.starts.insert(finished.start_time, index);
        self.closed.insert(index, finished);
        Some(index)
    }

    /// Credit fee income to the open epoch.
    pub fn credit_income(&mut self, amount: Wei) -> EpochIndex {
        self.open.income = self.open.income.saturating_add(amount);
        self.open.index
    }

    /// Move one staker's position in the open epoch from `before` to
    /// `after`, given the position they held when the epoch opened.
    pub(crate) fn update_stake(&mut self, before: Wei, after: Wei, opening: Wei) {
        let open = &mut self.open;
        open.total_staked = open.total_staked.saturating_sub(before).saturating_add(after);
        open.eligible_staked = open
            .eligible_staked
            .saturating_sub(before.min(opening))
            .saturating_add(after.min(opening));
    }

    /// Look up an epoch by index, closed or open.
    pub fn get(&self, index: EpochIndex) -> Option<&EpochAccumulator> {
        if index == self.open.index {
            return Some(&self.open);
        }
        self.closed.get(&index)
    }

    pub(crate) fn closed_mut(&mut self, index: EpochIndex) -> Option<&mut EpochAccumulator> {
        self.closed.get_mut(&index)
    }

    /// The epoch containing timestamp `ts`, if one was materialised.
    ///
    /// Timestamps inside skipped (empty) epochs and timestamps beyond the
    /// open epoch's end resolve to `None`.
    pub fn epoch_at(&self, ts: u64, period: u64) -> Option<&EpochAccumulator> {
        if ts >= self.open.start_time {
            return (ts < self.open_end(period)).then_some(&self.open);
        }
        let (_, index) = self.starts.range(..=ts).next_back()?;
        let epoch = self.closed.get(index)?;
        match epoch.end_time {
            Some(end) if ts < end => Some(epoch),
            _ => None,
        }
    }

    /// The epoch whose closing position carries over to `ts`: the epoch
    /// containing it, or the last one before it when `ts` falls in a skipped
    /// period or past the open epoch's end.
    pub fn carried_at(&self, ts: u64) -> Option<&EpochAccumulator> {
        if ts < self.start_time {
            return None;
        }
        if ts >= self.open.start_time {
            return Some(&self.open);
        }
        let (_, index) = self.starts.range(..=ts).next_back()?;
        self.closed.get(index)
    }

    /// Fee income of the epoch containing `ts` (0 when none).
    pub fn epoch_reward(&self, ts: u64, period: u64) -> Wei {
        self.epoch_at(ts, period).map(|e| e.income).unwrap_or(0)
    }

    /// Closed epochs with index `>= from`, in order.
    pub fn closed_from(&self, from: EpochIndex) -> impl Iterator<Item = &EpochAccumulator> {
        self.closed.range(from..).map(|(_, e)| e)
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// The last `limit` epochs, newest first, including the open one.
    pub fn recent(&self, limit: usize) -> Vec<EpochAccumulator> {
        std::iter::once(&self.open)
            .chain(self.closed.values().rev())
            .take(limit)
            .cloned()
            .collect()
    }
}
