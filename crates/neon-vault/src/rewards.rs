// crates/neon-vault/src/rewards.rs
//
// Epoch reward accounting.
//
// For every closed epoch a staker was staked through:
//   1. distributable = floor(income * (10000 - devFee) / 10000)
//   2. share         = floor(distributable * slice / eligibleStaked)
//   3. devCut        = income - distributable, paid once per epoch on the
//                      first claim against it (or by governance collection).
//
// Truncation dust stays in the vault. Epochs nobody was staked through
// contribute nothing to anyone.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{Address, EpochIndex, Wei};

use crate::epoch::EpochAccumulator;
use crate::stake::StakeRecord;

/// A staker's reward from one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochPayout {
    pub epoch: EpochIndex,
    #[serde(with = "wei_string")]
    pub slice: Wei,
    #[serde(with = "wei_string")]
    pub share: Wei,
}

/// A developer cut that becomes due with a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevCut {
    pub epoch: EpochIndex,
    #[serde(with = "wei_string")]
    pub amount: Wei,
}

/// Everything a claim would pay, computed without mutating state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPlan {
    pub payouts: Vec<EpochPayout>,
    pub dev_cuts: Vec<DevCut>,
    /// First epoch left unclaimed after this claim.
    pub next_unclaimed: EpochIndex,
}

impl ClaimPlan {
    /// Total paid to the staker.
    pub fn reward(&self) -> Wei {
        self.payouts.iter().map(|p| p.share).sum()
    }

    /// Total paid to the developer fee receiver.
    pub fn dev_total(&self) -> Wei {
        self.dev_cuts.iter().map(|c| c.amount).sum()
    }
}

/// Outcome of a settled claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub staker: Address,
    #[serde(with = "wei_string")]
    pub reward: Wei,
    #[serde(with = "wei_string")]
    pub dev_fee_paid: Wei,
    pub epochs: Vec<EpochIndex>,
}

/// Plan a claim for `record` over `epochs`.
///
/// `epochs` must yield closed epochs in ascending index order, starting at or
/// after `record.next_unclaimed`. `next_open` is the index of the open epoch,
/// which the claim pointer advances to.
pub fn plan_claim<'a, I>(record: &StakeRecord, epochs: I, next_open: EpochIndex) -> ClaimPlan
where
    I: IntoIterator<Item = &'a EpochAccumulator>,
{
    let mut plan = ClaimPlan {
        next_unclaimed: record.next_unclaimed.max(next_open),
        ..ClaimPlan::default()
    };

    for epoch in epochs {
        if !epoch.is_closed() || epoch.index < record.next_unclaimed {
            continue;
        }
        let slice = record.slice_at(epoch.index);
        if slice == 0 || epoch.eligible_staked == 0 {
            continue;
        }
        let share = epoch.share_of(slice);
        if share > 0 {
            plan.payouts.push(EpochPayout {
                epoch: epoch.index,
                slice,
                share,
            });
        }
        let cut = epoch.dev_cut();
        if !epoch.dev_fee_paid && cut > 0 {
            plan.dev_cuts.push(DevCut {
                epoch: epoch.index,
                amount: cut,
            });
        }
    }
    plan
}

/// Developer cuts still owed across `epochs`.
pub fn unpaid_dev_cuts<'a, I>(epochs: I) -> Vec<DevCut>
where
    I: IntoIterator<Item = &'a EpochAccumulator>,
{
    epochs
        .into_iter()
        .filter(|e| e.is_closed() && !e.dev_fee_paid)
        .filter_map(|e| {
            let amount = e.dev_cut();
            (amount > 0).then_some(DevCut {
                epoch: e.index,
                amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::EpochBook;
    use crate::stake::StakeBook;
    use neon_core::WEI_PER_NEON;

    const DAY: u64 = 86_400;

    fn alice() -> Address {
        Address::repeat(1)
    }

    fn bob() -> Address {
        Address::repeat(2)
    }

    /// Alice (`a`) and bob (`b`) stake in epoch 0; epoch 1 earns `income`
    /// and closes with both held throughout.
    fn fixture(income: Wei, a: Wei, b: Wei) -> (EpochBook, StakeBook) {
        let mut epochs = EpochBook::new(0);
        let mut stakes = StakeBook::new();
        for (who, amount) in [(alice(), a), (bob(), b)] {
            if amount > 0 {
                stakes.deposit(who, amount, 0, 0);
                epochs.update_stake(0, amount, 0);
            }
        }
        epochs.sync(DAY, DAY, 400);
        epochs.credit_income(income);
        epochs.sync(2 * DAY, DAY, 400);
        (epochs, stakes)
    }

    #[test]
    fn test_single_staker_gets_distributable() {
        let (epochs, stakes) = fixture(WEI_PER_NEON, 1_000 * WEI_PER_NEON, 0);
        let plan = plan_claim(stakes.record(&alice()).unwrap(), epochs.closed_from(0), 2);
        assert_eq!(plan.reward(), WEI_PER_NEON * 96 / 100);
        assert_eq!(plan.dev_total(), WEI_PER_NEON * 4 / 100);
        assert_eq!(plan.payouts.len(), 1);
        assert_eq!(plan.payouts[0].epoch, 1);
        assert_eq!(plan.next_unclaimed, 2);
    }

    #[test]
    fn test_pro_rata_split() {
        let income = 10 * WEI_PER_NEON;
        let (epochs, stakes) = fixture(income, 300 * WEI_PER_NEON, 100 * WEI_PER_NEON);
        let a = plan_claim(stakes.record(&alice()).unwrap(), epochs.closed_from(0), 2);
        let b = plan_claim(stakes.record(&bob()).unwrap(), epochs.closed_from(0), 2);

        let distributable = income * 9_600 / 10_000;
        assert_eq!(a.reward(), distributable * 3 / 4);
        assert_eq!(b.reward(), distributable / 4);
        assert!(a.reward() + b.reward() <= distributable);
    }

    #[test]
    fn test_open_epoch_pays_nothing() {
        let mut epochs = EpochBook::new(0);
        let mut stakes = StakeBook::new();
        epochs.credit_income(5 * WEI_PER_NEON / 10);
        stakes.deposit(alice(), 1_000 * WEI_PER_NEON, 0, 10);
        epochs.update_stake(0, 1_000 * WEI_PER_NEON, 0);

        let plan = plan_claim(
            stakes.record(&alice()).unwrap(),
            std::iter::once(epochs.current()),
            0,
        );
        assert_eq!(plan.reward(), 0);
        assert!(plan.dev_cuts.is_empty());
        assert_eq!(plan.next_unclaimed, 0);
    }

    #[test]
    fn test_paid_dev_cut_not_repeated() {
        let (mut epochs, stakes) = fixture(WEI_PER_NEON, 100, 100);
        epochs.closed_mut(1).unwrap().dev_fee_paid = true;
        let plan = plan_claim(stakes.record(&bob()).unwrap(), epochs.closed_from(0), 2);
        assert!(plan.dev_cuts.is_empty());
        assert!(plan.reward() > 0);
    }

    #[test]
    fn test_claimed_epochs_are_skipped() {
        let (epochs, mut stakes) = fixture(WEI_PER_NEON, 100, 0);
        stakes.record_mut(&alice()).unwrap().next_unclaimed = 2;
        let plan = plan_claim(stakes.record(&alice()).unwrap(), epochs.closed_from(0), 2);
        assert_eq!(plan.reward(), 0);
    }

    #[test]
    fn test_stake_added_in_epoch_earns_from_next() {
        let mut epochs = EpochBook::new(0);
        let mut stakes = StakeBook::new();
        epochs.credit_income(WEI_PER_NEON);
        stakes.deposit(alice(), 1_000, 0, DAY - 1);
        epochs.update_stake(0, 1_000, 0);
        epochs.sync(DAY, DAY, 400);

        let closed = epochs.get(0).unwrap();
        assert_eq!(closed.eligible_staked, 0);
        let plan = plan_claim(stakes.record(&alice()).unwrap(), epochs.closed_from(0), 1);
        assert_eq!(plan.reward(), 0);
        assert!(plan.dev_cuts.is_empty());
    }

    #[test]
    fn test_unpaid_dev_cuts() {
        let (epochs, _) = fixture(10_000, 100, 0);
        let cuts = unpaid_dev_cuts(epochs.closed_from(0));
        assert_eq!(cuts, vec![DevCut { epoch: 1, amount: 400 }]);

        let (empty, _) = fixture(10_000, 0, 0);
        assert!(unpaid_dev_cuts(empty.closed_from(0)).is_empty());
    }
}
