// crates/neon-economics/src/router.rs
//
// Fee router: forwards each transfer's withheld fee into the vault's epoch
// book within the same operation that produced it.
//
// Only fees credited to the sink's own address are recorded as income. A fee
// credited anywhere else (the reward pool points away from the vault) stays
// with whoever received it and is counted as unrouted.

use serde::{Deserialize, Serialize};

use neon_core::units::wei_string;
use neon_core::{EpochIndex, FeeSink, NeonError, TransferReceipt, Wei};

/// Running totals of routed fee income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStats {
    /// Fee income recorded in the vault.
    #[serde(with = "wei_string")]
    pub routed: Wei,
    /// Number of transfers whose fee was recorded.
    pub events: u64,
    /// Fees credited to an address that is not the vault.
    #[serde(with = "wei_string")]
    pub unrouted: Wei,
}

#[derive(Debug, Clone, Default)]
pub struct FeeRouter {
    stats: RouterStats,
}

impl FeeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Record the fee carried by `receipt` in `sink` at `now`.
    ///
    /// Returns the epoch the income was stamped with, or `None` when the
    /// transfer carried no fee for this sink.
    pub fn route(
        &mut self,
        receipt: &TransferReceipt,
        sink: &mut dyn FeeSink,
        now: u64,
    ) -> Result<Option<EpochIndex>, NeonError> {
        if receipt.fee == 0 {
            return Ok(None);
        }
        match receipt.fee_recipient {
            Some(recipient) if recipient == sink.fee_address() => {
                let epoch = sink.record_fee_income(receipt.fee, now)?;
                self.stats.routed += receipt.fee;
                self.stats.events += 1;
                tracing::debug!(
                    "Routed {} wei fee from {} -> {} into epoch {}",
                    receipt.fee,
                    receipt.from,
                    receipt.to,
                    epoch
                );
                Ok(Some(epoch))
            }
            recipient => {
                self.stats.unrouted += receipt.fee;
                tracing::warn!(
                    "Fee of {} wei credited to {:?}, which is not the vault {}",
                    receipt.fee,
                    recipient,
                    sink.fee_address()
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_core::Address;

    struct Sink {
        address: Address,
        income: Vec<(Wei, u64)>,
    }

    impl FeeSink for Sink {
        fn fee_address(&self) -> Address {
            self.address
        }

        fn record_fee_income(&mut self, amount: Wei, now: u64) -> Result<EpochIndex, NeonError> {
            self.income.push((amount, now));
            Ok(now / 100)
        }
    }

    fn receipt(fee: Wei, recipient: Option<Address>) -> TransferReceipt {
        TransferReceipt {
            from: Address::repeat(1),
            to: Address::repeat(2),
            amount: 1_000,
            delivered: 1_000 - fee,
            fee,
            fee_recipient: recipient,
        }
    }

    #[test]
    fn test_routes_fee_to_sink() {
        let mut sink = Sink { address: Address::repeat(9), income: vec![] };
        let mut router = FeeRouter::new();
        let epoch = router
            .route(&receipt(10, Some(Address::repeat(9))), &mut sink, 250)
            .unwrap();
        assert_eq!(epoch, Some(2));
        assert_eq!(sink.income, vec![(10, 250)]);
        assert_eq!(router.stats().routed, 10);
        assert_eq!(router.stats().events, 1);
    }

    #[test]
    fn test_fee_free_transfer_is_ignored() {
        let mut sink = Sink { address: Address::repeat(9), income: vec![] };
        let mut router = FeeRouter::new();
        assert_eq!(router.route(&receipt(0, None), &mut sink, 1).unwrap(), None);
        assert!(sink.income.is_empty());
    }

    #[test]
    fn test_foreign_recipient_is_unrouted() {
        let mut sink = Sink { address: Address::repeat(9), income: vec![] };
        let mut router = FeeRouter::new();
        let epoch = router
            .route(&receipt(10, Some(Address::repeat(8))), &mut sink, 1)
            .unwrap();
        assert_eq!(epoch, None);
        assert!(sink.income.is_empty());
        assert_eq!(router.stats().unrouted, 10);
    }
}
