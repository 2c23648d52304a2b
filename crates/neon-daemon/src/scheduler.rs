// crates/neon-daemon/src/scheduler.rs
//
// Epoch scheduler for the NEON daemon.
//
// Epochs also close lazily on the next vault operation; the scheduler closes
// them on a timer so that views and logs stay current on an idle node.

use std::time::Duration;

use neon_core::EpochIndex;
use neon_economics::SharedEconomy;

/// Periodically closes elapsed reward epochs.
pub struct EpochScheduler {
    economy: SharedEconomy,
    tick: Duration,
    /// Number of epochs this scheduler has closed.
    closed: u64,
}

impl EpochScheduler {
    pub fn new(economy: SharedEconomy, tick_secs: u64) -> Self {
        Self {
            economy,
            tick: Duration::from_secs(tick_secs.max(1)),
            closed: 0,
        }
    }

    /// Run the scheduler loop until ctrl-c.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!("Epoch scheduler started (tick={}s)", self.tick.as_secs());

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Epoch scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.tick) => {
                    self.tick_once().await;
                }
            }
        }

        Ok(())
    }

    /// Close the open epoch if its period has elapsed.
    ///
    /// Returns the index of the epoch that closed, if any.
    pub async fn tick_once(&mut self) -> Option<EpochIndex> {
        let mut guard = self.economy.write().await;
        let closed = guard.sync();
        match closed {
            Some(index) => {
                self.closed += 1;
                tracing::info!(
                    "=== EPOCH {} CLOSED === (open epoch {}, {} wei staked, {} closed this run)",
                    index,
                    guard.vault().current_epoch(),
                    guard.vault().total_staked(),
                    self.closed
                );
            }
            None => tracing::trace!("Epoch {} still open", guard.vault().current_epoch()),
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use neon_core::ManualClock;
    use neon_economics::{shared, Economy, EconomyGenesis};

    const T0: u64 = 1_700_000_000;

    #[tokio::test]
    async fn test_tick_closes_elapsed_epochs_only() {
        let clock = Arc::new(ManualClock::new(T0));
        let economy = Economy::genesis(&EconomyGenesis::development(), clock.clone()).unwrap();
        let mut scheduler = EpochScheduler::new(shared(economy), 10);

        assert_eq!(scheduler.tick_once().await, None);

        clock.advance(86_400);
        assert_eq!(scheduler.tick_once().await, Some(0));
        assert_eq!(scheduler.tick_once().await, None);

        // Three idle periods collapse into one closure.
        clock.advance(3 * 86_400);
        assert_eq!(scheduler.tick_once().await, Some(1));
        assert_eq!(scheduler.closed, 2);
        assert_eq!(scheduler.economy.read().await.vault().current_epoch(), 4);
    }
}
