//! Settlement wait between dependent stages.
//!
//! Order fills and ledger credits land asynchronously relative to the
//! order acknowledgement, so the flow pauses briefly before re-reading
//! balances. The wait is a heuristic bound, not proof of settlement;
//! the next stage always re-reads the authoritative balance afterwards.

use std::time::Duration;
use tracing::debug;

/// Default pause after order submission.
pub const DEFAULT_SETTLE_WAIT: Duration = Duration::from_millis(1200);

/// Fixed, non-adaptive settlement pause.
#[derive(Debug, Clone, Copy)]
pub struct SettleWait {
    wait: Duration,
}

impl SettleWait {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn duration(&self) -> Duration {
        self.wait
    }

    /// Block the flow for the configured duration.
    pub async fn await_settlement(&self) {
        debug!(wait_ms = self.wait.as_millis() as u64, "Waiting for settlement");
        tokio::time::sleep(self.wait).await;
    }
}

impl Default for SettleWait {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_WAIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wait() {
        assert_eq!(SettleWait::default().duration(), Duration::from_millis(1200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_settlement_sleeps_configured_duration() {
        let wait = SettleWait::from_millis(500);
        let before = tokio::time::Instant::now();
        wait.await_settlement().await;
        assert!(before.elapsed() >= Duration::from_millis(500));
    }
}
