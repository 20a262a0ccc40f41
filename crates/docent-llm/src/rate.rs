//! Minimum-interval gate between outbound API calls.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Enforces a floor on the delay between successive calls.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Sleeps out the remainder of the interval since the previous call,
    /// then stamps the current time.
    pub async fn wait(&self) {
        let remaining = {
            let last_call = self
                .last_call
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            last_call.map(|last| self.min_interval.saturating_sub(last.elapsed()))
        };

        if let Some(remaining) = remaining
            && !remaining.is_zero()
        {
            tracing::debug!(?remaining, "rate limiting before next API call");
            tokio::time::sleep(remaining).await;
        }

        let mut last_call = self
            .last_call
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let gate = RateGate::new(Duration::from_secs(5));
        let start = Instant::now();
        gate.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn second_call_waits_out_the_interval() {
        let gate = RateGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.wait().await;
        gate.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn elapsed_interval_skips_the_sleep() {
        let gate = RateGate::new(Duration::from_millis(50));
        gate.wait().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let start = Instant::now();
        gate.wait().await;
        assert!(start.elapsed() < Duration::from_millis(40));
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let gate = RateGate::new(Duration::ZERO);
        let start = Instant::now();
        gate.wait().await;
        gate.wait().await;
        gate.wait().await;
        assert!(start.elapsed() < Duration::from_millis(40));
    }
}
