//! Bounded polling.
//!
//! The regenerator cannot observe task completion from the subprocess (its
//! output is discarded); the only signal is the artifact appearing on disk.
//! [`wait_for`] checks a predicate first and sleeps between checks, so a
//! condition that already holds is observed without waiting an interval.

use std::time::Duration;

use tokio::time::Instant;

/// Poll `observed` every `interval` until it returns true or `limit` elapses.
///
/// Returns whether the condition was observed. A zero `limit` never invokes
/// the predicate. Checks land at `0, interval, 2*interval, ...` strictly
/// before `limit`.
pub async fn wait_for<F>(mut observed: F, interval: Duration, limit: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < limit {
        if observed() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn already_true_returns_without_sleeping() {
        let start = Instant::now();
        assert!(wait_for(|| true, SECOND, Duration::from_secs(80)).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn observes_condition_on_later_check() {
        let mut calls = 0;
        let start = Instant::now();
        let observed = wait_for(
            || {
                calls += 1;
                calls == 3
            },
            SECOND,
            Duration::from_secs(80),
        )
        .await;
        assert!(observed);
        // Third check happens after two sleeps.
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_limit() {
        let mut calls = 0;
        let observed = wait_for(
            || {
                calls += 1;
                false
            },
            SECOND,
            Duration::from_secs(5),
        )
        .await;
        assert!(!observed);
        assert_eq!(calls, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_limit_never_checks() {
        let mut calls = 0;
        let observed = wait_for(
            || {
                calls += 1;
                true
            },
            SECOND,
            Duration::ZERO,
        )
        .await;
        assert!(!observed);
        assert_eq!(calls, 0);
    }
}
