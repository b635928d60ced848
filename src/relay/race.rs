//! Cancellable, timed await
//!
//! Races one future against an idle timeout and a cancellation token, and
//! reports which of the three finished first.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Result of [`race`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The future resolved first
    Completed(T),
    /// The timeout elapsed before the future resolved
    TimedOut,
    /// The token was cancelled
    Cancelled,
}

impl<T> Outcome<T> {
    /// Whether the race ended by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// Await `fut` for at most `timeout`, giving up early if `token` is cancelled
///
/// Cancellation wins over a ready future. On timeout or cancellation `fut` is
/// dropped; pass `&mut` to a future (such as a `JoinHandle`) to keep it
/// pending across calls.
pub async fn race<F>(fut: F, timeout: Duration, token: &CancellationToken) -> Outcome<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Outcome::Cancelled,
        out = fut => Outcome::Completed(out),
        _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completed() {
        let token = CancellationToken::new();
        let outcome = race(async { 7 }, Duration::from_secs(1), &token).await;

        assert_eq!(outcome, Outcome::Completed(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out() {
        let token = CancellationToken::new();
        let outcome = race(std::future::pending::<()>(), Duration::from_secs(1), &token).await;

        assert_eq!(outcome, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_cancelled_wins() {
        let token = CancellationToken::new();
        token.cancel();

        let outcome = race(async { 7 }, Duration::from_secs(1), &token).await;
        assert!(outcome.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_future_survives_timeout() {
        let token = CancellationToken::new();
        let mut handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "late"
        });

        let first = race(&mut handle, Duration::from_secs(1), &token).await;
        assert!(matches!(first, Outcome::TimedOut));

        let second = race(&mut handle, Duration::from_secs(5), &token).await;
        assert!(matches!(second, Outcome::Completed(Ok("late"))));
    }
}
