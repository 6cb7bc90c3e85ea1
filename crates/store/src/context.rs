//! Per-lookup deadlines and cancellation.

use crate::error::{ErrorKind, Result};
use std::future::{Future, pending};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Bounds how long a single lookup is allowed to run.
///
/// Every resolver operation takes one of these from its caller. A context
/// with neither a deadline nor a token never interrupts anything; that is
/// what [`Context::background()`] gives you.
///
/// # Examples
///
/// ```
/// use exhibit_store::Context;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = Context::background()
///     .with_timeout(Duration::from_millis(250))
///     .with_cancellation(token.clone());
/// assert!(ctx.deadline().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    token: Option<CancellationToken>,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    /// Fail the lookup with [`ErrorKind::DeadlineExceeded`] once `deadline` passes.
    ///
    /// If a deadline is already set, the earlier of the two wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Fail the lookup with [`ErrorKind::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Return an error if this context has already ended.
    pub fn check(&self) -> Result<()> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            exn::bail!(ErrorKind::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            exn::bail!(ErrorKind::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless this context ends first.
    ///
    /// A context that has already ended never polls `fut` at all. When the
    /// context ends mid-flight `fut` is dropped, which for `sqlx` means the
    /// query is abandoned and its connection goes back to the pool.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending().await,
            }
        };
        tokio::select! {
            biased;
            () = cancelled => exn::bail!(ErrorKind::Cancelled),
            () = expired => exn::bail!(ErrorKind::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn instant_answer() -> Result<u8> {
        Ok(42)
    }

    #[tokio::test]
    async fn test_background_never_interrupts() {
        let answer = Context::background().run(instant_answer()).await.unwrap();
        assert_eq!(answer, 42);
    }

    #[tokio::test]
    async fn test_expired_deadline_fails_before_polling() {
        let ctx = Context::background().with_deadline(Instant::now());
        let err = ctx.run(instant_answer()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_before_polling() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::background().with_cancellation(token);
        let err = ctx.run(instant_answer()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_deadline_interrupts_slow_future() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_slow_future() {
        let token = CancellationToken::new();
        let ctx = Context::background().with_cancellation(token.clone());
        let canceller = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        };
        let slow = ctx.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        });
        let (result, ()) = tokio::join!(slow, canceller);
        assert_eq!(*result.unwrap_err(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_earliest_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(10))
            .with_deadline(now + Duration::from_secs(1));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
