//! Request-scoped cancellation and deadlines
//!
//! Every port method and network-bound service entry point takes a
//! [`CallContext`]. Adapters wrap their I/O in [`CallContext::run`] so a
//! cancelled or expired call aborts promptly with
//! [`CadenceError::Cancelled`].

use std::future::Future;
use std::time::Duration;

use cadence_domain::{CadenceError, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline for one logical call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context that never expires on its own
    pub fn new() -> Self {
        Self::default()
    }

    /// Context bound to an existing cancellation token
    pub const fn with_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { token: CancellationToken::new(), deadline: Some(Instant::now() + timeout) }
    }

    /// Child context sharing this context's cancellation. The tighter of
    /// the two deadlines wins.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self { token: self.token.child_token(), deadline: Some(deadline) }
    }

    /// Cancel this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancelled explicitly or past the deadline
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Instant after which calls fail with `Cancelled`
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Underlying token, for `select!` loops that need it directly
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail fast when the context is already done.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(CadenceError::Cancelled("operation cancelled".to_string()));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CadenceError::Cancelled("deadline exceeded".to_string()));
        }
        Ok(())
    }

    /// Race `fut` against cancellation and the deadline.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                Err(CadenceError::Cancelled("operation cancelled".to_string()))
            }
            () = deadline => Err(CadenceError::Cancelled("deadline exceeded".to_string())),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_passes_through_result() {
        let ctx = CallContext::new();
        let value = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = CallContext::new();
        ctx.cancel();

        let err = ctx.run(async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, CadenceError::Cancelled(_)));
    }

    #[tokio::test]
    async fn deadline_interrupts_slow_future() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));

        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, CadenceError::Cancelled("deadline exceeded".to_string()));
    }

    #[tokio::test]
    async fn child_inherits_parent_cancellation() {
        let parent = CallContext::new();
        let child = parent.child_with_timeout(Duration::from_secs(60));

        parent.cancel();
        assert!(child.is_cancelled());
        assert!(child.check().is_err());
    }
}
