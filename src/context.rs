use std::{
    fmt,
    time::Duration,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`Context`] is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Done {
    Canceled,
    DeadlineExceeded,
}

impl fmt::Display for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Done::Canceled => f.write_str("context canceled"),
            Done::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Cancellation and deadline signal handed to every submission.
///
/// Cloning is cheap and clones observe the same token. A deadline, once set,
/// is fixed for the lifetime of the context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done.
    pub fn background() -> Self {
        Default::default()
    }

    /// A context that is done once the returned token is cancelled.
    pub fn with_cancel() -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        let ctx = Self {
            token: token.clone(),
            deadline: None,
        };
        (ctx, token)
    }

    /// Observe an existing token, e.g. one owned by a shutdown handler.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// Derive a context that is additionally done at `deadline`. An earlier
    /// deadline already present on `self` is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<Done> {
        if self.token.is_cancelled() {
            Some(Done::Canceled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(Done::DeadlineExceeded)
        } else {
            None
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Done {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Done::Canceled,
                    _ = tokio::time::sleep_until(deadline) => Done::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                Done::Canceled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_is_never_done() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        let res = tokio::time::timeout(Duration::from_millis(20), ctx.done()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn cancel_marks_done() {
        let (ctx, token) = Context::with_cancel();
        assert!(!ctx.is_done());
        token.cancel();
        assert_eq!(ctx.err(), Some(Done::Canceled));
        assert_eq!(ctx.done().await, Done::Canceled);
    }

    #[tokio::test]
    async fn deadline_marks_done() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.done().await, Done::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(Done::DeadlineExceeded));
    }

    #[tokio::test]
    async fn derived_contexts_follow_their_parent() {
        let (parent, token) = Context::with_cancel();
        let child = parent.with_timeout(Duration::from_secs(60));
        token.cancel();
        assert_eq!(child.err(), Some(Done::Canceled));
    }

    #[tokio::test]
    async fn earlier_deadline_wins() {
        let ctx = Context::background().with_timeout(Duration::from_millis(5));
        let later = ctx.with_timeout(Duration::from_secs(60));
        assert_eq!(later.deadline(), ctx.deadline());
    }

    #[tokio::test]
    async fn external_token_is_observed() {
        let token = CancellationToken::new();
        let ctx = Context::from_token(token.clone());
        assert_eq!(ctx.err(), None);
        token.cancel();
        assert!(ctx.is_done());
    }

    #[test]
    fn done_reasons_are_distinguishable() {
        assert!(Done::Canceled.to_string().contains("canceled"));
        assert!(Done::DeadlineExceeded.to_string().contains("deadline"));
    }
}
