//! Caller-side cancellation for throttle and back-off waits
//!
//! A [`CancelToken`] fires either when its [`CancelHandle`] is triggered or
//! when its optional deadline passes, whichever comes first. Tokens are cheap
//! to clone and every clone observes the same signal.

use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

/// Signal observed by the client while it waits
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Triggers the paired [`CancelToken`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelToken {
    /// Create a handle/token pair
    ///
    /// # Examples
    ///
    /// ```
    /// use lectern_llm::CancelToken;
    ///
    /// let (handle, token) = CancelToken::pair();
    /// assert!(!token.is_cancelled());
    /// handle.cancel();
    /// assert!(token.is_cancelled());
    /// ```
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx, deadline: None })
    }

    /// A token that never fires
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx, deadline: None }
    }

    /// A token that fires at `deadline`
    pub fn until(deadline: Instant) -> Self {
        Self::never().with_deadline(deadline)
    }

    /// A token that fires `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self::until(Instant::now() + timeout)
    }

    /// Add (or tighten) a deadline on this token
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Whether the token has already fired
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolve once the token fires; pending forever for [`CancelToken::never`]
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let signalled = async move {
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                // Handle dropped without cancelling: only the deadline can fire.
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = signalled => {}
                    _ = sleep_until(deadline) => {}
                }
            }
            None => signalled.await,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

impl CancelHandle {
    /// Fire every token paired with this handle
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
