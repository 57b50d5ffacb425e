//! Cancellation tokens
//!
//! A controller owns a [`CancelHandle`]; every async operation it starts gets
//! a [`CancellationToken`] and checks it at each resumption point before
//! applying a result. Dropping the handle cancels, so results that arrive
//! after their owner is gone are discarded rather than written to stale state.

use crate::domain::{GodwitError, Result};
use tokio::sync::watch;

/// Owning side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Creates a token observing this handle
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Signals cancellation to every token
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

/// Observing side of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Fails with [`GodwitError::Cancelled`] once cancelled
    ///
    /// # Errors
    ///
    /// Returns [`GodwitError::Cancelled`] when the owner has gone away.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            tracing::debug!("Operation cancelled, discarding result");
            Err(GodwitError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves when cancellation is signalled; never resolves otherwise
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_observes_cancel() {
        let handle = CancelHandle::new();
        let token = handle.token();
        assert!(token.check().is_ok());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(GodwitError::Cancelled)));
    }

    #[test]
    fn test_drop_cancels() {
        let handle = CancelHandle::new();
        let token = handle.token();
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_never_is_not_cancelled() {
        assert!(!CancellationToken::never().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let handle = CancelHandle::new();
        let token = handle.token();

        let waiter = tokio::spawn(async move { token.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_never_does_not_resolve() {
        let token = CancellationToken::never();
        let result = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(result.is_err());
    }
}
