//! One-shot stop signal shared by the capture tasks.

use tokio_util::sync::CancellationToken;

/// A write-once stop signal: one transition from "unset" to "set",
/// observable by any number of tasks.
///
/// Clones share the same underlying signal. Carries no payload, only
/// the transition itself.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Transition to "set". Idempotent; repeated calls are no-ops.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// Poll the signal without blocking.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the signal is set. Completes immediately if it
    /// already is.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_is_idempotent() {
        let signal = StopSignal::new();
        assert!(!signal.is_set());
        signal.set();
        signal.set();
        assert!(signal.is_set());
    }

    #[tokio::test]
    async fn test_wait_completes_after_set() {
        let signal = StopSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.wait().await });
        signal.set();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_on_already_set_signal_returns_immediately() {
        let signal = StopSignal::new();
        signal.set();
        signal.wait().await;
    }

    #[tokio::test]
    async fn test_many_waiters_all_wake() {
        let signal = StopSignal::new();
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let waiter = signal.clone();
                tokio::spawn(async move { waiter.wait().await })
            })
            .collect();
        signal.set();
        for task in tasks {
            task.await.unwrap();
        }
    }
}
