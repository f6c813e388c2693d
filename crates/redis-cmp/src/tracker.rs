//! Join primitive for an incrementally announced number of batch workers.

use std::sync::Arc;
use tokio::sync::watch;

/// Counts outstanding units of work and lets one caller wait for zero.
///
/// Every [`announce`](Self::announce) returns a [`CompletionGuard`]; the unit is
/// finished when the guard is completed or dropped, so a worker that returns
/// early or panics still releases its unit.
#[derive(Clone)]
pub struct CompletionTracker {
    outstanding: Arc<watch::Sender<usize>>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            outstanding: Arc::new(tx),
        }
    }

    /// Record one more unit of outstanding work.
    pub fn announce(&self) -> CompletionGuard {
        self.outstanding.send_modify(|n| *n += 1);
        CompletionGuard {
            tracker: self.clone(),
            done: false,
        }
    }

    /// Number of announced units not yet finished.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Wait until every announced unit has finished. No timeout.
    pub async fn wait(&self) {
        let mut rx = self.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    fn finish(&self) {
        self.outstanding.send_modify(|n| *n -= 1);
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One announced unit of work. Finishes exactly once.
#[must_use = "dropping the guard immediately completes the unit"]
pub struct CompletionGuard {
    tracker: CompletionTracker,
    done: bool,
}

impl CompletionGuard {
    /// Mark this unit finished.
    pub fn complete(mut self) {
        self.finish_once();
    }

    fn finish_once(&mut self) {
        if !self.done {
            self.done = true;
            self.tracker.finish();
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.finish_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_immediately_when_idle() {
        let tracker = CompletionTracker::new();
        tracker.wait().await;
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_complete_and_drop_each_count_once() {
        let tracker = CompletionTracker::new();
        let a = tracker.announce();
        let b = tracker.announce();
        assert_eq!(tracker.outstanding(), 2);

        a.complete();
        assert_eq!(tracker.outstanding(), 1);
        drop(b);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_wait_blocks_until_all_complete() {
        let tracker = CompletionTracker::new();
        let finished = Arc::new(AtomicUsize::new(0));
        let n = 50;

        for i in 0..n {
            let guard = tracker.announce();
            let finished = finished.clone();
            tokio::spawn(async move {
                // Finish in reverse launch order.
                tokio::time::sleep(Duration::from_millis((n - i) as u64)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                guard.complete();
            });
        }

        tracker.wait().await;
        assert_eq!(finished.load(Ordering::SeqCst), n);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_panicking_worker_still_completes() {
        let tracker = CompletionTracker::new();
        let guard = tracker.announce();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("worker blew up");
        });

        assert!(handle.await.is_err());
        tracker.wait().await;
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_wait_not_released_early() {
        let tracker = CompletionTracker::new();
        let guard = tracker.announce();

        let waited = tokio::time::timeout(Duration::from_millis(20), tracker.wait()).await;
        assert!(waited.is_err(), "wait returned with work outstanding");

        guard.complete();
        tracker.wait().await;
    }
}
