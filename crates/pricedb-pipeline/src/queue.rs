//! In-process work queue drained by a fixed pool of async workers.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::outcome::{ItemOutcome, RunSummary};

/// Sending half of a [`WorkerPool`]. Dropping it lets the workers drain the
/// queue and exit.
pub struct WorkQueue<T> {
    tx: mpsc::Sender<T>,
}

impl<T> WorkQueue<T> {
    /// Enqueues one item, waiting while the queue is full. Returns `false`
    /// if every worker has already exited.
    pub async fn push(&self, item: T) -> bool {
        self.tx.send(item).await.is_ok()
    }
}

/// Workers draining a shared queue, each keeping its own tally.
pub struct WorkerPool {
    workers: JoinSet<RunSummary>,
}

impl WorkerPool {
    /// Spawns `concurrency` workers (at least one) that call `handler` for
    /// every queued item.
    pub fn spawn<T, H, Fut>(concurrency: usize, handler: H) -> (WorkQueue<T>, WorkerPool)
    where
        T: Send + 'static,
        H: Fn(T) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ItemOutcome> + Send + 'static,
    {
        let concurrency = concurrency.max(1);
        let (tx, rx) = mpsc::channel::<T>(concurrency * 4);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for worker in 0..concurrency {
            let rx = Arc::clone(&rx);
            let handler = handler.clone();
            workers.spawn(async move {
                let mut tally = RunSummary::default();
                loop {
                    // Hold the lock only while waiting for the next item.
                    let next = rx.lock().await.recv().await;
                    let Some(item) = next else { break };
                    let outcome = AssertUnwindSafe(handler(item))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| {
                            let reason = panic_message(payload.as_ref());
                            tracing::error!(worker, %reason, "item handler panicked");
                            ItemOutcome::FailedPermanent {
                                reason: format!("handler panicked: {reason}"),
                            }
                        });
                    tally.record(&outcome);
                }
                tracing::debug!(worker, processed = tally.items_processed(), "worker drained");
                tally
            });
        }

        (WorkQueue { tx }, WorkerPool { workers })
    }

    /// Waits for every worker to finish and merges their tallies. Handler
    /// panics are already counted as failed items; a worker task that still
    /// terminates abnormally is logged and its tally is lost.
    pub async fn join(mut self) -> RunSummary {
        let mut total = RunSummary::default();
        while let Some(result) = self.workers.join_next().await {
            match result {
                Ok(tally) => total.merge_items(&tally),
                Err(e) => tracing::error!(error = %e, "worker task terminated abnormally"),
            }
        }
        total
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn every_item_is_handled_once() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let (queue, pool) = WorkerPool::spawn(3, move |n: u32| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if n % 5 == 0 {
                    ItemOutcome::SkippedMissingData {
                        reason: "id".to_string(),
                    }
                } else {
                    ItemOutcome::Created { logs_appended: 1 }
                }
            }
        });

        for n in 1..=20 {
            assert!(queue.push(n).await);
        }
        drop(queue);
        let summary = pool.join().await;

        assert_eq!(seen.load(Ordering::SeqCst), 20);
        assert_eq!(summary.skipped, 4);
        assert_eq!(summary.created, 16);
        assert_eq!(summary.logs_appended, 16);
    }

    #[tokio::test]
    async fn zero_concurrency_still_spawns_a_worker() {
        let (queue, pool) = WorkerPool::spawn(0, |_: ()| async {
            ItemOutcome::Updated { logs_appended: 0 }
        });
        assert!(queue.push(()).await);
        drop(queue);
        assert_eq!(pool.join().await.updated, 1);
    }

    #[tokio::test]
    async fn panicking_item_is_counted_as_failed() {
        let (queue, pool) = WorkerPool::spawn(1, |n: u32| async move {
            assert!(n != 2, "boom on {n}");
            ItemOutcome::Created { logs_appended: 0 }
        });
        for n in 1..=3 {
            assert!(queue.push(n).await);
        }
        drop(queue);
        let summary = pool.join().await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.failed, 1);
    }
}
