//! Fixed-size worker pool for independent tasks.

use std::collections::BTreeMap;
use std::thread;

use crossbeam_channel::{bounded, unbounded};
use tracing::debug;

use crate::error::{Result, SmoothError};

/// Runs keyed tasks on scoped worker threads and reduces results by key.
///
/// Tasks travel over a bounded channel so at most a few are queued per
/// worker; results come back over an unbounded channel and are collected on
/// the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Applies `task` to every item, returning results keyed like the input.
    ///
    /// `progress` is called on the calling thread with (completed, total)
    /// after each result arrives.
    pub fn map_keyed<K, T, R, F, P>(
        &self,
        items: Vec<(K, T)>,
        task: F,
        mut progress: P,
    ) -> Result<BTreeMap<K, R>>
    where
        K: Ord + Send,
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        P: FnMut(usize, usize),
    {
        let total = items.len();
        let workers = self.workers.min(total.max(1));
        debug!(workers, tasks = total, "starting worker pool");

        let (task_tx, task_rx) = bounded::<(K, T)>(workers * 2);
        let (result_tx, result_rx) = unbounded::<(K, R)>();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    let task = &task;
                    scope.spawn(move || {
                        for (key, item) in task_rx {
                            if result_tx.send((key, task(item))).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(task_rx);
            drop(result_tx);

            let feeder = scope.spawn(move || {
                for item in items {
                    if task_tx.send(item).is_err() {
                        break;
                    }
                }
            });

            let mut results = BTreeMap::new();
            for (key, result) in result_rx {
                results.insert(key, result);
                progress(results.len(), total);
            }

            let panicked = handles
                .into_iter()
                .chain(std::iter::once(feeder))
                .map(|handle| handle.join())
                .any(|joined| joined.is_err());
            if panicked {
                return Err(SmoothError::WorkerPanicked);
            }
            Ok(results)
        })
    }
}
