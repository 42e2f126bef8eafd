//! Worker pool for coarse-grained parallel tasks
//!
//! A fixed number of OS threads drain a queue of independent tasks and
//! send their results back over a channel. Tasks never share mutable
//! state; the caller merges returned values after the barrier. A failing
//! task arms a pool-internal cancellation flag so that the remaining
//! tasks stop at their next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::error::{ConeError, Result};

/// Cooperative cancellation handle.
///
/// Arming the token is a request, not a command: running tasks observe
/// it at their next poll and return [`ConeError::Cancelled`]. Timeouts
/// are implemented by the caller arming the token from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    own: Arc<AtomicBool>,
    upstream: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    /// Create an unarmed token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn arm(&self) {
        self.own.store(true, Ordering::Relaxed);
    }

    /// True iff this token, or any token it was derived from, is armed.
    pub fn is_armed(&self) -> bool {
        self.own.load(Ordering::Relaxed)
            || self.upstream.iter().any(|f| f.load(Ordering::Relaxed))
    }

    /// A child token: armed when either it or this token is armed.
    /// Arming the child does not arm this token.
    pub(crate) fn derived(&self) -> CancelToken {
        let mut upstream = self.upstream.clone();
        upstream.push(Arc::clone(&self.own));
        CancelToken { own: Arc::new(AtomicBool::new(false)), upstream }
    }
}

/// Fixed-size pool executing batches of independent fallible tasks.
#[derive(Debug, Clone)]
pub struct WorkPool {
    workers: usize,
}

impl WorkPool {
    /// Create a pool with the given worker count; `0` means one worker
    /// per hardware thread.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            workers
        };
        Self { workers }
    }

    /// Number of workers the pool will use.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run all tasks and collect their results in submission order.
    ///
    /// Each task receives a token derived from `cancel` and must poll it
    /// between units of work. When a task fails, the derived token is
    /// armed and the siblings wind down; the error reported is the first
    /// real failure in submission order, with pool-induced `Cancelled`
    /// results skipped unless cancellation is all there is.
    pub fn run<T, F>(&self, tasks: Vec<F>, cancel: &CancelToken) -> Result<Vec<T>>
    where
        F: FnOnce(&CancelToken) -> Result<T> + Send,
        T: Send,
    {
        let task_count = tasks.len();
        if task_count == 0 {
            return Ok(Vec::new());
        }
        let shared = cancel.derived();
        let worker_count = self.workers.min(task_count);

        if worker_count <= 1 {
            let mut results = Vec::with_capacity(task_count);
            for task in tasks {
                if shared.is_armed() {
                    results.push(Err(ConeError::Cancelled));
                    continue;
                }
                let out = task(&shared);
                if out.is_err() {
                    shared.arm();
                }
                results.push(out);
            }
            return merge(results);
        }

        let mut slots: Vec<Option<Result<T>>> = (0..task_count).map(|_| None).collect();
        thread::scope(|s| {
            let (task_tx, task_rx) = channel();
            for entry in tasks.into_iter().enumerate() {
                let _ = task_tx.send(entry);
            }
            drop(task_tx);
            let task_rx = Arc::new(Mutex::new(task_rx));
            let (result_tx, result_rx) = channel();

            for _ in 0..worker_count {
                let task_rx = Arc::clone(&task_rx);
                let result_tx = result_tx.clone();
                let token = shared.clone();
                s.spawn(move || loop {
                    let next = {
                        let guard = match task_rx.lock() {
                            Ok(g) => g,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        guard.recv()
                    };
                    let (idx, task): (usize, F) = match next {
                        Ok(entry) => entry,
                        Err(_) => break,
                    };
                    if token.is_armed() {
                        let _ = result_tx.send((idx, Err(ConeError::Cancelled)));
                        continue;
                    }
                    let out = task(&token);
                    if out.is_err() {
                        token.arm();
                    }
                    let _ = result_tx.send((idx, out));
                });
            }
            drop(result_tx);

            for (idx, result) in result_rx {
                slots[idx] = Some(result);
            }
        });

        let results = slots
            .into_iter()
            .map(|slot| match slot {
                Some(r) => r,
                None => panic!("invariant violated: worker finished without reporting a result"),
            })
            .collect();
        merge(results)
    }
}

impl Default for WorkPool {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Collapse per-task results into one. The first non-`Cancelled` error in
/// submission order wins; if every failure is a cancellation, the whole
/// batch is `Cancelled`.
fn merge<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(results.len());
    let mut cancelled = false;
    let mut first_failure: Option<ConeError> = None;
    for result in results {
        match result {
            Ok(v) => out.push(v),
            Err(ConeError::Cancelled) => cancelled = true,
            Err(e) => {
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }
    }
    if let Some(e) = first_failure {
        return Err(e);
    }
    if cancelled {
        return Err(ConeError::Cancelled);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_results_keep_submission_order() {
        let pool = WorkPool::new(4);
        let tasks: Vec<_> = (0..16)
            .map(|i| move |_: &CancelToken| -> Result<usize> { Ok(i * i) })
            .collect();
        let out = pool.run(tasks, &CancelToken::new()).unwrap();
        assert_eq!(out, (0..16).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_worker_inline() {
        let pool = WorkPool::new(1);
        let tasks: Vec<_> = (0..4)
            .map(|i| move |_: &CancelToken| -> Result<usize> { Ok(i + 1) })
            .collect();
        let out = pool.run(tasks, &CancelToken::new()).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_failure_cancels_siblings() {
        let pool = WorkPool::new(2);
        let waiter = |token: &CancelToken| -> Result<usize> {
            while !token.is_armed() {
                thread::sleep(Duration::from_millis(1));
            }
            Err(ConeError::Cancelled)
        };
        let failer = |_: &CancelToken| -> Result<usize> { Err(ConeError::UnsolvedCase) };

        let tasks: Vec<Box<dyn FnOnce(&CancelToken) -> Result<usize> + Send>> =
            vec![Box::new(waiter), Box::new(failer)];
        let err = pool
            .run(
                tasks.into_iter().map(|t| move |c: &CancelToken| t(c)).collect(),
                &CancelToken::new(),
            )
            .unwrap_err();
        assert_eq!(err, ConeError::UnsolvedCase);
    }

    #[test]
    fn test_pre_armed_token() {
        let pool = WorkPool::new(4);
        let token = CancelToken::new();
        token.arm();
        let tasks: Vec<_> = (0..8)
            .map(|_| move |c: &CancelToken| -> Result<usize> {
                if c.is_armed() {
                    Err(ConeError::Cancelled)
                } else {
                    Ok(0)
                }
            })
            .collect();
        assert_eq!(pool.run(tasks, &token), Err(ConeError::Cancelled));
    }

    #[test]
    fn test_derived_token_does_not_arm_parent() {
        let parent = CancelToken::new();
        let child = parent.derived();
        child.arm();
        assert!(child.is_armed());
        assert!(!parent.is_armed());
        parent.arm();
        assert!(parent.derived().is_armed());
    }
}
