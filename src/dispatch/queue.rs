//! Serial FIFO worker queue.
//!
//! A [`SerialQueue`] owns one worker thread and a job queue. Jobs run
//! strictly in submission order, one at a time. The handle is cheap to
//! clone; when the last handle drops, the worker drains the jobs already
//! queued and then exits.
//!
//! # Shutdown
//!
//! - Handles outstanding: worker sleeps on the condvar between jobs.
//! - Last handle dropped: worker finishes the backlog, logs, and exits.
//!   Jobs submitted before the drop are never lost.

use super::Job;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

struct QueueState {
    jobs: VecDeque<Job>,
    /// Live `SerialQueue` handles. The worker exits once this reaches
    /// zero and the backlog is empty.
    handles: usize,
}

struct QueueInner {
    name: String,
    state: Mutex<QueueState>,
    jobs_available: Condvar,
}

/// A handle to a serial worker queue.
///
/// # Example
///
/// ```
/// use pledge::SerialQueue;
///
/// let queue = SerialQueue::new("io");
/// let (tx, rx) = std::sync::mpsc::channel();
/// queue.submit(move || {
///     let _ = tx.send(1 + 1);
/// });
/// assert_eq!(rx.recv().unwrap(), 2);
/// ```
pub struct SerialQueue {
    inner: Arc<QueueInner>,
}

impl SerialQueue {
    /// Creates a queue and spawns its worker thread. `name` labels the
    /// thread and log events.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let inner = Arc::new(QueueInner {
            name: name.clone(),
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                handles: 1,
            }),
            jobs_available: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        // The worker detaches; it exits on its own once the last handle
        // drops and the backlog is empty.
        let _ = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_worker(&worker_inner))
            .unwrap_or_else(|e| panic!("failed to spawn queue worker `{name}`: {e}"));

        Self { inner }
    }

    /// Returns the queue's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Enqueues a job. Jobs run in submission order on the worker
    /// thread.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.state.lock();
        state.jobs.push_back(Box::new(job));
        tracing::trace!(
            target: "pledge::dispatch",
            queue = %self.inner.name,
            depth = state.jobs.len(),
            "job enqueued"
        );
        drop(state);
        self.inner.jobs_available.notify_one();
    }

    /// Number of jobs queued but not yet started.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.inner.state.lock().jobs.len()
    }
}

impl Clone for SerialQueue {
    fn clone(&self) -> Self {
        self.inner.state.lock().handles += 1;
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.handles -= 1;
        let last = state.handles == 0;
        drop(state);
        if last {
            // Wake the worker so it can observe the shutdown condition.
            self.inner.jobs_available.notify_one();
        }
    }
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SerialQueue")
            .field("name", &self.inner.name)
            .field("backlog", &state.jobs.len())
            .field("handles", &state.handles)
            .finish()
    }
}

fn run_worker(inner: &QueueInner) {
    tracing::debug!(target: "pledge::dispatch", queue = %inner.name, "worker started");
    let mut state = inner.state.lock();
    loop {
        if let Some(job) = state.jobs.pop_front() {
            // Run the job outside the lock so submitters never block on
            // user code.
            drop(state);
            job();
            state = inner.state.lock();
            continue;
        }
        if state.handles == 0 {
            break;
        }
        inner.jobs_available.wait(&mut state);
    }
    drop(state);
    tracing::debug!(target: "pledge::dispatch", queue = %inner.name, "worker exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn jobs_run_in_submission_order() {
        init_test("jobs_run_in_submission_order");
        let queue = SerialQueue::new("fifo-test");
        let (tx, rx) = mpsc::channel();
        for i in 0..32 {
            let tx = tx.clone();
            queue.submit(move || {
                let _ = tx.send(i);
            });
        }
        let received: Vec<i32> = (0..32)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).expect("job ran"))
            .collect();
        let expected: Vec<i32> = (0..32).collect();
        crate::assert_with_log!(received == expected, "fifo order", expected, received);
        crate::test_complete!("jobs_run_in_submission_order");
    }

    #[test]
    fn jobs_run_one_at_a_time() {
        init_test("jobs_run_one_at_a_time");
        let queue = SerialQueue::new("serial-test");
        let in_flight = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();
        for _ in 0..16 {
            let in_flight = Arc::clone(&in_flight);
            let overlapped = Arc::clone(&overlapped);
            let tx = tx.clone();
            queue.submit(move || {
                if in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                    overlapped.fetch_add(1, Ordering::SeqCst);
                }
                std::thread::sleep(Duration::from_millis(1));
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = tx.send(());
            });
        }
        for _ in 0..16 {
            rx.recv_timeout(Duration::from_secs(5)).expect("job ran");
        }
        let overlaps = overlapped.load(Ordering::SeqCst);
        crate::assert_with_log!(overlaps == 0, "no overlap", 0usize, overlaps);
        crate::test_complete!("jobs_run_one_at_a_time");
    }

    #[test]
    fn backlog_drains_after_last_handle_drops() {
        init_test("backlog_drains_after_last_handle_drops");
        let (tx, rx) = mpsc::channel();
        {
            let queue = SerialQueue::new("drain-test");
            for i in 0..8 {
                let tx = tx.clone();
                queue.submit(move || {
                    std::thread::sleep(Duration::from_millis(1));
                    let _ = tx.send(i);
                });
            }
            // queue dropped here with jobs still pending
        }
        let received: Vec<i32> = (0..8)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).expect("job ran"))
            .collect();
        let expected: Vec<i32> = (0..8).collect();
        crate::assert_with_log!(received == expected, "backlog drained", expected, received);
        crate::test_complete!("backlog_drains_after_last_handle_drops");
    }

    #[test]
    fn clone_shares_the_worker() {
        init_test("clone_shares_the_worker");
        let queue = SerialQueue::new("clone-test");
        let other = queue.clone();
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        queue.submit(move || {
            let _ = tx.send(std::thread::current().id());
        });
        other.submit(move || {
            let _ = tx2.send(std::thread::current().id());
        });
        let first = rx.recv_timeout(Duration::from_secs(5)).expect("first job");
        let second = rx.recv_timeout(Duration::from_secs(5)).expect("second job");
        crate::assert_with_log!(first == second, "same worker thread", true, first == second);
        crate::test_complete!("clone_shares_the_worker");
    }
}
