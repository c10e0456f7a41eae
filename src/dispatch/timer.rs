//! Deadline-driven job scheduling.
//!
//! A [`Timer`] owns one worker thread and a min-heap of
//! `(deadline, generation, job)` entries. The worker sleeps until the
//! earliest deadline, runs every expired job, and goes back to sleep.
//! Entries with equal deadlines fire in insertion order (the generation
//! counter breaks ties).
//!
//! The handle is cheap to clone. When the last handle drops, the worker
//! fires the jobs already scheduled and then exits: a scheduled job is
//! never lost, only ever late.

use super::Job;
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct TimerEntry {
    deadline: Instant,
    generation: u64,
    job: Job,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.generation == other.generation
    }
}

impl Eq for TimerEntry {}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline first),
        // generation as the insertion-order tiebreak.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct TimerState {
    heap: BinaryHeap<TimerEntry>,
    next_generation: u64,
    handles: usize,
}

struct TimerInner {
    state: Mutex<TimerState>,
    entries_changed: Condvar,
}

/// A handle to a timer worker.
///
/// # Example
///
/// ```
/// use pledge::Timer;
/// use std::time::{Duration, Instant};
///
/// let timer = Timer::new();
/// let (tx, rx) = std::sync::mpsc::channel();
/// let start = Instant::now();
/// timer.schedule(Duration::from_millis(20), move || {
///     let _ = tx.send(start.elapsed());
/// });
/// assert!(rx.recv().unwrap() >= Duration::from_millis(20));
/// ```
pub struct Timer {
    inner: Arc<TimerInner>,
}

impl Timer {
    /// Creates a timer and spawns its worker thread.
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new(TimerInner {
            state: Mutex::new(TimerState {
                heap: BinaryHeap::new(),
                next_generation: 0,
                handles: 1,
            }),
            entries_changed: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        // The worker detaches; it exits once the last handle drops and
        // every scheduled job has fired.
        let _ = std::thread::Builder::new()
            .name("pledge-timer".into())
            .spawn(move || run_worker(&worker_inner))
            .unwrap_or_else(|e| panic!("failed to spawn timer worker: {e}"));

        Self { inner }
    }

    /// Schedules `job` to run `delay` from now on the timer thread.
    pub fn schedule(&self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        self.schedule_at(Instant::now() + delay, job);
    }

    /// Schedules `job` to run at `deadline` on the timer thread.
    pub fn schedule_at(&self, deadline: Instant, job: impl FnOnce() + Send + 'static) {
        let mut state = self.inner.state.lock();
        let generation = state.next_generation;
        state.next_generation += 1;
        state.heap.push(TimerEntry {
            deadline,
            generation,
            job: Box::new(job),
        });
        tracing::trace!(
            target: "pledge::dispatch",
            pending = state.heap.len(),
            "timer entry scheduled"
        );
        drop(state);
        // The new entry may be earlier than what the worker is sleeping
        // toward.
        self.inner.entries_changed.notify_one();
    }

    /// Number of entries not yet fired.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.state.lock().heap.len()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Timer {
    fn clone(&self) -> Self {
        self.inner.state.lock().handles += 1;
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.handles -= 1;
        let last = state.handles == 0;
        drop(state);
        if last {
            self.inner.entries_changed.notify_one();
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Timer")
            .field("pending", &state.heap.len())
            .field("handles", &state.handles)
            .finish()
    }
}

fn run_worker(inner: &TimerInner) {
    tracing::debug!(target: "pledge::dispatch", "timer worker started");
    let mut state = inner.state.lock();
    loop {
        let now = Instant::now();
        match state.heap.peek() {
            Some(entry) if entry.deadline <= now => {
                if let Some(entry) = state.heap.pop() {
                    drop(state);
                    (entry.job)();
                    state = inner.state.lock();
                }
            }
            Some(entry) => {
                let deadline = entry.deadline;
                let _ = inner.entries_changed.wait_until(&mut state, deadline);
            }
            None => {
                if state.handles == 0 {
                    break;
                }
                inner.entries_changed.wait(&mut state);
            }
        }
    }
    drop(state);
    tracing::debug!(target: "pledge::dispatch", "timer worker exited");
}
