//! The single-assignment cell behind every promise.
//!
//! A [`Cell`] guards three things with one mutex: the result slot, the
//! ordered observer list, and the enabled flag. The critical section is
//! kept short and never runs user code:
//!
//! - `complete` stores the result (first writer wins), drains the
//!   observer list under the lock, and invokes the drained observers
//!   after releasing it, each on its requested [`Dispatcher`].
//! - `subscribe` either appends to the list (still pending) or fires the
//!   observer immediately with a clone of the stored result (already
//!   terminal) — again outside the lock.
//!
//! Observers fire in registration order relative to each other. An
//! observer's interest (success-only, failure-only, both) decides whether
//! the terminal result reaches its callback at all; a success-only
//! observer on a failed cell is consumed without running.

use crate::dispatch::Dispatcher;
use parking_lot::Mutex;
use smallvec::SmallVec;

/// A registered continuation: interest, callback, and where to run it.
pub(crate) enum Observer<T, E> {
    /// Runs only if the cell succeeds.
    Success(Box<dyn FnOnce(T) + Send + 'static>, Dispatcher),
    /// Runs only if the cell fails.
    Failure(Box<dyn FnOnce(E) + Send + 'static>, Dispatcher),
    /// Runs on either terminal state.
    Complete(Box<dyn FnOnce(Result<T, E>) + Send + 'static>, Dispatcher),
}

struct CellState<T, E> {
    /// The terminal result. `Some` exactly once, never overwritten.
    result: Option<Result<T, E>>,
    /// Observers waiting for completion, in registration order.
    observers: SmallVec<[Observer<T, E>; 2]>,
    /// When false, completion stores the result but does not broadcast.
    enabled: bool,
}

/// Shared state of one promise.
pub(crate) struct Cell<T, E> {
    state: Mutex<CellState<T, E>>,
}

impl<T, E> Cell<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CellState {
                result: None,
                observers: SmallVec::new(),
                enabled: true,
            }),
        }
    }

    /// Stores the terminal result and notifies observers.
    ///
    /// If the cell is already terminal this is a silent no-op: the first
    /// writer wins, and a second completion attempt is defined behavior,
    /// not an error. If the cell is disabled, the result is stored but
    /// the registered observers are discarded unrun.
    pub(crate) fn complete(&self, result: Result<T, E>) {
        let (observers, deliver) = {
            let mut state = self.state.lock();
            if state.result.is_some() {
                tracing::trace!(
                    target: "pledge::promise",
                    "completion ignored: cell already terminal"
                );
                return;
            }
            state.result = Some(result.clone());
            (std::mem::take(&mut state.observers), state.enabled)
        };
        // User callbacks (and observer drops) run outside the critical
        // section.
        if deliver {
            tracing::trace!(
                target: "pledge::promise",
                observers = observers.len(),
                ok = result.is_ok(),
                "cell completed"
            );
            for observer in observers {
                Self::notify(observer, result.clone());
            }
        } else if !observers.is_empty() {
            tracing::debug!(
                target: "pledge::promise",
                suppressed = observers.len(),
                "cell completed while disabled; broadcast suppressed"
            );
        }
    }

    /// Registers an observer, firing it immediately if the cell is
    /// already terminal.
    ///
    /// Immediate firing ignores the enabled flag: the suppression switch
    /// gates the completion-time broadcast, not later queries against a
    /// result that already exists.
    pub(crate) fn subscribe(&self, observer: Observer<T, E>) {
        let mut state = self.state.lock();
        if let Some(result) = state.result.clone() {
            drop(state);
            Self::notify(observer, result);
        } else {
            state.observers.push(observer);
        }
    }

    /// Clones the terminal result out of the cell, if any.
    pub(crate) fn peek(&self) -> Option<Result<T, E>> {
        self.state.lock().result.clone()
    }

    /// Returns true if the cell has reached a terminal state.
    pub(crate) fn is_completed(&self) -> bool {
        self.state.lock().result.is_some()
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Routes a terminal result to an observer according to its
    /// interest, on its dispatcher. Interest mismatches consume the
    /// observer without running it.
    fn notify(observer: Observer<T, E>, result: Result<T, E>) {
        match observer {
            Observer::Success(callback, dispatcher) => {
                if let Ok(value) = result {
                    dispatcher.dispatch(move || callback(value));
                }
            }
            Observer::Failure(callback, dispatcher) => {
                if let Err(error) = result {
                    dispatcher.dispatch(move || callback(error));
                }
            }
            Observer::Complete(callback, dispatcher) => {
                dispatcher.dispatch(move || callback(result));
            }
        }
    }
}

impl<T, E> std::fmt::Debug for Cell<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        let phase = match &state.result {
            None => "pending",
            Some(Ok(_)) => "fulfilled",
            Some(Err(_)) => "rejected",
        };
        f.debug_struct("Cell")
            .field("state", &phase)
            .field("observers", &state.observers.len())
            .field("enabled", &state.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    fn success_observer(
        hits: &Arc<AtomicUsize>,
    ) -> Observer<i32, &'static str> {
        let hits = Arc::clone(hits);
        Observer::Success(
            Box::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
            Dispatcher::inline(),
        )
    }

    #[test]
    fn first_writer_wins() {
        init_test("first_writer_wins");
        let cell: Cell<i32, &str> = Cell::new();
        cell.complete(Ok(1));
        cell.complete(Ok(2));
        cell.complete(Err("late"));
        let result = cell.peek();
        crate::assert_with_log!(
            result == Some(Ok(1)),
            "first result kept",
            Some(Ok(1)),
            result
        );
        crate::test_complete!("first_writer_wins");
    }

    #[test]
    fn observers_drain_exactly_once() {
        init_test("observers_drain_exactly_once");
        let cell: Cell<i32, &str> = Cell::new();
        let hits = Arc::new(AtomicUsize::new(0));
        cell.subscribe(success_observer(&hits));
        cell.subscribe(success_observer(&hits));
        cell.complete(Ok(7));
        cell.complete(Ok(8));
        let count = hits.load(Ordering::SeqCst);
        crate::assert_with_log!(count == 2, "each observer once", 2usize, count);
        let remaining = cell.observer_count();
        crate::assert_with_log!(remaining == 0, "list drained", 0usize, remaining);
        crate::test_complete!("observers_drain_exactly_once");
    }

    #[test]
    fn interest_mismatch_is_consumed_silently() {
        init_test("interest_mismatch_is_consumed_silently");
        let cell: Cell<i32, &str> = Cell::new();
        let hits = Arc::new(AtomicUsize::new(0));
        cell.subscribe(success_observer(&hits));
        cell.complete(Err("boom"));
        let count = hits.load(Ordering::SeqCst);
        crate::assert_with_log!(count == 0, "success observer skipped", 0usize, count);
        crate::test_complete!("interest_mismatch_is_consumed_silently");
    }

    #[test]
    fn disabled_cell_suppresses_broadcast_but_keeps_result() {
        init_test("disabled_cell_suppresses_broadcast_but_keeps_result");
        let cell: Cell<i32, &str> = Cell::new();
        let hits = Arc::new(AtomicUsize::new(0));
        cell.subscribe(success_observer(&hits));
        cell.set_enabled(false);
        cell.complete(Ok(3));
        let count = hits.load(Ordering::SeqCst);
        crate::assert_with_log!(count == 0, "broadcast suppressed", 0usize, count);
        let result = cell.peek();
        crate::assert_with_log!(result == Some(Ok(3)), "result stored", Some(Ok(3)), result);

        // Late subscription still observes the stored result.
        cell.subscribe(success_observer(&hits));
        let count = hits.load(Ordering::SeqCst);
        crate::assert_with_log!(count == 1, "late observer fires", 1usize, count);
        crate::test_complete!("disabled_cell_suppresses_broadcast_but_keeps_result");
    }
}
