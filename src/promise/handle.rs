//! The public promise handle: creation, completion, observation.

use super::cell::{Cell, Observer};
use crate::dispatch::{Dispatcher, SerialQueue};
use std::sync::Arc;

/// A single-assignment container for the eventual result of an
/// asynchronous operation.
///
/// A `Promise<T, E>` is a cheap clonable handle to shared state. It is
/// `Pending` until some handle calls [`resolve`](Self::resolve) or
/// [`reject`](Self::reject), after which it is terminal forever: the
/// first completion wins and later attempts are silent no-ops. Every
/// observer registered on the promise is notified at most once — exactly
/// once when its interest matches the terminal state — in registration
/// order, on the [`Dispatcher`] it asked for.
///
/// Completion is producer-exclusive *by convention*: any handle can
/// complete, but well-behaved consumers only observe.
///
/// # Example
///
/// ```
/// use pledge::Promise;
///
/// let promise: Promise<i32, &str> = Promise::pending();
/// let producer = promise.clone();
/// std::thread::spawn(move || producer.resolve(42));
/// assert_eq!(promise.wait(), Ok(42));
/// ```
pub struct Promise<T, E> {
    pub(crate) cell: Arc<Cell<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a promise in the pending state.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            cell: Arc::new(Cell::new()),
        }
    }

    /// Creates a promise already fulfilled with `value` — a literal
    /// result without an async hop.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        let promise = Self::pending();
        promise.resolve(value);
        promise
    }

    /// Creates a promise already rejected with `error`.
    #[must_use]
    pub fn rejected(error: E) -> Self {
        let promise = Self::pending();
        promise.reject(error);
        promise
    }

    /// Creates a promise already completed with `result`.
    #[must_use]
    pub fn from_result(result: Result<T, E>) -> Self {
        let promise = Self::pending();
        promise.complete(result);
        promise
    }

    /// Creates a pending promise and hands it to `producer`, which is
    /// expected to arrange for completion (possibly from another
    /// thread).
    ///
    /// ```
    /// use pledge::Promise;
    ///
    /// let promise: Promise<i32, &str> = Promise::new(|p| {
    ///     let seal = p.clone();
    ///     std::thread::spawn(move || seal.resolve(7));
    /// });
    /// assert_eq!(promise.wait(), Ok(7));
    /// ```
    #[must_use]
    pub fn new(producer: impl FnOnce(&Self)) -> Self {
        let promise = Self::pending();
        producer(&promise);
        promise
    }

    /// Evaluates `work` immediately on the calling thread and wraps its
    /// result.
    #[must_use]
    pub fn from_fn(work: impl FnOnce() -> Result<T, E>) -> Self {
        Self::from_result(work())
    }

    /// Evaluates `work` on `queue` and completes the returned promise
    /// with its result.
    #[must_use]
    pub fn run_on(queue: &SerialQueue, work: impl FnOnce() -> Result<T, E> + Send + 'static) -> Self {
        let promise = Self::pending();
        let seal = promise.clone();
        queue.submit(move || seal.complete(work()));
        promise
    }

    // ── Completion ─────────────────────────────────────────────────

    /// Fulfills the promise with `value`. A no-op if already terminal.
    pub fn resolve(&self, value: T) {
        self.cell.complete(Ok(value));
    }

    /// Rejects the promise with `error`. A no-op if already terminal.
    pub fn reject(&self, error: E) {
        self.cell.complete(Err(error));
    }

    /// Completes the promise with `result`. A no-op if already terminal.
    pub fn complete(&self, result: Result<T, E>) {
        self.cell.complete(result);
    }

    /// Fulfills the promise from `dispatcher` instead of the calling
    /// thread; observers fire from there.
    pub fn resolve_on(&self, dispatcher: &Dispatcher, value: T) {
        let cell = Arc::clone(&self.cell);
        dispatcher.dispatch(move || cell.complete(Ok(value)));
    }

    /// Rejects the promise from `dispatcher` instead of the calling
    /// thread.
    pub fn reject_on(&self, dispatcher: &Dispatcher, error: E) {
        let cell = Arc::clone(&self.cell);
        dispatcher.dispatch(move || cell.complete(Err(error)));
    }

    /// Completes the promise from `dispatcher` instead of the calling
    /// thread.
    pub fn complete_on(&self, dispatcher: &Dispatcher, result: Result<T, E>) {
        let cell = Arc::clone(&self.cell);
        dispatcher.dispatch(move || cell.complete(result));
    }

    // ── Observation ────────────────────────────────────────────────

    /// Registers `callback` to run with the value if the promise
    /// fulfills. Fires immediately if it already has.
    pub fn on_success(&self, callback: impl FnOnce(T) + Send + 'static) {
        self.on_success_on(Dispatcher::inline(), callback);
    }

    /// [`on_success`](Self::on_success) with an explicit dispatcher.
    pub fn on_success_on(&self, dispatcher: Dispatcher, callback: impl FnOnce(T) + Send + 'static) {
        self.cell
            .subscribe(Observer::Success(Box::new(callback), dispatcher));
    }

    /// Registers `callback` to run with the error if the promise
    /// rejects. Fires immediately if it already has.
    pub fn on_failure(&self, callback: impl FnOnce(E) + Send + 'static) {
        self.on_failure_on(Dispatcher::inline(), callback);
    }

    /// [`on_failure`](Self::on_failure) with an explicit dispatcher.
    pub fn on_failure_on(&self, dispatcher: Dispatcher, callback: impl FnOnce(E) + Send + 'static) {
        self.cell
            .subscribe(Observer::Failure(Box::new(callback), dispatcher));
    }

    /// Registers `callback` to run with the terminal result, whichever
    /// way the promise completes. Fires immediately if it already has.
    pub fn on_complete(&self, callback: impl FnOnce(Result<T, E>) + Send + 'static) {
        self.on_complete_on(Dispatcher::inline(), callback);
    }

    /// [`on_complete`](Self::on_complete) with an explicit dispatcher.
    pub fn on_complete_on(
        &self,
        dispatcher: Dispatcher,
        callback: impl FnOnce(Result<T, E>) + Send + 'static,
    ) {
        self.cell
            .subscribe(Observer::Complete(Box::new(callback), dispatcher));
    }

    // ── Inspection ─────────────────────────────────────────────────

    /// Returns true once the promise is terminal.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.cell.is_completed()
    }

    /// Returns true while the promise has no terminal result.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.cell.is_completed()
    }

    /// Returns true if the promise completed with a success.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.cell.peek(), Some(Ok(_)))
    }

    /// Returns true if the promise completed with a failure.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.cell.peek(), Some(Err(_)))
    }

    /// Clones the success value out, if fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match self.cell.peek() {
            Some(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// Clones the error out, if rejected.
    #[must_use]
    pub fn error(&self) -> Option<E> {
        match self.cell.peek() {
            Some(Err(error)) => Some(error),
            _ => None,
        }
    }

    /// Clones the terminal result out, if any.
    #[must_use]
    pub fn result(&self) -> Option<Result<T, E>> {
        self.cell.peek()
    }

    // ── Broadcast suppression ──────────────────────────────────────

    /// Turns observer notification on or off.
    ///
    /// A disabled promise that completes still records its result, but
    /// the observers registered at that moment are discarded unrun —
    /// the silent-discard switch for chains whose outcome stopped
    /// mattering. Observers registered *after* completion always fire:
    /// they asked about a result that already exists.
    pub fn set_enabled(&self, enabled: bool) {
        self.cell.set_enabled(enabled);
    }

    /// Returns true if completion will broadcast to observers.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.cell.is_enabled()
    }

    // ── Forwarding ─────────────────────────────────────────────────

    /// Forwards this promise's eventual result into `target`.
    pub fn cascade(&self, target: &Self) {
        let target = target.clone();
        self.on_complete(move |result| target.complete(result));
    }

    /// Completes this promise with `source`'s eventual result.
    pub fn adopt(&self, source: &Self) {
        source.cascade(self);
    }
}

impl<T, E> std::fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promise").field("cell", &self.cell).finish()
    }
}
