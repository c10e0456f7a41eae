//! Bridges to blocking and `async` callers.
//!
//! Producers complete promises from their own threads; these bridges
//! only ever *wait*, so the thread (or task) calling them is never the
//! one that must drive completion, and the bridges cannot deadlock the
//! dispatch path.

use super::handle::Promise;
use parking_lot::{Condvar, Mutex};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Blocks the calling thread until the promise completes, then
    /// returns a clone of the terminal result.
    ///
    /// A promise whose producer never completes it — or that was
    /// disabled before completing — blocks forever; use
    /// [`wait_timeout`](Self::wait_timeout) when that is possible.
    #[must_use]
    pub fn wait(&self) -> Result<T, E> {
        let parked = Arc::new((Mutex::new(None), Condvar::new()));
        let signal = Arc::clone(&parked);
        self.on_complete(move |result| {
            *signal.0.lock() = Some(result);
            signal.1.notify_all();
        });

        let (slot, completed) = &*parked;
        let mut guard = slot.lock();
        loop {
            if let Some(result) = guard.take() {
                return result;
            }
            completed.wait(&mut guard);
        }
    }

    /// Blocks until the promise completes or `timeout` elapses.
    /// Returns `None` on timeout.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, E>> {
        let deadline = Instant::now() + timeout;
        let parked = Arc::new((Mutex::new(None), Condvar::new()));
        let signal = Arc::clone(&parked);
        self.on_complete(move |result| {
            *signal.0.lock() = Some(result);
            signal.1.notify_all();
        });

        let (slot, completed) = &*parked;
        let mut guard = slot.lock();
        loop {
            if let Some(result) = guard.take() {
                return Some(result);
            }
            if completed.wait_until(&mut guard, deadline).timed_out() {
                return guard.take();
            }
        }
    }

    /// Returns a [`Future`] resolving to this promise's terminal
    /// result. Equivalent to `promise.clone().await`.
    #[must_use]
    pub fn awaiting(&self) -> Awaiting<T, E> {
        Awaiting::new(self.clone())
    }
}

struct BridgeState<T, E> {
    result: Option<Result<T, E>>,
    waker: Option<Waker>,
}

/// Future returned by [`Promise::awaiting`] and `promise.await`.
///
/// The first poll registers an observer that records the terminal
/// result and wakes the most recent waker; later polls only refresh the
/// waker, so the future is safe to move between tasks.
pub struct Awaiting<T, E> {
    promise: Promise<T, E>,
    shared: Arc<Mutex<BridgeState<T, E>>>,
    registered: bool,
}

impl<T, E> Awaiting<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn new(promise: Promise<T, E>) -> Self {
        Self {
            promise,
            shared: Arc::new(Mutex::new(BridgeState {
                result: None,
                waker: None,
            })),
            registered: false,
        }
    }
}

impl<T, E> Future for Awaiting<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if !this.registered {
            this.registered = true;
            let shared = Arc::clone(&this.shared);
            this.promise.on_complete(move |result| {
                let waker = {
                    let mut state = shared.lock();
                    state.result = Some(result);
                    state.waker.take()
                };
                // Wake outside the lock.
                if let Some(waker) = waker {
                    waker.wake();
                }
            });
        }

        let mut state = this.shared.lock();
        if let Some(result) = state.result.take() {
            return Poll::Ready(result);
        }
        match &mut state.waker {
            Some(existing) if existing.will_wake(cx.waker()) => {}
            slot => *slot = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = Awaiting<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Awaiting::new(self)
    }
}
