//! Sequential composition: chaining, recovery, validation, delay.
//!
//! Every combinator here allocates a fresh promise, registers a
//! continuation on the source, and wires the continuation's outcome into
//! the new promise. Composition is closure wiring over the cell
//! primitives — no combinator introduces state beyond the promises it
//! creates.
//!
//! Each combinator comes in two spellings: the plain form runs its
//! transform inline in whatever thread completes the upstream value, and
//! the `_on` form names a [`Dispatcher`] for the transform and the
//! result's completion.

use super::handle::Promise;
use crate::dispatch::{Dispatcher, Timer};
use crate::either::Either;
use std::sync::Arc;
use std::time::Duration;

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Chains another asynchronous operation after this one succeeds.
    ///
    /// On success the value is fed to `transform` and the promise it
    /// returns decides the outcome. On failure the error propagates
    /// unchanged and `transform` is never invoked.
    ///
    /// ```
    /// use pledge::Promise;
    ///
    /// let p: Promise<i32, &str> =
    ///     Promise::resolved(10).flat_map(|x| Promise::resolved(x + 1));
    /// assert_eq!(p.wait(), Ok(11));
    /// ```
    pub fn flat_map<U, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Promise<U, E> + Send + 'static,
    {
        self.flat_map_on(Dispatcher::inline(), transform)
    }

    /// [`flat_map`](Self::flat_map) with the transform and result
    /// completion dispatched on `dispatcher`.
    pub fn flat_map_on<U, F>(&self, dispatcher: Dispatcher, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Promise<U, E> + Send + 'static,
    {
        let result = Promise::pending();
        let seal = result.clone();
        let forward_on = dispatcher.clone();
        self.on_complete_on(dispatcher, move |source| match source {
            Ok(value) => {
                transform(value).on_complete_on(forward_on, move |inner| seal.complete(inner));
            }
            Err(error) => seal.reject(error),
        });
        result
    }

    /// Transforms the success value, leaving failures untouched.
    pub fn map<U, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.map_on(Dispatcher::inline(), transform)
    }

    /// [`map`](Self::map) with the transform dispatched on `dispatcher`.
    pub fn map_on<U, F>(&self, dispatcher: Dispatcher, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.flat_map_on(dispatcher, move |value| Promise::resolved(transform(value)))
    }

    /// Transforms the success value with a fallible transform; a
    /// returned `Err` becomes the result's failure.
    pub fn try_map<U, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        self.try_map_on(Dispatcher::inline(), transform)
    }

    /// [`try_map`](Self::try_map) with the transform dispatched on
    /// `dispatcher`.
    pub fn try_map_on<U, F>(&self, dispatcher: Dispatcher, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        self.flat_map_on(dispatcher, move |value| Promise::from_result(transform(value)))
    }

    /// Chains a fallible promise-returning transform: `Err` rejects the
    /// result without an inner promise ever existing.
    pub fn try_flat_map<U, F>(&self, transform: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<Promise<U, E>, E> + Send + 'static,
    {
        self.flat_map(move |value| match transform(value) {
            Ok(inner) => inner,
            Err(error) => Promise::rejected(error),
        })
    }

    /// Recovers from failure by chaining another asynchronous operation.
    ///
    /// Invoked only on failure; the replacement promise may succeed
    /// (recovering the chain) or fail differently. Success passes
    /// through untouched.
    ///
    /// ```
    /// use pledge::Promise;
    ///
    /// let p: Promise<i32, &str> =
    ///     Promise::rejected("boom").recover(|_| Promise::resolved(99));
    /// assert_eq!(p.wait(), Ok(99));
    /// ```
    pub fn recover<F>(&self, transform: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Promise<T, E> + Send + 'static,
    {
        self.recover_on(Dispatcher::inline(), transform)
    }

    /// [`recover`](Self::recover) with the transform dispatched on
    /// `dispatcher`.
    pub fn recover_on<F>(&self, dispatcher: Dispatcher, transform: F) -> Promise<T, E>
    where
        F: FnOnce(E) -> Promise<T, E> + Send + 'static,
    {
        let result = Promise::pending();
        let seal = result.clone();
        let forward_on = dispatcher.clone();
        self.on_complete_on(dispatcher, move |source| match source {
            Ok(value) => seal.resolve(value),
            Err(error) => {
                transform(error).on_complete_on(forward_on, move |inner| seal.complete(inner));
            }
        });
        result
    }

    /// Transforms the error value, leaving successes untouched.
    pub fn map_err<E2, F>(&self, transform: F) -> Promise<T, E2>
    where
        E2: Clone + Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        self.map_err_on(Dispatcher::inline(), transform)
    }

    /// [`map_err`](Self::map_err) with the transform dispatched on
    /// `dispatcher`.
    pub fn map_err_on<E2, F>(&self, dispatcher: Dispatcher, transform: F) -> Promise<T, E2>
    where
        E2: Clone + Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        let result = Promise::pending();
        let seal = result.clone();
        self.on_complete_on(dispatcher, move |source| match source {
            Ok(value) => seal.resolve(value),
            Err(error) => seal.reject(transform(error)),
        });
        result
    }

    /// Transforms the success value through an `Option`-returning
    /// transform, failing with `error` when it produces `None`.
    pub fn compact_map<U, F, G>(&self, transform: F, error: G) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Option<U> + Send + 'static,
        G: FnOnce() -> E + Send + 'static,
    {
        self.try_map(move |value| transform(value).ok_or_else(error))
    }

    /// Passes the success value through unchanged if `predicate` holds,
    /// otherwise fails with `error`.
    ///
    /// ```
    /// use pledge::Promise;
    ///
    /// let p: Promise<i32, &str> =
    ///     Promise::resolved(4).ensure(|x| *x > 10, || "too small");
    /// assert_eq!(p.wait(), Err("too small"));
    /// ```
    pub fn ensure<F, G>(&self, predicate: F, error: G) -> Promise<T, E>
    where
        F: FnOnce(&T) -> bool + Send + 'static,
        G: FnOnce() -> E + Send + 'static,
    {
        self.try_map(move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(error())
            }
        })
    }

    /// Observes the success value for side effects and returns the same
    /// promise handle.
    pub fn tap<F>(&self, work: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.on_success(work);
        self.clone()
    }

    /// Observes the error for side effects and returns the same promise
    /// handle.
    pub fn tap_err<F>(&self, work: F) -> Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.on_failure(work);
        self.clone()
    }

    /// Observes the terminal result for side effects and returns the
    /// same promise handle.
    pub fn tap_result<F>(&self, work: F) -> Self
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        self.on_complete(work);
        self.clone()
    }

    /// Discards the success value.
    pub fn into_void(&self) -> Promise<(), E> {
        self.map(|_| ())
    }

    /// Pairs this promise's value with another's; fails with whichever
    /// failure is observed first.
    pub fn and<U>(&self, other: &Promise<U, E>) -> Promise<(T, U), E>
    where
        U: Clone + Send + 'static,
    {
        crate::combinator::all2(self, other)
    }

    /// Pairs the success value with a literal.
    pub fn and_value<U>(&self, value: U) -> Promise<(T, U), E>
    where
        U: Clone + Send + 'static,
    {
        self.map(move |current| (current, value))
    }

    /// Choice: the left branch's value if this promise succeeds, else
    /// the right branch's value if `other` succeeds, else `other`'s
    /// error.
    pub fn or<U>(&self, other: &Promise<U, E>) -> Promise<Either<T, U>, E>
    where
        U: Clone + Send + 'static,
    {
        let result = Promise::pending();
        let seal = result.clone();
        let fallback = other.clone();
        self.on_complete(move |source| match source {
            Ok(value) => seal.resolve(Either::Left(value)),
            Err(_) => {
                fallback.on_complete(move |other_result| match other_result {
                    Ok(value) => seal.resolve(Either::Right(value)),
                    Err(error) => seal.reject(error),
                });
            }
        });
        result
    }

    /// Choice against a literal: the fallback value replaces any
    /// failure, so the result always succeeds.
    pub fn or_value<U>(&self, fallback: U) -> Promise<Either<T, U>, E>
    where
        U: Clone + Send + 'static,
    {
        let result = Promise::pending();
        let seal = result.clone();
        self.on_complete(move |source| match source {
            Ok(value) => seal.resolve(Either::Left(value)),
            Err(_) => seal.resolve(Either::Right(fallback)),
        });
        result
    }

    /// Forwards the eventual result unchanged, delayed by `duration` on
    /// `timer`. Both successes and failures are delayed.
    pub fn sleep(&self, timer: &Timer, duration: Duration) -> Promise<T, E> {
        let result = Promise::pending();
        let seal = result.clone();
        let timer = timer.clone();
        self.on_complete(move |source| {
            timer.schedule(duration, move || seal.complete(source));
        });
        result
    }

    /// Folds this promise's value with each operand's value in order,
    /// left to right; `combine` itself returns a promise.
    ///
    /// Operands may complete in any order, but combination always
    /// proceeds left to right over the operand positions.
    pub fn fold<U, F>(&self, operands: Vec<Promise<U, E>>, combine: F) -> Promise<T, E>
    where
        U: Clone + Send + 'static,
        F: Fn(T, U) -> Promise<T, E> + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        operands.into_iter().fold(self.clone(), |accumulator, operand| {
            let combine = Arc::clone(&combine);
            accumulator
                .and(&operand)
                .flat_map(move |(acc, value)| combine(acc, value))
        })
    }

    /// Reduces `initial` with each operand's value in order, left to
    /// right, with a plain combining function.
    pub fn reduce<U, F>(initial: T, operands: Vec<Promise<U, E>>, combine: F) -> Promise<T, E>
    where
        U: Clone + Send + 'static,
        F: Fn(T, U) -> T + Send + Sync + 'static,
    {
        Promise::resolved(initial).fold(operands, move |accumulator, value| {
            Promise::resolved(combine(accumulator, value))
        })
    }
}

impl<E> Promise<bool, E>
where
    E: Clone + Send + 'static,
{
    /// Branches on the resulting boolean, chaining one of two
    /// promise-producing continuations.
    pub fn flat_map_if<U, F1, F2>(&self, on_true: F1, on_false: F2) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F1: FnOnce() -> Promise<U, E> + Send + 'static,
        F2: FnOnce() -> Promise<U, E> + Send + 'static,
    {
        self.flat_map(move |condition| if condition { on_true() } else { on_false() })
    }

    /// Branches on the resulting boolean, producing one of two plain
    /// values.
    pub fn map_if<U, F1, F2>(&self, on_true: F1, on_false: F2) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F1: FnOnce() -> U + Send + 'static,
        F2: FnOnce() -> U + Send + 'static,
    {
        self.map(move |condition| if condition { on_true() } else { on_false() })
    }
}
