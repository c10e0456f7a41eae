//! Fan-in requiring every operand to succeed.
//!
//! # Semantics
//!
//! `all([p0, p1, ..., pn])`:
//! 1. Register a completion observer on every operand.
//! 2. Record each success in its operand's position slot.
//! 3. Resolve with the full vector once every operand has succeeded, or
//!    reject with the **first observed failure**.
//!
//! Which failure is "first" is a race across operands — whichever
//! failing operand's observer runs first wins, not the lowest index.
//! The success ordering, by contrast, is never a race: values appear in
//! operand position order no matter the completion order.
//!
//! The empty operand set succeeds immediately with an empty vector
//! (contrast [`any`](super::any), where it fails).
//!
//! One mutex per `all` call makes the "have all operands finished" check
//! atomic; operands share that single aggregation lock and nothing else.

use crate::promise::Promise;
use parking_lot::Mutex;
use std::sync::Arc;

/// Completion decision computed inside the aggregation lock, executed
/// outside it.
enum Step<T, E> {
    Resolve(T),
    Reject(E),
}

struct AllState<T> {
    /// Success values by operand position.
    slots: Vec<Option<T>>,
    /// Operands still pending.
    remaining: usize,
    /// Set once the aggregate has resolved or rejected.
    done: bool,
}

/// Combines every operand's value, in operand order.
///
/// Succeeds with the ordered vector of all values iff every operand
/// succeeds; fails with the first observed operand failure. An empty
/// operand set succeeds immediately with `vec![]`.
///
/// ```
/// use pledge::{all, Promise};
///
/// let combined = all(vec![
///     Promise::<i32, &str>::resolved(1),
///     Promise::resolved(2),
///     Promise::resolved(3),
/// ]);
/// assert_eq!(combined.wait(), Ok(vec![1, 2, 3]));
/// ```
pub fn all<T, E, I>(promises: I) -> Promise<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let operands: Vec<Promise<T, E>> = promises.into_iter().collect();
    if operands.is_empty() {
        return Promise::resolved(Vec::new());
    }

    let result = Promise::pending();
    let count = operands.len();
    let state = Arc::new(Mutex::new(AllState {
        slots: (0..count).map(|_| None).collect(),
        remaining: count,
        done: false,
    }));
    tracing::trace!(target: "pledge::combinator", operands = count, "all: wired");

    for (index, operand) in operands.iter().enumerate() {
        let state = Arc::clone(&state);
        let seal = result.clone();
        operand.on_complete(move |outcome| {
            let step = {
                let mut aggregate = state.lock();
                if aggregate.done {
                    None
                } else {
                    match outcome {
                        Ok(value) => {
                            aggregate.slots[index] = Some(value);
                            aggregate.remaining -= 1;
                            if aggregate.remaining == 0 {
                                aggregate.done = true;
                                let values: Vec<T> =
                                    aggregate.slots.drain(..).flatten().collect();
                                Some(Step::Resolve(values))
                            } else {
                                None
                            }
                        }
                        Err(error) => {
                            aggregate.done = true;
                            Some(Step::Reject(error))
                        }
                    }
                }
            };
            // Completing the aggregate runs user observers; never do
            // that while holding the aggregation lock.
            match step {
                Some(Step::Resolve(values)) => seal.resolve(values),
                Some(Step::Reject(error)) => seal.reject(error),
                None => {}
            }
        });
    }
    result
}

struct PairState<A, B> {
    left: Option<A>,
    right: Option<B>,
    done: bool,
}

impl<A, B> PairState<A, B> {
    /// Takes both values once both sides have succeeded.
    fn take_pair(&mut self) -> Option<(A, B)> {
        if self.left.is_some() && self.right.is_some() {
            self.done = true;
            self.left.take().zip(self.right.take())
        } else {
            None
        }
    }
}

/// Two-operand [`all`] with heterogeneous value types.
pub fn all2<A, B, E>(first: &Promise<A, E>, second: &Promise<B, E>) -> Promise<(A, B), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let result = Promise::pending();
    let state = Arc::new(Mutex::new(PairState {
        left: None,
        right: None,
        done: false,
    }));

    {
        let state = Arc::clone(&state);
        let seal = result.clone();
        first.on_complete(move |outcome| {
            let step = {
                let mut pair = state.lock();
                if pair.done {
                    None
                } else {
                    match outcome {
                        Ok(value) => {
                            pair.left = Some(value);
                            pair.take_pair().map(Step::Resolve)
                        }
                        Err(error) => {
                            pair.done = true;
                            Some(Step::Reject(error))
                        }
                    }
                }
            };
            match step {
                Some(Step::Resolve(values)) => seal.resolve(values),
                Some(Step::Reject(error)) => seal.reject(error),
                None => {}
            }
        });
    }
    {
        let seal = result.clone();
        second.on_complete(move |outcome| {
            let step = {
                let mut pair = state.lock();
                if pair.done {
                    None
                } else {
                    match outcome {
                        Ok(value) => {
                            pair.right = Some(value);
                            pair.take_pair().map(Step::Resolve)
                        }
                        Err(error) => {
                            pair.done = true;
                            Some(Step::Reject(error))
                        }
                    }
                }
            };
            match step {
                Some(Step::Resolve(values)) => seal.resolve(values),
                Some(Step::Reject(error)) => seal.reject(error),
                None => {}
            }
        });
    }
    result
}

/// Three-operand [`all`] with heterogeneous value types.
pub fn all3<A, B, C, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
) -> Promise<(A, B, C), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    all2(&all2(first, second), third).map(|((a, b), c)| (a, b, c))
}

/// Four-operand [`all`] with heterogeneous value types.
pub fn all4<A, B, C, D, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
    fourth: &Promise<D, E>,
) -> Promise<(A, B, C, D), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    all2(&all2(first, second), &all2(third, fourth)).map(|((a, b), (c, d))| (a, b, c, d))
}

/// Five-operand [`all`] with heterogeneous value types.
pub fn all5<A, B, C, D, F, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
    fourth: &Promise<D, E>,
    fifth: &Promise<F, E>,
) -> Promise<(A, B, C, D, F), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
    F: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    all2(&all4(first, second, third, fourth), fifth).map(|((a, b, c, d), f)| (a, b, c, d, f))
}
