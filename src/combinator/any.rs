//! Fan-in requiring at least one operand to succeed.
//!
//! # Semantics
//!
//! `any([p0, p1, ..., pn])` resolves only once **every** operand has
//! reached a terminal state — the name is a false friend; this is not a
//! first-success race:
//!
//! 1. Register a completion observer on every operand.
//! 2. Record each terminal outcome in its operand's position slot.
//! 3. Once all operands are terminal: succeed with
//!    `Vec<Option<T>>` (failed operands map to `None`) if at least one
//!    operand succeeded, otherwise fail with one arbitrarily chosen
//!    operand failure.
//!
//! The empty operand set fails immediately with
//! [`Error::EmptyAggregate`] — no operand could ever succeed. This is
//! the deliberate asymmetry with [`all`](super::all), whose empty input
//! succeeds.

use crate::error::Error;
use crate::promise::Promise;
use parking_lot::Mutex;
use std::sync::Arc;

enum Step<T, E> {
    Resolve(T),
    Reject(E),
}

struct AnyState<T, E> {
    /// Per-operand terminal outcome: outer `None` = still pending,
    /// `Some(None)` = failed, `Some(Some(v))` = succeeded.
    slots: Vec<Option<Option<T>>>,
    /// Operands still pending.
    remaining: usize,
    /// The first failure observed, surfaced only if nothing succeeds.
    first_error: Option<E>,
}

/// Combines operands where at least one must succeed.
///
/// Resolves once all operands are terminal (never earlier — a pending
/// operand holds the aggregate open even if another operand already
/// succeeded). Succeeds with per-operand `Option`s in operand order iff
/// at least one operand succeeded; otherwise fails with an arbitrarily
/// chosen operand failure. An empty operand set fails immediately with
/// [`Error::EmptyAggregate`].
///
/// ```
/// use pledge::{any, Error, Promise};
///
/// let merged: Promise<Vec<Option<i32>>, Error> = any(vec![
///     Promise::resolved(1),
///     Promise::rejected(Error::Timeout),
/// ]);
/// assert_eq!(merged.wait(), Ok(vec![Some(1), None]));
/// ```
pub fn any<T, E, I>(promises: I) -> Promise<Vec<Option<T>>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static + From<Error>,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let operands: Vec<Promise<T, E>> = promises.into_iter().collect();
    if operands.is_empty() {
        return Promise::rejected(Error::EmptyAggregate.into());
    }

    let result = Promise::pending();
    let count = operands.len();
    let state = Arc::new(Mutex::new(AnyState {
        slots: (0..count).map(|_| None).collect(),
        remaining: count,
        first_error: None,
    }));
    tracing::trace!(target: "pledge::combinator", operands = count, "any: wired");

    for (index, operand) in operands.iter().enumerate() {
        let state = Arc::clone(&state);
        let seal = result.clone();
        operand.on_complete(move |outcome| {
            let step = {
                let mut aggregate = state.lock();
                match outcome {
                    Ok(value) => aggregate.slots[index] = Some(Some(value)),
                    Err(error) => {
                        aggregate.slots[index] = Some(None);
                        if aggregate.first_error.is_none() {
                            aggregate.first_error = Some(error);
                        }
                    }
                }
                aggregate.remaining -= 1;
                if aggregate.remaining == 0 {
                    let values: Vec<Option<T>> =
                        aggregate.slots.drain(..).map(Option::flatten).collect();
                    if values.iter().any(Option::is_some) {
                        Some(Step::Resolve(values))
                    } else {
                        let error = aggregate.first_error.take().unwrap_or_else(|| {
                            // All operands terminal, none succeeded: at
                            // least one failure was recorded above.
                            unreachable!("aggregate finished without any recorded outcome")
                        });
                        Some(Step::Reject(error))
                    }
                } else {
                    None
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

struct AnyPairState<A, B, E> {
    left: Option<Option<A>>,
    right: Option<Option<B>>,
    first_error: Option<E>,
}

impl<A, B, E> AnyPairState<A, B, E> {
    /// Settles the pair once both sides are terminal.
    fn settle(&mut self) -> Option<Step<(Option<A>, Option<B>), E>> {
        if self.left.is_some() && self.right.is_some() {
            let left = self.left.take().flatten();
            let right = self.right.take().flatten();
            if left.is_some() || right.is_some() {
                Some(Step::Resolve((left, right)))
            } else {
                let error = self.first_error.take().unwrap_or_else(|| {
                    // Both sides terminal and neither succeeded, so a
                    // failure was recorded.
                    unreachable!("pair settled without any recorded outcome")
                });
                Some(Step::Reject(error))
            }
        } else {
            None
        }
    }
}

/// Two-operand [`any`] with heterogeneous value types.
///
/// Like the general form, resolves only once both operands are
/// terminal.
pub fn any2<A, B, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
) -> Promise<(Option<A>, Option<B>), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let result = Promise::pending();
    let state = Arc::new(Mutex::new(AnyPairState {
        left: None,
        right: None,
        first_error: None,
    }));

    {
        let state = Arc::clone(&state);
        let seal = result.clone();
        first.on_complete(move |outcome| {
            let step = {
                let mut pair = state.lock();
                match outcome {
                    Ok(value) => pair.left = Some(Some(value)),
                    Err(error) => {
                        pair.left = Some(None);
                        if pair.first_error.is_none() {
                            pair.first_error = Some(error);
                        }
                    }
                }
                pair.settle()
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
                match outcome {
                    Ok(value) => pair.right = Some(Some(value)),
                    Err(error) => {
                        pair.right = Some(None);
                        if pair.first_error.is_none() {
                            pair.first_error = Some(error);
                        }
                    }
                }
                pair.settle()
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

/// Three-operand [`any`] with heterogeneous value types.
pub fn any3<A, B, C, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
) -> Promise<(Option<A>, Option<B>, Option<C>), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    any2(&any2(first, second), third).map(|(pair, c)| match pair {
        Some((a, b)) => (a, b, c),
        None => (None, None, c),
    })
}

/// Four-operand [`any`] with heterogeneous value types.
pub fn any4<A, B, C, D, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
    fourth: &Promise<D, E>,
) -> Promise<(Option<A>, Option<B>, Option<C>, Option<D>), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    any2(&any2(first, second), &any2(third, fourth)).map(|(left, right)| {
        let (a, b) = left.map_or((None, None), |(a, b)| (a, b));
        let (c, d) = right.map_or((None, None), |(c, d)| (c, d));
        (a, b, c, d)
    })
}

/// Five-operand [`any`] with heterogeneous value types.
pub fn any5<A, B, C, D, F, E>(
    first: &Promise<A, E>,
    second: &Promise<B, E>,
    third: &Promise<C, E>,
    fourth: &Promise<D, E>,
    fifth: &Promise<F, E>,
) -> Promise<(Option<A>, Option<B>, Option<C>, Option<D>, Option<F>), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
    F: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    any2(&any4(first, second, third, fourth), fifth).map(|(quad, f)| {
        let (a, b, c, d) = quad.map_or((None, None, None, None), |(a, b, c, d)| (a, b, c, d));
        (a, b, c, d, f)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn empty_input_fails_immediately() {
        init_test("empty_input_fails_immediately");
        let merged: Promise<Vec<Option<i32>>, Error> = any(Vec::new());
        let result = merged.result();
        crate::assert_with_log!(
            result == Some(Err(Error::EmptyAggregate)),
            "empty any",
            Some(Err::<Vec<Option<i32>>, Error>(Error::EmptyAggregate)),
            result
        );
        crate::test_complete!("empty_input_fails_immediately");
    }

    #[test]
    fn failed_operands_map_to_none() {
        init_test("failed_operands_map_to_none");
        let merged: Promise<Vec<Option<i32>>, Error> = any(vec![
            Promise::resolved(1),
            Promise::rejected(Error::Timeout),
            Promise::resolved(3),
        ]);
        let result = merged.wait();
        crate::assert_with_log!(
            result == Ok(vec![Some(1), None, Some(3)]),
            "partial success",
            Ok::<Vec<Option<i32>>, Error>(vec![Some(1), None, Some(3)]),
            result
        );
        crate::test_complete!("failed_operands_map_to_none");
    }

    #[test]
    fn all_failures_reject() {
        init_test("all_failures_reject");
        let merged: Promise<Vec<Option<i32>>, Error> = any(vec![
            Promise::rejected(Error::Timeout),
            Promise::rejected(Error::PredicateFailed),
        ]);
        let result = merged.wait();
        crate::assert_with_log!(result.is_err(), "all failed", true, result.is_err());
        crate::test_complete!("all_failures_reject");
    }

    #[test]
    fn success_does_not_resolve_early() {
        init_test("success_does_not_resolve_early");
        let pending: Promise<i32, Error> = Promise::pending();
        let merged = any(vec![pending.clone(), Promise::resolved(2)]);

        let early = merged.wait_timeout(std::time::Duration::from_millis(50));
        crate::assert_with_log!(early.is_none(), "held open", true, early.is_none());

        pending.reject(Error::Timeout);
        let result = merged.wait();
        crate::assert_with_log!(
            result == Ok(vec![None, Some(2)]),
            "resolved after all terminal",
            Ok::<Vec<Option<i32>>, Error>(vec![None, Some(2)]),
            result
        );
        crate::test_complete!("success_does_not_resolve_early");
    }

    #[test]
    fn any2_mixes_heterogeneous_types() {
        init_test("any2_mixes_heterogeneous_types");
        let number: Promise<i32, &str> = Promise::rejected("down");
        let text: Promise<&str, &str> = Promise::resolved("up");
        let merged = any2(&number, &text);
        let result = merged.wait();
        crate::assert_with_log!(
            result == Ok((None, Some("up"))),
            "mixed pair",
            Ok::<(Option<i32>, Option<&str>), &str>((None, Some("up"))),
            result
        );
        crate::test_complete!("any2_mixes_heterogeneous_types");
    }

    #[test]
    fn any2_rejects_when_both_fail() {
        init_test("any2_rejects_when_both_fail");
        let a: Promise<i32, &str> = Promise::rejected("first");
        let b: Promise<i32, &str> = Promise::rejected("second");
        let merged = any2(&a, &b);
        let result = merged.wait();
        crate::assert_with_log!(result.is_err(), "both failed", true, result.is_err());
        crate::test_complete!("any2_rejects_when_both_fail");
    }

    #[test]
    fn any3_through_any5_flatten_tuples() {
        init_test("any3_through_any5_flatten_tuples");
        let a: Promise<i32, &str> = Promise::resolved(1);
        let b: Promise<&str, &str> = Promise::rejected("down");
        let c: Promise<bool, &str> = Promise::resolved(true);
        let d: Promise<i32, &str> = Promise::rejected("down");
        let e: Promise<i32, &str> = Promise::resolved(5);

        let triple = any3(&a, &b, &c).wait();
        crate::assert_with_log!(
            triple == Ok((Some(1), None, Some(true))),
            "triple",
            Ok::<(Option<i32>, Option<&str>, Option<bool>), &str>((Some(1), None, Some(true))),
            triple
        );

        let quad = any4(&a, &b, &c, &d).wait();
        crate::assert_with_log!(
            quad == Ok((Some(1), None, Some(true), None)),
            "quad",
            Ok((Some(1), None, Some(true), None)),
            quad
        );

        let quint = any5(&a, &b, &c, &d, &e).wait();
        crate::assert_with_log!(
            quint == Ok((Some(1), None, Some(true), None, Some(5))),
            "quint",
            Ok((Some(1), None, Some(true), None, Some(5))),
            quint
        );
        crate::test_complete!("any3_through_any5_flatten_tuples");
    }
}
