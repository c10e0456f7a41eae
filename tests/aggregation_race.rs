//! Randomized-timing trials for the aggregation combinators.
//!
//! Detection of "all operands finished" races against the operands'
//! completion threads, so these properties only mean something when the
//! completion order is shuffled: positional ordering of `all` results,
//! single resolution of the aggregate, and `any`'s success/absence
//! placement must hold on every interleaving.

#[macro_use]
mod common;

use pledge::{all, any, Error, Promise};
use rand::Rng;
use std::thread;
use std::time::Duration;

fn init_test(name: &str) {
    common::init_test_logging();
    test_phase!(name);
}

/// Completes each operand from its own thread after a random delay.
fn complete_with_jitter<T, F>(operands: Vec<Promise<T, Error>>, outcome: F)
where
    T: Clone + Send + 'static,
    F: Fn(usize) -> Result<T, Error> + Send + Sync + 'static + Copy,
{
    let handles: Vec<_> = operands
        .into_iter()
        .enumerate()
        .map(|(index, operand)| {
            thread::spawn(move || {
                let delay = rand::thread_rng().gen_range(0..5);
                thread::sleep(Duration::from_millis(delay));
                operand.complete(outcome(index));
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("completer thread");
    }
}

#[test]
fn all_result_order_is_positional_on_every_interleaving() {
    init_test("all_result_order_is_positional_on_every_interleaving");
    for trial in 0..50 {
        let operands: Vec<Promise<usize, Error>> = (0..4).map(|_| Promise::pending()).collect();
        let combined = all(operands.clone());

        complete_with_jitter(operands, |index| Ok(index * 10));

        let result = combined.wait();
        let expected: Vec<usize> = (0..4).map(|i| i * 10).collect();
        assert_with_log!(
            result == Ok(expected.clone()),
            "positional order under race",
            (trial, expected),
            (trial, result)
        );
    }
    test_complete!("all_result_order_is_positional_on_every_interleaving");
}

#[test]
fn all_with_one_failure_rejects_on_every_interleaving() {
    init_test("all_with_one_failure_rejects_on_every_interleaving");
    for trial in 0..50 {
        let operands: Vec<Promise<usize, Error>> = (0..4).map(|_| Promise::pending()).collect();
        let combined = all(operands.clone());

        // Operand 2 fails; the others succeed.
        complete_with_jitter(operands, |index| {
            if index == 2 {
                Err(Error::PredicateFailed)
            } else {
                Ok(index)
            }
        });

        let result = combined.wait();
        assert_with_log!(
            result == Err(Error::PredicateFailed),
            "failure surfaced",
            (trial, Err::<Vec<usize>, _>(Error::PredicateFailed)),
            (trial, result)
        );
    }
    test_complete!("all_with_one_failure_rejects_on_every_interleaving");
}

#[test]
fn any_absence_placement_is_positional_on_every_interleaving() {
    init_test("any_absence_placement_is_positional_on_every_interleaving");
    for trial in 0..50 {
        let operands: Vec<Promise<usize, Error>> = (0..4).map(|_| Promise::pending()).collect();
        let merged = any(operands.clone());

        // Odd positions fail, even positions succeed.
        complete_with_jitter(operands, |index| {
            if index % 2 == 1 {
                Err(Error::Timeout)
            } else {
                Ok(index)
            }
        });

        let result = merged.wait();
        let expected = vec![Some(0), None, Some(2), None];
        assert_with_log!(
            result == Ok(expected.clone()),
            "absence placement",
            (trial, expected),
            (trial, result)
        );
    }
    test_complete!("any_absence_placement_is_positional_on_every_interleaving");
}

#[test]
fn racing_writers_on_one_promise_settle_once() {
    init_test("racing_writers_on_one_promise_settle_once");
    for _ in 0..50 {
        let promise: Promise<usize, Error> = Promise::pending();
        let handles: Vec<_> = (0..4)
            .map(|value| {
                let writer = promise.clone();
                thread::spawn(move || {
                    let delay = rand::thread_rng().gen_range(0..3);
                    thread::sleep(Duration::from_millis(delay));
                    writer.resolve(value);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        let first = promise.wait();
        let second = promise.wait();
        assert_with_log!(first == second, "settled exactly once", first, second);
    }
    test_complete!("racing_writers_on_one_promise_settle_once");
}
