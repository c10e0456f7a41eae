//! Failures the library synthesizes itself.
//!
//! Combinators never invent failures of the caller's error type. The few
//! places where the library must fail on its own behalf — an empty
//! operand set handed to [`any`](crate::any), a predicate or unwrap that
//! did not hold — either take the error from the caller explicitly
//! ([`Promise::ensure`](crate::Promise::ensure),
//! [`Promise::compact_map`](crate::Promise::compact_map)) or require
//! `E: From<Error>` and convert one of the variants below.
//!
//! Applications that do not carry their own error type can use [`Error`]
//! directly as the `E` parameter of their promises.

use thiserror::Error as ThisError;

/// Failures produced by the library itself rather than by a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// [`any`](crate::any) was given no operands, so no operand could
    /// ever succeed.
    #[error("aggregate over an empty operand set")]
    EmptyAggregate,

    /// A validation predicate did not hold for an otherwise successful
    /// value.
    #[error("validation predicate failed")]
    PredicateFailed,

    /// A transform expected to produce a value produced none.
    #[error("no value found after transformation")]
    MissingValue,

    /// An operation was raced against a deadline and the deadline won.
    #[error("operation timed out")]
    Timeout,
}
