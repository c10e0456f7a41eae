//! Deferred values with composable combinators.
//!
//! `pledge` provides a single-assignment container — [`Promise`] — that
//! transitions at most once from pending to a terminal success/failure
//! state and notifies every registered observer exactly once, in
//! registration order, each on its requested execution context. On top of
//! that core sits a library of pure combinators:
//!
//! - [`Promise::map`] / [`Promise::flat_map`]: sequential chaining
//! - [`Promise::recover`] / [`Promise::map_err`]: error recovery
//! - [`all`]: fan-in requiring every operand to succeed
//! - [`any`]: fan-in requiring at least one operand to succeed
//! - [`Promise::and`] / [`Promise::or`]: pairing and choice
//! - [`Promise::ensure`]: predicate validation
//! - [`Promise::sleep`]: timer-delayed delivery
//! - [`Promise::fold`] / [`Promise::reduce`]: left-to-right accumulation
//! - [`Promise::wait`] and `.await`: bridges to blocking and async callers
//!
//! # Producers and consumers
//!
//! A *producer* creates a promise, hands out clones of the handle, and
//! eventually calls exactly one of [`Promise::resolve`] or
//! [`Promise::reject`], from any thread. *Consumers* register
//! continuations via [`Promise::on_success`] / [`Promise::on_failure`] /
//! [`Promise::on_complete`] or compose new promises with combinators.
//! Completion is producer-exclusive by convention, not by type
//! enforcement: every handle can complete, and the first writer wins.
//!
//! ```
//! use pledge::Promise;
//!
//! let doubled: Promise<i32, &str> = Promise::resolved(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| Promise::resolved(x + 1));
//! assert_eq!(doubled.wait(), Ok(21));
//! ```
//!
//! # Execution contexts
//!
//! Every registration and combinator has an `_on` variant taking a
//! [`Dispatcher`], which names where the continuation runs: inline in the
//! completing thread, or enqueued on a [`SerialQueue`]. The plain
//! variants run inline. There is no ambient global queue; applications
//! create their own [`SerialQueue`] / [`Timer`] instances and pass them
//! where needed.
//!
//! # Concurrency model
//!
//! Any thread may complete a promise; any thread may register an
//! observer. Each promise guards its (result slot, observer list) pair
//! with one short critical section and never invokes user callbacks while
//! holding it. Only [`Promise::wait`] and the `.await` bridge suspend the
//! caller; everything else returns immediately.

pub mod combinator;
pub mod dispatch;
mod either;
mod error;
pub mod promise;

#[cfg(test)]
mod test_utils;

pub use combinator::{all, all2, all3, all4, all5, any, any2, any3, any4, any5};
pub use dispatch::{Dispatcher, SerialQueue, Timer};
pub use either::Either;
pub use error::Error;
pub use promise::{Awaiting, Promise};
