//! Fan-in aggregation over multiple promises.
//!
//! This module provides the two aggregation families:
//!
//! - [`all`]: succeed iff **every** operand succeeds; empty input
//!   succeeds with an empty vector.
//! - [`any`]: wait for every operand to reach a terminal state and
//!   succeed iff **at least one** succeeded; empty input fails.
//!
//! Both come with fixed-arity tuple overloads ([`all2`]…[`all5`],
//! [`any2`]…[`any5`]) for heterogeneous element types. Semantics are
//! identical to the general forms restricted to that arity; the
//! overloads exist purely so callers get tuples instead of homogeneous
//! vectors.
//!
//! Each aggregation call owns exactly one mutex making its "have all
//! operands finished" check atomic. Operands never share locks across
//! aggregation calls, and no global lock exists.

mod all;
mod any;

pub use all::{all, all2, all3, all4, all5};
pub use any::{any, any2, any3, any4, any5};
