//! A two-case tagged union for branch outcomes.
//!
//! [`Either`] carries the result of choice combinators such as
//! [`Promise::or`](crate::Promise::or): the left case holds the primary
//! branch's value, the right case the fallback's. It is a plain immutable
//! value — no shared state, no lifecycle.

/// A value from exactly one of two branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// The first (primary) branch produced the value.
    Left(L),
    /// The second (fallback) branch produced the value.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns true if this is the left case.
    #[must_use]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns true if this is the right case.
    #[must_use]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Returns the left value, if present.
    #[must_use]
    pub fn left(self) -> Option<L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Returns the right value, if present.
    #[must_use]
    pub fn right(self) -> Option<R> {
        match self {
            Self::Left(_) => None,
            Self::Right(value) => Some(value),
        }
    }

    /// Maps the left case, leaving the right case untouched.
    pub fn map_left<U>(self, transform: impl FnOnce(L) -> U) -> Either<U, R> {
        match self {
            Self::Left(value) => Either::Left(transform(value)),
            Self::Right(value) => Either::Right(value),
        }
    }

    /// Maps the right case, leaving the left case untouched.
    pub fn map_right<U>(self, transform: impl FnOnce(R) -> U) -> Either<L, U> {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => Either::Right(transform(value)),
        }
    }

    /// Rebinds the left case, leaving the right case untouched.
    pub fn flat_map_left<U>(self, transform: impl FnOnce(L) -> Either<U, R>) -> Either<U, R> {
        match self {
            Self::Left(value) => transform(value),
            Self::Right(value) => Either::Right(value),
        }
    }

    /// Rebinds the right case, leaving the left case untouched.
    pub fn flat_map_right<U>(self, transform: impl FnOnce(R) -> Either<L, U>) -> Either<L, U> {
        match self {
            Self::Left(value) => Either::Left(value),
            Self::Right(value) => transform(value),
        }
    }

    /// Case analysis: applies `left` or `right` to whichever value is
    /// present and returns the common result type.
    pub fn either<U>(self, left: impl FnOnce(L) -> U, right: impl FnOnce(R) -> U) -> U {
        match self {
            Self::Left(value) => left(value),
            Self::Right(value) => right(value),
        }
    }
}

impl<L, R> Either<L, R>
where
    R: std::error::Error,
{
    /// Views a left-value-or-right-error as a `Result`.
    pub fn into_result(self) -> Result<L, R> {
        match self {
            Self::Left(value) => Ok(value),
            Self::Right(error) => Err(error),
        }
    }
}

impl<L, R> From<Result<L, R>> for Either<L, R> {
    fn from(result: Result<L, R>) -> Self {
        match result {
            Ok(value) => Self::Left(value),
            Err(error) => Self::Right(error),
        }
    }
}
