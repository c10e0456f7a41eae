//! Execution contexts for continuations.
//!
//! A [`Dispatcher`] names where a continuation runs once the value it is
//! waiting on completes: inline in whatever thread performed the
//! completion, or enqueued onto a [`SerialQueue`] — a FIFO worker thread.
//! A [`Timer`] schedules jobs for a future instant and drives the
//! [`sleep`](crate::Promise::sleep) combinator.
//!
//! There is intentionally no ambient default queue. Applications create
//! the queues and timers they need and pass them explicitly; a promise
//! library has no business owning a hidden "main thread".

mod queue;
mod timer;

pub use queue::SerialQueue;
pub use timer::Timer;

/// A boxed unit of work handed to a queue or timer.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where a continuation runs.
///
/// Cheap to clone; cloning a queue-backed dispatcher shares the
/// underlying worker.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    kind: Kind,
}

#[derive(Debug, Clone, Default)]
enum Kind {
    /// Run in the thread that completes the upstream value.
    #[default]
    Inline,
    /// Enqueue onto a serial worker.
    Queue(SerialQueue),
}

impl Dispatcher {
    /// A dispatcher that runs continuations inline, synchronously in the
    /// completing thread.
    #[must_use]
    pub fn inline() -> Self {
        Self { kind: Kind::Inline }
    }

    /// A dispatcher that enqueues continuations onto `queue`.
    #[must_use]
    pub fn queue(queue: &SerialQueue) -> Self {
        Self {
            kind: Kind::Queue(queue.clone()),
        }
    }

    /// Returns true if continuations run inline.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.kind, Kind::Inline)
    }

    /// Runs `job` on this dispatcher: immediately for an inline
    /// dispatcher, enqueued for a queue-backed one.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        match &self.kind {
            Kind::Inline => job(),
            Kind::Queue(queue) => queue.submit(job),
        }
    }
}
