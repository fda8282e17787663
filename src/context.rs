//! Per-request cancellation context.
//!
//! Every [`Request`](crate::Request) carries a [`Context`]. The server hands
//! out a background context that never expires; middleware such as
//! [`timeout`](crate::middleware::timeout) derive a child with a deadline and
//! pass a request carrying that child downstream.
//!
//! There is no preemption. A handler that wants to stop early polls
//! [`Context::err`] (or [`Context::is_done`]) between units of work.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Why a context finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextError {
    /// [`Context::cancel`] was called before the deadline.
    Canceled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled => f.write_str("context canceled"),
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

impl std::error::Error for ContextError {}

/// A cheaply clonable cancellation scope. Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    // `None` is the background context.
    scope: Option<Arc<Scope>>,
}

#[derive(Debug)]
struct Scope {
    parent: Context,
    deadline: Option<Instant>,
    done: OnceLock<ContextError>,
}

impl Context {
    /// The root context: no deadline, cannot be canceled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a child that expires after `limit`, or at the parent's
    /// deadline if that comes first.
    ///
    /// A `limit` too large to represent as an [`Instant`] adds no deadline of
    /// its own; the child still inherits the parent's.
    pub fn with_timeout(&self, limit: Duration) -> Self {
        let deadline = match (Instant::now().checked_add(limit), self.deadline()) {
            (Some(own), Some(inherited)) => Some(own.min(inherited)),
            (own, inherited) => own.or(inherited),
        };
        Self {
            scope: Some(Arc::new(Scope {
                parent: self.clone(),
                deadline,
                done: OnceLock::new(),
            })),
        }
    }

    /// The instant this context expires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.scope.as_ref().and_then(|s| s.deadline.or_else(|| s.parent.deadline()))
    }

    /// Time left before the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline().map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Finishes the context. The first cause wins: if the deadline already
    /// passed, the context stays `DeadlineExceeded`. No-op on background.
    pub fn cancel(&self) {
        if let Some(scope) = &self.scope {
            let cause = if scope.expired() {
                ContextError::DeadlineExceeded
            } else {
                ContextError::Canceled
            };
            scope.done.get_or_init(|| cause);
        }
    }

    /// `Some` once the context is finished, its own or its parent's.
    pub fn err(&self) -> Option<ContextError> {
        let scope = self.scope.as_ref()?;
        if let Some(cause) = scope.done.get() {
            return Some(*cause);
        }
        if scope.expired() {
            return Some(*scope.done.get_or_init(|| ContextError::DeadlineExceeded));
        }
        let inherited = scope.parent.err()?;
        Some(*scope.done.get_or_init(|| inherited))
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

impl Scope {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
