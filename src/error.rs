//! Unified error type.

use std::fmt;

use http::Method;

/// The error type returned by switchyard's fallible operations.
///
/// Application-level errors (404, 405, 500, 504) are written to the
/// response, not returned as `Error`s. This type surfaces registration
/// mistakes and infrastructure failures: binding to a port, accepting a
/// connection, or a handler that panicked with nothing to recover it.
#[derive(Debug)]
pub enum Error {
    /// Socket-level failure.
    Io(std::io::Error),
    /// The matcher rejected the route key.
    InvalidRoute {
        route: String,
        source: matchit::InsertError,
    },
    /// The same method and path were registered twice.
    RouteConflict { method: Method, path: String },
    /// The handler panicked and no recovery middleware caught it.
    Aborted(tokio::task::JoinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::InvalidRoute { route, source } => write!(f, "invalid route `{route}`: {source}"),
            Self::RouteConflict { method, path } => {
                write!(f, "route `{method} {path}` is already registered")
            }
            Self::Aborted(e) => write!(f, "request aborted: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidRoute { source, .. } => Some(source),
            Self::RouteConflict { .. } => None,
            Self::Aborted(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
