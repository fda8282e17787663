//! Per-request log records.
//!
//! Logging is opt-in and injected. A [`RequestLogger`] wraps a [`LogSink`];
//! attach it with [`Router::set_logger`](crate::Router::set_logger) and the
//! router emits one [`LogRecord`] per request after the handler returns:
//! `INFO` below 400, `ERROR` from 400 up.
//!
//! [`TracingSink`] forwards records as `tracing` events. Tests and
//! applications with their own pipeline implement [`LogSink`] instead.

use std::net::SocketAddr;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::Level;

use crate::request::Request;

/// One request, as seen by the logger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub method: Method,
    /// Path and query string.
    pub path: String,
    pub remote: Option<SocketAddr>,
    pub user_agent: String,
    /// `None` when logged before the handler ran.
    pub status: Option<StatusCode>,
}

impl LogRecord {
    pub fn from_request(req: &Request, status: Option<StatusCode>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.request_uri().to_owned(),
            remote: req.remote_addr(),
            user_agent: req.user_agent().to_owned(),
            status,
        }
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, record: &LogRecord);
}

/// Emits each record as a `tracing` event with structured fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, record: &LogRecord) {
        let remote = record.remote.map(|addr| addr.to_string());
        let remote = remote.as_deref().unwrap_or("-");
        let status = record.status.map(|s| s.as_u16());

        // `tracing` macros need a constant level.
        macro_rules! emit {
            ($macro:ident) => {
                tracing::$macro!(
                    method = %record.method,
                    path = record.path.as_str(),
                    remote,
                    status,
                    user_agent = record.user_agent.as_str(),
                    "request"
                )
            };
        }

        if level == Level::ERROR {
            emit!(error);
        } else if level == Level::WARN {
            emit!(warn);
        } else if level == Level::INFO {
            emit!(info);
        } else if level == Level::DEBUG {
            emit!(debug);
        } else {
            emit!(trace);
        }
    }
}

/// Logs completed requests through a shared [`LogSink`].
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self { sink: Arc::new(sink) }
    }

    pub fn from_shared(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// A logger writing to the current `tracing` subscriber.
    pub fn tracing() -> Self {
        Self::new(TracingSink)
    }

    /// Records one finished request. Statuses from 400 up are errors.
    pub fn log(&self, req: &Request, status: StatusCode) {
        let level = if status.as_u16() >= 400 { Level::ERROR } else { Level::INFO };
        self.sink.log(level, &LogRecord::from_request(req, Some(status)));
    }
}

impl std::fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLogger").finish_non_exhaustive()
    }
}
