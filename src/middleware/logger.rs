use std::sync::Arc;

use tracing::Level;

use super::{Middleware, from_fn};
use crate::handler::handler_fn;
use crate::logger::{LogRecord, LogSink};

/// Logs each request on the way in, before the handler runs.
///
/// The record has no status. For a line that includes the final status, attach
/// a [`RequestLogger`](crate::RequestLogger) to the router instead.
pub fn log_requests(sink: Arc<dyn LogSink>) -> Middleware {
    from_fn(move |next| {
        let sink = Arc::clone(&sink);
        handler_fn(move |w, req| {
            sink.log(Level::INFO, &LogRecord::from_request(req, None));
            next(w, req);
        })
    })
}
