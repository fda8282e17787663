use std::time::Duration;

use http::StatusCode;
use tracing::warn;

use super::{Middleware, from_fn};
use crate::context::ContextError;
use crate::handler::handler_fn;

/// Bounds the downstream handler by `limit`.
///
/// The handler receives a copy of the request whose [`Context`] expires after
/// `limit` (or earlier, if the incoming context already had a tighter
/// deadline). Nothing is interrupted: once the handler returns, the context is
/// canceled, and if it had run out of time the middleware sends
/// `504 Gateway Timeout`. A handler that already committed a status keeps it.
///
/// Long-running handlers should poll [`Context::is_done`] and return early.
///
/// [`Context`]: crate::Context
/// [`Context::is_done`]: crate::Context::is_done
pub fn timeout(limit: Duration) -> Middleware {
    from_fn(move |next| {
        handler_fn(move |w, req| {
            let ctx = req.context().with_timeout(limit);
            next(&mut *w, &req.with_context(ctx.clone()));

            ctx.cancel();
            if ctx.err() == Some(ContextError::DeadlineExceeded) {
                warn!(
                    method = %req.method(),
                    path = req.request_uri(),
                    limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "handler exceeded its deadline"
                );
                w.set_status(StatusCode::GATEWAY_TIMEOUT);
            }
        })
    })
}
