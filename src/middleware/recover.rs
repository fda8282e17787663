use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::error;

use super::{Middleware, from_fn};
use crate::handler::handler_fn;

/// Turns a panicking handler into a `500 Internal Server Error`.
///
/// The panic is logged at error level with its message, the request URI and
/// method, and the state of the request context. Whatever the handler already
/// wrote stays written; if it had committed a status, the 500 is ignored by
/// the writer and only the error body is appended.
///
/// Only unwinding panics can be caught. With `panic = "abort"` the process
/// still dies.
pub fn recover_panic() -> Middleware {
    from_fn(|next| {
        handler_fn(move |w, req| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| next(&mut *w, req)));
            if let Err(payload) = outcome {
                let ctx_err = req.context().err().map(|e| e.to_string());
                error!(
                    panic = panic_message(&*payload),
                    ctx_err = ctx_err.as_deref().unwrap_or("none"),
                    url = %req.uri(),
                    method = %req.method(),
                    "recovered from panic"
                );
                w.error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        })
    })
}

/// Best-effort text of a panic payload. `panic!` produces `&str` or `String`.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
