//! Handler type and type erasure.
//!
//! # How handlers are stored
//!
//! The router holds handlers of *different* closure types in one table, and
//! middleware must be able to wrap any of them. Both needs are met by a single
//! trait object type, [`BoxedHandler`]:
//!
//! ```text
//! fn hello(w: &mut dyn ResponseWriter, req: &Request) { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! Arc::new(hello)                                            ← BoxedHandler
//!        ↓ chain.then(handler)
//! m0(m1(…(handler)))                                          ← still a BoxedHandler
//!        ↓
//! handler(&mut tracker, &req)  at request time               ← one vtable call
//! ```
//!
//! Handlers are synchronous. The server runs each request on tokio's blocking
//! pool, so a handler may block on I/O without stalling other connections.

use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership: registering the same
/// handler twice, or wrapping it in middleware, never copies it.
pub type BoxedHandler = Arc<dyn Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static>;

/// Boxes a closure as a [`BoxedHandler`].
///
/// Prefer this over `Arc::new` when writing middleware: the `Fn` bound lets
/// the compiler infer the closure's argument types.
///
/// ```rust
/// use switchyard::{handler_fn, BoxedHandler};
///
/// let hello: BoxedHandler = handler_fn(|w, _req| w.write(b"hello"));
/// ```
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    Arc::new(f)
}
