//! # switchyard
//!
//! A minimal HTTP router: method + path to handler, an ordered middleware
//! chain around each handler, and an optional log line per request carrying
//! the status the client actually received.
//!
//! ## The model
//!
//! - Handlers are synchronous: `fn(&mut dyn ResponseWriter, &Request)`.
//! - [`Middleware`](middleware::Middleware) maps a handler to a handler. The
//!   first middleware given is the outermost layer.
//! - Middleware is composed when a route is *registered*. Dispatch is one
//!   table lookup and one call.
//! - Derived routers ([`Router::with_middleware`], [`Router::group`]) share the
//!   route table but never the chain, so scoped middleware cannot leak.
//! - Paths are literal. No parameters, no wildcards.
//!
//! What the router answers on its own: `404 Not Found` for an unknown path and
//! `405 Method Not Allowed` (with `Allow`) for a known path with the wrong
//! method. Everything else, including 500 on panic and 504 on deadline, comes
//! from middleware you compose in.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use switchyard::{middleware, Request, RequestLogger, ResponseWriter, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Router::new().with_middleware([
//!         middleware::recover_panic(),
//!         middleware::timeout(Duration::from_secs(5)),
//!     ]);
//!     app.set_logger(Some(RequestLogger::tracing()));
//!     app.set_prefix("api");
//!     app.get("users", list_users).post("users", create_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! fn list_users(w: &mut dyn ResponseWriter, _req: &Request) {
//!     w.headers_mut().insert("content-type", "application/json".parse().unwrap());
//!     w.write(br#"[{"id":1}]"#);
//! }
//!
//! fn create_user(w: &mut dyn ResponseWriter, req: &Request) {
//!     if req.body().is_empty() {
//!         w.error(http::StatusCode::BAD_REQUEST, "empty body");
//!         return;
//!     }
//!     w.set_status(http::StatusCode::CREATED);
//! }
//! ```

mod context;
mod error;
mod handler;
mod logger;
mod mux;
mod request;
mod response;
mod router;
mod server;
mod tracker;

#[cfg(test)]
mod test_support;

pub mod middleware;

pub use context::{Context, ContextError};
pub use error::Error;
pub use handler::{BoxedHandler, handler_fn};
pub use logger::{LogRecord, LogSink, RequestLogger, TracingSink};
pub use request::Request;
pub use response::{BufferedResponse, ResponseWriter};
pub use router::Router;
pub use server::Server;
pub use tracker::ResponseTracker;
