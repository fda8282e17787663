//! Middleware layer.
//!
//! A [`Middleware`] turns one handler into another. It is the right place for
//! cross-cutting concerns: logging, panic recovery, cache headers, deadlines.
//!
//! ```rust
//! use switchyard::handler_fn;
//! use switchyard::middleware::{self, Middleware};
//!
//! let powered_by: Middleware = middleware::from_fn(|next| {
//!     handler_fn(move |w, req| {
//!         w.headers_mut().insert("x-powered-by", "switchyard".parse().unwrap());
//!         next(w, req);
//!     })
//! });
//! ```
//!
//! # Ordering
//!
//! A [`Chain`] `[m0, m1, m2]` wraps a handler `h` as `m0(m1(m2(h)))`: `m0` is
//! the outermost layer. It sees the request first and the response last.
//!
//! Composition happens once, when a route is registered. Dispatch never
//! rebuilds a chain.

mod cache;
mod logger;
mod recover;
mod timeout;

use std::sync::Arc;

use crate::handler::BoxedHandler;

pub use cache::cache_static_assets;
pub use logger::log_requests;
pub use recover::recover_panic;
pub use timeout::timeout;

/// A shared `handler -> handler` transformation.
pub type Middleware = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static>;

/// Wraps a closure as a [`Middleware`].
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An ordered list of middleware. First in the list is outermost.
///
/// A chain is never mutated in place. [`Chain::extend`] returns a new chain,
/// so a router derived with extra middleware cannot leak it into its parent
/// or its siblings.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Middleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// `self` followed by `more`, as a fresh chain.
    pub fn extend(&self, more: impl IntoIterator<Item = Middleware>) -> Self {
        let mut layers = self.layers.clone();
        layers.extend(more);
        Self { layers }
    }

    /// Wraps `handler` so that `layers[0]` runs first.
    pub fn then(&self, handler: BoxedHandler) -> BoxedHandler {
        self.layers.iter().rev().fold(handler, |inner, layer| layer(inner))
    }
}

impl FromIterator<Middleware> for Chain {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        Self { layers: iter.into_iter().collect() }
    }
}
