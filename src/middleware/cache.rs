use http::header::{CACHE_CONTROL, HeaderValue};

use super::{Middleware, from_fn};
use crate::handler::handler_fn;

/// One year, publicly cacheable.
const STATIC_ASSETS: &str = "public, max-age=31536000";

/// Marks every response as a long-lived public asset.
///
/// The header is set unconditionally, before the handler runs. Attach it only
/// to routes that serve fingerprinted static files.
pub fn cache_static_assets() -> Middleware {
    from_fn(|next| {
        handler_fn(move |w, req| {
            w.headers_mut().insert(CACHE_CONTROL, HeaderValue::from_static(STATIC_ASSETS));
            next(w, req);
        })
    })
}
