//! Request router.
//!
//! A [`Router`] is a registration-time factory. Each route is stored with its
//! middleware already applied; dispatch is one table lookup and one call.
//!
//! Routers derived with [`Router::with_middleware`] or [`Router::group`]
//! register into the *same* table as their parent but carry their own prefix
//! and middleware chain. That is how middleware is scoped to a subset of
//! routes:
//!
//! ```rust
//! use std::time::Duration;
//! use switchyard::{middleware, Request, ResponseWriter, Router};
//!
//! fn index(w: &mut dyn ResponseWriter, _req: &Request) { w.write(b"home") }
//! fn logo(w: &mut dyn ResponseWriter, _req: &Request) { w.write(b"<svg/>") }
//! fn report(w: &mut dyn ResponseWriter, _req: &Request) { w.write(b"42") }
//!
//! let app = Router::new().with_middleware([middleware::recover_panic()]);
//! app.get("/", index);
//!
//! app.with_middleware([middleware::cache_static_assets()])
//!     .get("/static/logo.svg", logo);
//!
//! app.group("/api")
//!     .with_middleware([middleware::timeout(Duration::from_secs(2))])
//!     .get("/report", report);
//! ```

use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use parking_lot::RwLock;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::logger::RequestLogger;
use crate::middleware::{Chain, Middleware};
use crate::mux::{Lookup, Mux};
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::tracker::ResponseTracker;

/// The application router.
///
/// Register every route before serving. Registering while requests are being
/// dispatched is not supported: the table stays consistent, but which
/// requests observe the new route is unspecified.
#[derive(Clone, Default)]
pub struct Router {
    mux: Arc<RwLock<Mux>>,
    prefix: String,
    chain: Chain,
    logger: Option<RequestLogger>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix applied to routes registered on this router *from now on*.
    ///
    /// Normalized to one leading slash and no trailing slash; `""` and `"/"`
    /// clear it. Routes registered earlier keep their paths.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = normalize_prefix(prefix);
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Attach (`Some`) or detach (`None`) the per-request logger.
    pub fn set_logger(&mut self, logger: Option<RequestLogger>) {
        self.logger = logger;
    }

    /// A router sharing this one's route table, with `middleware` appended
    /// after this router's own chain. `self` is not modified.
    pub fn with_middleware(&self, middleware: impl IntoIterator<Item = Middleware>) -> Router {
        Router {
            mux: Arc::clone(&self.mux),
            prefix: self.prefix.clone(),
            chain: self.chain.extend(middleware),
            logger: self.logger.clone(),
        }
    }

    /// A router sharing this one's route table and middleware, mounted under
    /// `prefix` relative to this router's prefix.
    pub fn group(&self, prefix: &str) -> Router {
        Router {
            mux: Arc::clone(&self.mux),
            prefix: format!("{}{}", self.prefix, normalize_prefix(prefix)),
            chain: self.chain.clone(),
            logger: self.logger.clone(),
        }
    }

    /// Registers `handler` for `method` at `path` under this router's prefix,
    /// wrapped in this router's middleware.
    ///
    /// # Errors
    ///
    /// [`Error::RouteConflict`] if the method and resolved path are taken,
    /// [`Error::InvalidRoute`] if the matcher rejects the path.
    pub fn try_handle(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> Result<(), Error> {
        self.try_handle_boxed(method, path, Arc::new(handler))
    }

    /// [`try_handle`](Router::try_handle) for an already boxed handler.
    pub fn try_handle_boxed(
        &self,
        method: Method,
        path: &str,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        let full = join_path(&self.prefix, path);
        let effective = self.chain.then(handler);
        self.mux.write().insert(method, &full, effective)
    }

    /// Registers a route, returning `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate or invalid route. Routes are registered at
    /// start-up, where failing fast beats serving the wrong handler.
    pub fn handle(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        if let Err(e) = self.try_handle(method, path, handler) {
            panic!("{e}");
        }
        self
    }

    pub fn get(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::GET, path, handler)
    }

    pub fn post(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::POST, path, handler)
    }

    pub fn put(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::PUT, path, handler)
    }

    pub fn delete(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::DELETE, path, handler)
    }

    pub fn patch(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::PATCH, path, handler)
    }

    pub fn options(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::OPTIONS, path, handler)
    }

    pub fn head(
        &self,
        path: &str,
        handler: impl Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    ) -> &Self {
        self.handle(Method::HEAD, path, handler)
    }

    /// Dispatches one request.
    ///
    /// Runs the matching route's handler against `w`, or answers
    /// `404 Not Found` / `405 Method Not Allowed` itself. Then, if a logger is
    /// attached, logs the request with the status the client received.
    ///
    /// A handler panic propagates unless a recovery middleware catches it.
    pub fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        let mut tracker = ResponseTracker::new(w);

        // Clone the handler out so the table lock is not held while it runs.
        let lookup = self.mux.read().lookup(req.method(), req.path());
        match lookup {
            Lookup::Found(handler) => handler(&mut tracker, req),
            Lookup::MethodNotAllowed(allowed) => method_not_allowed(&mut tracker, &allowed),
            Lookup::NotFound => tracker.error(StatusCode::NOT_FOUND, "Not Found"),
        }

        if let Some(logger) = &self.logger {
            logger.log(req, tracker.captured_status());
        }
    }
}

fn method_not_allowed(w: &mut dyn ResponseWriter, allowed: &[Method]) {
    let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        w.headers_mut().insert(ALLOW, value);
    }
    w.error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
}

/// `"api/"` → `"/api"`, `"/"` → `""`.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Joins a normalized prefix and a route path with exactly one slash between
/// segments. An empty route resolves to the prefix itself, or `/` at root.
fn join_path(prefix: &str, route: &str) -> String {
    let route = route.trim_matches('/');
    match (prefix.is_empty(), route.is_empty()) {
        (true, true) => "/".to_owned(),
        (false, true) => prefix.to_owned(),
        _ => format!("{prefix}/{route}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::Uri;
    use tracing::Level;

    use super::*;
    use crate::handler::handler_fn;
    use crate::logger::tests::Collect;
    use crate::middleware::from_fn;
    use crate::response::BufferedResponse;

    fn send(router: &Router, method: Method, uri: &str) -> BufferedResponse {
        let mut res = BufferedResponse::new();
        let req = Request::new(method, uri.parse::<Uri>().unwrap());
        router.serve(&mut res, &req);
        res
    }

    fn ok(w: &mut dyn ResponseWriter, _: &Request) {
        w.write(b"ok");
    }

    /// Tags responses with an `x-layer` header per layer passed.
    fn tag(name: &'static str) -> Middleware {
        from_fn(move |next| {
            handler_fn(move |w, req| {
                w.headers_mut().append("x-layer", HeaderValue::from_static(name));
                next(w, req);
            })
        })
    }

    fn layers(res: &BufferedResponse) -> Vec<&str> {
        res.headers().get_all("x-layer").iter().map(|v| v.to_str().unwrap()).collect()
    }

    #[test]
    fn prefix_paths_are_normalized() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix("api/v1"), "/api/v1");
    }

    #[test]
    fn route_paths_are_joined_with_single_slashes() {
        assert_eq!(join_path("", ""), "/");
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("", "users"), "/users");
        assert_eq!(join_path("", "//users/"), "/users");
        assert_eq!(join_path("/api", ""), "/api");
        assert_eq!(join_path("/api", "/"), "/api");
        assert_eq!(join_path("/api", "users/"), "/api/users");
    }

    #[test]
    fn set_prefix_applies_to_later_routes() {
        let mut router = Router::new();
        router.get("/health", ok);
        router.set_prefix("api");
        router.get("users", ok);

        assert_eq!(send(&router, Method::GET, "/api/users").status(), StatusCode::OK);
        assert_eq!(send(&router, Method::GET, "/health").status(), StatusCode::OK);
        assert_eq!(send(&router, Method::GET, "/api/health").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn wrong_method_gets_405_with_allow() {
        let router = Router::new();
        router.get("/items", ok).put("/items", ok);

        let res = send(&router, Method::POST, "/items");
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, PUT");
        assert_eq!(res.body(), b"Method Not Allowed\n");
    }

    #[test]
    fn unknown_path_gets_404() {
        let router = Router::new();
        router.get("/items", ok);

        let res = send(&router, Method::GET, "/nope");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn middleware_does_not_run_for_405() {
        let router = Router::new().with_middleware([tag("outer")]);
        router.get("/items", ok);

        let res = send(&router, Method::DELETE, "/items");
        assert!(layers(&res).is_empty());
    }

    #[test]
    fn derived_routers_do_not_leak_middleware() {
        let base = Router::new();
        let a = base.with_middleware([tag("a")]);
        let b = base.with_middleware([tag("b")]);

        base.get("/plain", ok);
        a.get("/a", ok);
        b.get("/b", ok);
        base.get("/plain-after", ok);

        assert!(layers(&send(&base, Method::GET, "/plain")).is_empty());
        assert!(layers(&send(&base, Method::GET, "/plain-after")).is_empty());
        assert_eq!(layers(&send(&base, Method::GET, "/a")), ["a"]);
        assert_eq!(layers(&send(&base, Method::GET, "/b")), ["b"]);
    }

    #[test]
    fn derived_chains_accumulate_in_order() {
        let outer = Router::new().with_middleware([tag("first")]);
        let inner = outer.with_middleware([tag("second"), tag("third")]);
        inner.get("/deep", ok);

        assert_eq!(layers(&send(&outer, Method::GET, "/deep")), ["first", "second", "third"]);
    }

    #[test]
    fn groups_extend_the_prefix_and_keep_middleware() {
        let mut api = Router::new().with_middleware([tag("api")]);
        api.set_prefix("/api/");
        let v1 = api.group("v1");
        v1.get("/users", ok);

        assert_eq!(api.prefix(), "/api");
        assert_eq!(v1.prefix(), "/api/v1");
        let res = send(&api, Method::GET, "/api/v1/users");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(layers(&res), ["api"]);
    }

    #[test]
    fn duplicate_routes_are_rejected() {
        let router = Router::new();
        router.get("/items", ok);

        let err = router.try_handle(Method::GET, "/items/", ok).unwrap_err();
        assert!(matches!(err, Error::RouteConflict { .. }));
        assert!(router.try_handle(Method::POST, "/items", ok).is_ok());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn chaining_form_panics_on_duplicates() {
        let router = Router::new();
        router.get("/items", ok).get("items", ok);
    }

    #[test]
    fn every_verb_registers_its_method() {
        let router = Router::new();
        router
            .get("/r", ok)
            .post("/r", ok)
            .put("/r", ok)
            .delete("/r", ok)
            .patch("/r", ok)
            .options("/r", ok)
            .head("/r", ok);

        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
            Method::HEAD,
        ] {
            assert_eq!(send(&router, method, "/r").status(), StatusCode::OK);
        }
        assert_eq!(send(&router, Method::TRACE, "/r").status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn logger_sees_the_captured_status() {
        let sink = Arc::new(Collect::default());
        let mut router = Router::new();
        router.set_logger(Some(RequestLogger::from_shared(sink.clone())));
        router.get("/ok", ok);
        router.get("/teapot", |w, _| w.set_status(StatusCode::IM_A_TEAPOT));
        router.get("/empty", |_, _| {});

        send(&router, Method::GET, "/ok?x=1");
        send(&router, Method::GET, "/teapot");
        send(&router, Method::GET, "/empty");
        send(&router, Method::GET, "/missing");

        let records = sink.0.lock().unwrap();
        let seen: Vec<(Level, &str, Option<u16>)> = records
            .iter()
            .map(|(l, r)| (*l, r.path.as_str(), r.status.map(|s| s.as_u16())))
            .collect();
        assert_eq!(
            seen,
            [
                (Level::INFO, "/ok?x=1", Some(200)),
                (Level::ERROR, "/teapot", Some(418)),
                (Level::INFO, "/empty", Some(200)),
                (Level::ERROR, "/missing", Some(404)),
            ]
        );
    }

    #[test]
    fn no_logger_means_no_records() {
        let sink = Arc::new(Collect::default());
        let mut router = Router::new();
        router.set_logger(Some(RequestLogger::from_shared(sink.clone())));
        router.set_logger(None);
        router.get("/", ok);

        send(&router, Method::GET, "/");
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn registration_order_does_not_matter_for_siblings() {
        let calls = Arc::new(Mutex::new(0_u32));
        let base = Router::new();
        let counted = {
            let calls = Arc::clone(&calls);
            base.with_middleware([from_fn(move |next| {
                let calls = Arc::clone(&calls);
                handler_fn(move |w, req| {
                    *calls.lock().unwrap() += 1;
                    next(w, req);
                })
            })])
        };

        counted.get("/counted", ok);
        base.get("/free", ok);

        send(&base, Method::GET, "/free");
        send(&base, Method::GET, "/counted");
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
