//! Minimal switchyard example: a JSON API with scoped middleware.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/api/users
//!   curl -X POST http://localhost:3000/api/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/api/users      # 405
//!   curl http://localhost:3000/api/slow                 # 504 after 1 s
//!   curl http://localhost:3000/api/boom                 # 500, panic logged
//!   curl -i http://localhost:3000/static/app.css        # cache-control set

use std::thread;
use std::time::Duration;

use http::StatusCode;
use switchyard::{Request, RequestLogger, ResponseWriter, Router, Server, middleware};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Router::new().with_middleware([middleware::recover_panic()]);
    app.set_logger(Some(RequestLogger::tracing()));

    app.with_middleware([middleware::cache_static_assets()])
        .get("/static/app.css", stylesheet);

    let api = app
        .group("api")
        .with_middleware([middleware::timeout(Duration::from_secs(1))]);
    api.get("users", list_users)
        .post("users", create_user)
        .get("slow", slow)
        .get("boom", boom);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /api/users
fn list_users(w: &mut dyn ResponseWriter, _req: &Request) {
    w.headers_mut().insert("content-type", "application/json".parse().unwrap());
    w.write(br#"[{"id":"42","name":"alice"}]"#);
}

// POST /api/users
//
// req.body() is &[u8]: parse with serde_json::from_slice, simd-json, etc.
fn create_user(w: &mut dyn ResponseWriter, req: &Request) {
    if req.body().is_empty() {
        w.error(StatusCode::BAD_REQUEST, "empty body");
        return;
    }

    w.headers_mut().insert("location", "/api/users/99".parse().unwrap());
    w.set_status(StatusCode::CREATED);
    w.write(br#"{"id":"99","name":"new_user"}"#);
}

// GET /api/slow: gives up when the timeout middleware's deadline passes.
fn slow(w: &mut dyn ResponseWriter, req: &Request) {
    for _ in 0..50 {
        if req.context().is_done() {
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
    w.write(b"finally");
}

// GET /api/boom
fn boom(_w: &mut dyn ResponseWriter, _req: &Request) {
    panic!("boom");
}

// GET /static/app.css
fn stylesheet(w: &mut dyn ResponseWriter, _req: &Request) {
    w.headers_mut().insert("content-type", "text/css".parse().unwrap());
    w.write(b"body { margin: 0 }");
}
