//! The outbound response channel.
//!
//! Handlers do not return a response value. They write one through a
//! [`ResponseWriter`]: set a status, add headers, write body bytes. The first
//! status or body write commits the status; writing a body without setting a
//! status commits `200 OK`.
//!
//! [`BufferedResponse`] is the writer the server hands to the router. It
//! collects the whole response in memory and converts it into an
//! [`http::Response`] once the handler returns. Tests use it directly.

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

// ── ResponseWriter ───────────────────────────────────────────────────────────

/// Write side of an HTTP exchange.
///
/// Implementations decide what a second status means. [`BufferedResponse`]
/// keeps the first one and ignores the rest.
pub trait ResponseWriter {
    /// Headers to send. Set them before the first status or body write.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn set_status(&mut self, status: StatusCode);

    /// Append body bytes, committing `200 OK` if no status was set.
    fn write(&mut self, buf: &[u8]);

    /// Reply with a plain-text error body: `message` followed by a newline.
    fn error(&mut self, status: StatusCode, message: &str) {
        let headers = self.headers_mut();
        headers.remove(CONTENT_LENGTH);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        self.set_status(status);
        self.write(message.as_bytes());
        self.write(b"\n");
    }
}

// ── BufferedResponse ─────────────────────────────────────────────────────────

/// In-memory [`ResponseWriter`].
///
/// ```rust
/// use switchyard::{BufferedResponse, ResponseWriter};
/// use http::StatusCode;
///
/// let mut res = BufferedResponse::new();
/// res.set_status(StatusCode::CREATED);
/// res.write(b"done");
/// res.set_status(StatusCode::OK); // ignored, already committed
/// assert_eq!(res.status(), StatusCode::CREATED);
/// ```
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, or `200 OK` if nothing was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts into the hyper-facing response.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn set_status(&mut self, status: StatusCode) {
        match self.status {
            Some(committed) => {
                warn!(%committed, ignored = %status, "superfluous set_status call");
            }
            None => self.status = Some(status),
        }
    }

    fn write(&mut self, buf: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
    }
}
