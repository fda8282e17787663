//! Status capture for the request logger.

use http::header::HeaderMap;
use http::StatusCode;

use crate::response::ResponseWriter;

/// A [`ResponseWriter`] decorator that remembers the first status committed.
///
/// Everything is forwarded unchanged to the wrapped writer. The tracker only
/// observes, so the captured status is the one the client received: an
/// explicit status set before any body write, otherwise the implicit
/// `200 OK` committed by the first write.
pub struct ResponseTracker<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
    wrote_body: bool,
}

impl<'a> ResponseTracker<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner, status: None, wrote_body: false }
    }

    /// The committed status. An untouched response reports `200 OK`.
    pub fn captured_status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn wrote_body(&self) -> bool {
        self.wrote_body
    }
}

impl ResponseWriter for ResponseTracker<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status.get_or_insert(status);
        self.inner.set_status(status);
    }

    fn write(&mut self, buf: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.wrote_body = true;
        self.inner.write(buf);
    }
}
