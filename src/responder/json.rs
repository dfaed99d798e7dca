use serde::Serialize;

use super::Responder;
use crate::router::RequestContext;

/// JSON responder: serializes `object` with `serde_json` and sets the
/// `Content-Type` header.
///
/// Serialization failure panics; the router's recover boundary turns that
/// into the configured panic response instead of a half-written body.
pub struct Json<T: Serialize + Send + Sync> {
    pub object: T,
    pub status: u16,
}

impl<T: Serialize + Send + Sync> Json<T> {
    #[must_use]
    pub fn new(status: u16, object: T) -> Self {
        Json { object, status }
    }
}

impl<T: Serialize + Send + Sync> Responder for Json<T> {
    fn status_code(&self, _ctx: &RequestContext<'_>) -> u16 {
        self.status
    }

    fn respond(&self, ctx: &mut RequestContext<'_>) {
        let body = match serde_json::to_vec(&self.object) {
            Ok(body) => body,
            Err(err) => panic!("routrie: json responder serialization failed: {err}"),
        };

        ctx.writer.insert_header("Content-Type", "application/json");
        ctx.writer.set_status(self.status);
        ctx.writer.write_body(&body);
    }
}
