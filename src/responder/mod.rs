//! Response emission contract and the built-in responders.
//!
//! Returning `Some(responder)` from a handler stops chain execution; the
//! router then calls [`Responder::respond`] exactly once. A responder can
//! be anything: an error page, a JSON document, a file download. Share
//! long-lived responders behind an `Arc` instead of rebuilding them per
//! request.

mod file;
mod json;
mod status;

pub use file::File;
pub use json::Json;
pub use status::Status;

use crate::router::RequestContext;

/// The terminal write of a request.
///
/// `respond` owns ordering: header mutation first, then the status line,
/// then body bytes. The router never interposes; it calls `respond` once
/// on the terminal responder (or not at all when the chain produced none
/// and the handlers wrote to the writer themselves).
pub trait Responder: Send + Sync {
    /// Numeric status code. Safe to call at any point, in particular from
    /// an `after` hook once `respond` has run.
    fn status_code(&self, ctx: &RequestContext<'_>) -> u16;

    /// Write the full response to `ctx.writer`.
    fn respond(&self, ctx: &mut RequestContext<'_>);
}

/// Plain-text responder with a fixed status and message.
pub struct DefaultResponder {
    pub status: u16,
    pub message: String,
}

impl DefaultResponder {
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        DefaultResponder {
            status,
            message: message.into(),
        }
    }
}

impl Responder for DefaultResponder {
    fn status_code(&self, _ctx: &RequestContext<'_>) -> u16 {
        self.status
    }

    fn respond(&self, ctx: &mut RequestContext<'_>) {
        ctx.writer.set_status(self.status);
        ctx.writer.write_body(self.message.as_bytes());
    }
}
