//! Embedded HTTP server layer: request decoding, response staging and the
//! `may_minihttp` service glue.

mod request;
mod response;
mod service;

pub use request::{parse_request, Request};
pub use response::{status_reason, RecordedResponse, ResponseWriter};
pub use service::{RouterServer, RouterService, ServerHandle};
