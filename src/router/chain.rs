use std::sync::Arc;

use super::context::RequestContext;
use crate::responder::Responder;
use crate::server::{Request, ResponseWriter};

/// Signature shared by middleware and terminal handlers.
///
/// Returning `None` continues the chain; returning `Some` stops it and the
/// router emits that responder. A middleware that wants to observe the
/// downstream result calls [`RequestContext::next`] and gets the terminal
/// responder back.
pub type HandlerFunc =
    Arc<dyn Fn(&mut RequestContext<'_>) -> Option<Arc<dyn Responder>> + Send + Sync>;

/// The ordered handler list registered for one `(method, path)` pair.
pub type HandlerChain = Arc<[HandlerFunc]>;

/// Wrap a closure into a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut RequestContext<'_>) -> Option<Arc<dyn Responder>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Adapt a function that writes straight to the [`ResponseWriter`] into a
/// handler. The returned handler yields `None`: the wrapped function owns
/// the response and the router passes it through untouched.
pub fn wrap_writer<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    Arc::new(move |ctx: &mut RequestContext<'_>| {
        f(&mut *ctx.writer, ctx.request);
        None
    })
}
