use std::any::Any;
use std::time::Instant;

use crate::context::{Context, ContextError};
use crate::responder::Responder;
use crate::server::{Request, ResponseWriter};
use std::sync::Arc;

use super::chain::HandlerFunc;
use super::core::Router;
use super::pool::ContextSlots;

/// Per-request state handed to every handler in the chain.
///
/// One instance lives for the whole request; values set by an upstream
/// middleware through [`set_value`] are visible to everything downstream
/// and persist until the response is finalised. This is deliberate and
/// differs from derive-a-new-context models: propagation is the point.
///
/// [`set_value`]: RequestContext::set_value
pub struct RequestContext<'a> {
    /// Output sink for the response. Handlers may write to it directly;
    /// a chain that finishes without a responder is passed through.
    pub writer: &'a mut dyn ResponseWriter,
    /// The decoded inbound request, read-only to handlers.
    pub request: &'a Request,

    parent: Context,
    router: &'a Router,
    chain: &'a [HandlerFunc],
    chain_idx: usize,
    slots: ContextSlots,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(
        writer: &'a mut dyn ResponseWriter,
        request: &'a Request,
        parent: Context,
        router: &'a Router,
        slots: ContextSlots,
    ) -> Self {
        RequestContext {
            writer,
            request,
            parent,
            router,
            chain: &[],
            chain_idx: 0,
            slots,
        }
    }

    pub(crate) fn bind(&mut self, chain: &'a [HandlerFunc]) {
        self.chain = chain;
        self.chain_idx = 0;
    }

    pub(crate) fn into_slots(self) -> ContextSlots {
        self.slots
    }

    pub(crate) fn take_deferred(&mut self) -> Vec<Box<dyn FnOnce() + Send>> {
        std::mem::take(&mut self.slots.deferred)
    }

    /// Run handlers starting at the current index until one produces a
    /// responder or the chain is exhausted. Parent termination is polled
    /// before every handler; a terminated parent short-circuits to the
    /// router's context-done responder.
    pub(crate) fn run(&mut self) -> Option<Arc<dyn Responder>> {
        loop {
            if self.parent.done() {
                return Some(self.router.when_context_done.clone());
            }

            if self.chain_idx >= self.chain.len() {
                return None;
            }

            let handler = self.chain[self.chain_idx].clone();
            if let Some(responder) = handler(&mut *self) {
                return Some(responder);
            }

            self.chain_idx += 1;
        }
    }

    /// Advance past the current handler and run the rest of the chain,
    /// returning the terminal responder (or `None` if nothing downstream
    /// produced one). Calling `next` again after the chain is exhausted
    /// returns `None`.
    pub fn next(&mut self) -> Option<Arc<dyn Responder>> {
        self.chain_idx += 1;
        self.run()
    }

    /// Store `value` under `key` for the rest of this request. Returns
    /// `self` so calls can be chained into a `next()`.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) -> &mut Self {
        self.slots.values.insert(key.into(), Box::new(value));
        self
    }

    /// Look up `key` among the request values, falling back to the parent
    /// context chain.
    #[must_use]
    pub fn value<V: Any + Send + Sync>(&self, key: &str) -> Option<&V> {
        match self.slots.values.get(key) {
            Some(boxed) => boxed.downcast_ref::<V>(),
            None => self.parent.value::<V>(key),
        }
    }

    /// Register a cleanup action. Deferred actions run in insertion order
    /// after the terminal responder has written its output.
    pub fn defer_action(&mut self, f: impl FnOnce() + Send + 'static) {
        self.slots.deferred.push(Box::new(f));
    }

    /// The parent context attached at dispatch.
    #[must_use]
    pub fn parent(&self) -> &Context {
        &self.parent
    }

    /// Deadline of the parent context, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.parent.deadline()
    }

    /// Whether the parent context has been terminated.
    #[must_use]
    pub fn done(&self) -> bool {
        self.parent.done()
    }

    /// Termination cause of the parent context, if any.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        self.parent.err()
    }

    /// The router that dispatched this request.
    #[must_use]
    pub fn router(&self) -> &Router {
        self.router
    }
}
