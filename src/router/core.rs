//! Router core: method table, registration and the dispatch path.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::Method;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use tracing::{debug, debug_span, error, warn};

use crate::context::Context;
use crate::responder::{DefaultResponder, Responder};
use crate::server::{Request, ResponseWriter};
use crate::trie::RadixTrie;

use super::chain::{HandlerChain, HandlerFunc};
use super::context::RequestContext;
use super::group::RouteGroup;
use super::pool::ContextPool;

/// Produces the parent context for a request. Returning `None` falls back
/// to the context carried by the request itself.
pub type ContextFactory = Arc<dyn Fn(&Request) -> Option<Context> + Send + Sync>;

/// Invoked when a handler panics. The returned responder (if any) is
/// emitted instead of the default panic response.
pub type RecoverFunc = Arc<
    dyn Fn(&mut RequestContext<'_>, &(dyn Any + Send)) -> Option<Arc<dyn Responder>> + Send + Sync,
>;

/// Invoked once per dispatched request, after the responder has written
/// its output and deferred actions have run.
pub type AfterFunc = Arc<dyn Fn(&mut RequestContext<'_>, Option<&Arc<dyn Responder>>) + Send + Sync>;

static DEFAULT_NOT_FOUND: Lazy<Arc<dyn Responder>> =
    Lazy::new(|| Arc::new(DefaultResponder::new(404, "not found")));

static DEFAULT_CONTEXT_DONE: Lazy<Arc<dyn Responder>> =
    Lazy::new(|| Arc::new(DefaultResponder::new(504, "context terminated")));

static DEFAULT_PANIC: Lazy<Arc<dyn Responder>> =
    Lazy::new(|| Arc::new(DefaultResponder::new(500, "recovered from panic")));

/// Correlation id for one dispatch, threaded through the request span.
/// An inbound `X-Request-Id` is reused as long as it is a plausible
/// header token (non-empty, at most 64 ASCII-graphic bytes) — upstream
/// proxies mint ids in all sorts of formats and rejecting them would
/// break cross-service correlation. Anything else gets a fresh ULID.
fn correlation_id(request: &Request) -> String {
    match request.header("x-request-id") {
        Some(id)
            if !id.is_empty() && id.len() <= 64 && id.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            id.to_string()
        }
        _ => ulid::Ulid::new().to_string(),
    }
}

/// Small ordered `(method, trie)` table. Any server uses a handful of
/// methods at most, so a linear scan wins over hashing.
#[derive(Default)]
struct MethodTable {
    entries: SmallVec<[(Method, RadixTrie<HandlerChain>); 8]>,
}

impl MethodTable {
    fn get(&self, method: &Method) -> Option<&RadixTrie<HandlerChain>> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, trie)| trie)
    }

    fn get_or_insert(&mut self, method: Method) -> &mut RadixTrie<HandlerChain> {
        if let Some(idx) = self.entries.iter().position(|(m, _)| *m == method) {
            return &mut self.entries[idx].1;
        }
        self.entries.push((method, RadixTrie::new()));
        &mut self.entries.last_mut().unwrap().1
    }
}

/// The routing core: per-method radix tries, the registration surface and
/// the dispatch engine.
///
/// Register every route before serving traffic; registration takes
/// `&mut self` while dispatch shares the router by reference across
/// worker threads.
pub struct Router {
    /// Emitted when no trie exists for the method, the path does not
    /// match, or the matched chain is empty. Default: 404 "not found".
    pub when_not_found: Arc<dyn Responder>,
    /// Emitted when the parent context terminates between handlers.
    /// Default: 504 "context terminated".
    pub when_context_done: Arc<dyn Responder>,
    /// Parent-context factory consulted at the top of dispatch.
    pub context_factory: Option<ContextFactory>,
    /// Panic hook; `None` uses the built-in 500 "recovered from panic".
    pub recover: Option<RecoverFunc>,
    /// Post-response hook.
    pub after: Option<AfterFunc>,
    /// Permit re-registering an existing `(method, path)` pair.
    pub allow_route_overwrite: bool,

    methods: MethodTable,
    pool: ContextPool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Router {
            when_not_found: DEFAULT_NOT_FOUND.clone(),
            when_context_done: DEFAULT_CONTEXT_DONE.clone(),
            context_factory: None,
            recover: None,
            after: None,
            allow_route_overwrite: false,
            methods: MethodTable::default(),
            pool: ContextPool::new(),
        }
    }

    /// Register `handlers` for `(method, path)`.
    ///
    /// # Panics
    ///
    /// On an empty path, an empty handler list, or a duplicate
    /// registration while [`allow_route_overwrite`] is false. These are
    /// programmer mistakes caught before any request is served.
    ///
    /// [`allow_route_overwrite`]: Router::allow_route_overwrite
    pub fn handle(&mut self, method: Method, path: &str, handlers: Vec<HandlerFunc>) -> &mut Self {
        if path.is_empty() {
            panic!("routrie: route path cannot be empty");
        }
        self.register(method, path.to_string(), &[], handlers);
        self
    }

    /// Register the same handler chain under each of `methods`.
    pub fn handle_any(
        &mut self,
        methods: &[Method],
        path: &str,
        handlers: Vec<HandlerFunc>,
    ) -> &mut Self {
        for method in methods {
            self.handle(method.clone(), path, handlers.clone());
        }
        self
    }

    /// Open a route group. Registrations through the group prefix their
    /// paths with `prefix` and run `middleware` ahead of their handlers;
    /// nested groups compose both.
    ///
    /// # Panics
    ///
    /// If `prefix` ends with `*` — wildcards are only meaningful on leaf
    /// registrations.
    pub fn group(&mut self, prefix: &str, middleware: Vec<HandlerFunc>) -> RouteGroup<'_> {
        RouteGroup::new(self, prefix, middleware)
    }

    pub(crate) fn register(
        &mut self,
        method: Method,
        full_path: String,
        middleware: &[HandlerFunc],
        handlers: Vec<HandlerFunc>,
    ) {
        if full_path.is_empty() {
            panic!("routrie: route path cannot be empty");
        }
        if handlers.is_empty() {
            panic!("routrie: route handler list cannot be empty");
        }

        let allow_overwrite = self.allow_route_overwrite;
        let trie = self.methods.get_or_insert(method.clone());
        if !allow_overwrite && trie.get_exact(&full_path).is_some() {
            panic!("routrie: route already defined: {method} {full_path}");
        }

        let chain: HandlerChain = middleware
            .iter()
            .cloned()
            .chain(handlers)
            .collect::<Vec<_>>()
            .into();

        debug!(
            method = %method,
            path = %full_path,
            chain_len = chain.len(),
            "route registered"
        );
        trie.add(&full_path, chain);
    }

    /// Every registered route as `"METHOD path" -> chain length`. For
    /// diagnostics and tests.
    #[must_use]
    pub fn routes(&self) -> Vec<(String, usize)> {
        let mut routes: Vec<(String, usize)> = self
            .methods
            .entries
            .iter()
            .flat_map(|(method, trie)| {
                trie.leaves()
                    .into_iter()
                    .map(move |(path, chain)| (format!("{method} {path}"), chain.len()))
            })
            .collect();
        routes.sort();
        routes
    }

    /// Dispatch one request: route, execute the chain inside the recovery
    /// boundary, emit the terminal responder, then run deferred actions
    /// and the `after` hook.
    pub fn serve(&self, request: &Request, writer: &mut dyn ResponseWriter) {
        let request_id = correlation_id(request);
        let span = debug_span!(
            "request",
            id = %request_id,
            method = %request.method,
            path = %request.path,
        );
        let _guard = span.enter();

        let parent = self
            .context_factory
            .as_ref()
            .and_then(|factory| factory(request))
            .unwrap_or_else(|| request.context().clone());

        let slots = self.pool.acquire();
        let mut ctx = RequestContext::new(writer, request, parent, self, slots);

        let chain = self
            .methods
            .get(&request.method)
            .and_then(|trie| trie.get(&request.path));

        let chain = match chain {
            Some(chain) if !chain.is_empty() => chain,
            _ => {
                warn!("no route matched");
                self.when_not_found.respond(&mut ctx);
                self.pool.release(ctx.into_slots());
                return;
            }
        };

        ctx.bind(&chain[..]);

        let executed = panic::catch_unwind(AssertUnwindSafe(|| {
            let responder = ctx.run();
            if let Some(res) = &responder {
                res.respond(&mut ctx);
            }
            responder
        }));

        let responder = match executed {
            Ok(responder) => responder,
            Err(panic_payload) => {
                error!("handler panicked");
                let responder = match &self.recover {
                    Some(recover) => recover(&mut ctx, panic_payload.as_ref()),
                    None => Some(DEFAULT_PANIC.clone()),
                };
                if let Some(res) = &responder {
                    res.respond(&mut ctx);
                }
                responder
            }
        };

        for action in ctx.take_deferred() {
            action();
        }

        if let Some(after) = &self.after {
            after(&mut ctx, responder.as_ref());
        }

        self.pool.release(ctx.into_slots());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_upstream_request_id_is_reused() {
        let request =
            Request::new(Method::GET, "/").with_header("X-Request-Id", "gw-7f3b2c-0042");
        assert_eq!(correlation_id(&request), "gw-7f3b2c-0042");
    }

    #[test]
    fn missing_or_junk_request_id_mints_a_ulid() {
        let absent = Request::new(Method::GET, "/");
        let minted = correlation_id(&absent);
        assert_eq!(minted.len(), 26, "ULID text form");

        let junk = Request::new(Method::GET, "/").with_header("X-Request-Id", "has space");
        assert_ne!(correlation_id(&junk), "has space");

        let oversized = "x".repeat(65);
        let long = Request::new(Method::GET, "/").with_header("X-Request-Id", &oversized);
        assert_ne!(correlation_id(&long), oversized);
    }
}
