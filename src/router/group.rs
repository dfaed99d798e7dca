use http::Method;

use super::chain::HandlerFunc;
use super::core::Router;

/// A composable registration handle: concatenates path prefixes and
/// accumulates middleware, delegating the actual registration to the root
/// [`Router`].
///
/// Middleware accumulated on a group is prepended, in group order, to the
/// handlers of every route registered through it.
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<HandlerFunc>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: &str, middleware: Vec<HandlerFunc>) -> Self {
        if prefix.ends_with('*') {
            panic!("routrie: group prefix cannot end with '*'");
        }
        RouteGroup {
            router,
            prefix: prefix.to_string(),
            middleware,
        }
    }

    /// Derive a nested group. The child's prefix is appended to this
    /// group's prefix and its middleware runs after this group's.
    ///
    /// # Panics
    ///
    /// If `prefix` ends with `*`.
    pub fn group(&mut self, prefix: &str, middleware: Vec<HandlerFunc>) -> RouteGroup<'_> {
        if prefix.ends_with('*') {
            panic!("routrie: group prefix cannot end with '*'");
        }
        let mut combined = self.middleware.clone();
        combined.extend(middleware);
        RouteGroup {
            router: &mut *self.router,
            prefix: format!("{}{}", self.prefix, prefix),
            middleware: combined,
        }
    }

    /// Register `handlers` for `(method, prefix + path)` with the group
    /// middleware prepended.
    ///
    /// # Panics
    ///
    /// As [`Router::handle`]; the path check applies to the combined
    /// prefix + path.
    pub fn handle(&mut self, method: Method, path: &str, handlers: Vec<HandlerFunc>) -> &mut Self {
        if self.prefix.is_empty() && path.is_empty() {
            panic!("routrie: route path cannot be empty");
        }
        let full_path = format!("{}{}", self.prefix, path);
        self.router
            .register(method, full_path, &self.middleware, handlers);
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
}
