//! CORS policy as ordinary chain middleware.
//!
//! A validated [`CorsConfig`] yields two handlers: a preflight terminal
//! for `OPTIONS` and a header-stamping middleware for actual requests.
//! [`CorsConfig::apply`] wires both onto a route group at once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;

use crate::responder::{DefaultResponder, Responder, Status};
use crate::router::{handler, HandlerFunc, RequestContext, RouteGroup};

/// CORS configuration error, returned by [`CorsConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// A wildcard host cannot be combined with credentials; the CORS
    /// specification requires exact origins in that case.
    WildcardWithCredentials,
    /// Credentials require at least one allowed host.
    EmptyHostsWithCredentials,
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => write!(
                f,
                "cors configuration error: wildcard host cannot be combined with \
                 allow_credentials; list exact hosts instead"
            ),
            CorsConfigError::EmptyHostsWithCredentials => write!(
                f,
                "cors configuration error: allow_credentials requires at least one allowed host"
            ),
        }
    }
}

impl std::error::Error for CorsConfigError {}

/// Validated CORS policy.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    allow_hosts: Vec<String>,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

/// Builder for [`CorsConfig`]; `build` validates the combination.
#[derive(Debug, Default, Clone)]
pub struct CorsConfigBuilder {
    allow_hosts: Vec<String>,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

impl CorsConfigBuilder {
    #[must_use]
    pub fn allow_host(mut self, host: &str) -> Self {
        self.allow_hosts.push(host.to_string());
        self
    }

    #[must_use]
    pub fn allow_method(mut self, method: Method) -> Self {
        self.allow_methods.push(method.to_string());
        self
    }

    #[must_use]
    pub fn allow_header(mut self, header: &str) -> Self {
        self.allow_headers.push(header.to_string());
        self
    }

    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn build(self) -> Result<CorsConfig, CorsConfigError> {
        if self.allow_credentials {
            if self.allow_hosts.iter().any(|h| h == "*") {
                return Err(CorsConfigError::WildcardWithCredentials);
            }
            if self.allow_hosts.is_empty() {
                return Err(CorsConfigError::EmptyHostsWithCredentials);
            }
        }

        Ok(CorsConfig {
            allow_hosts: self.allow_hosts,
            allow_methods: self.allow_methods,
            allow_headers: self.allow_headers,
            allow_credentials: self.allow_credentials,
            max_age: self.max_age,
        })
    }
}

impl CorsConfig {
    #[must_use]
    pub fn builder() -> CorsConfigBuilder {
        CorsConfigBuilder::default()
    }

    /// Whether `origin` (an `Origin` header value) is allowed.
    #[must_use]
    pub fn allow(&self, origin: &str) -> bool {
        let Ok(parsed) = url::Url::parse(origin) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.allow_hosts.iter().any(|h| h == host || h == "*")
    }

    /// Register the policy on `group`: an `OPTIONS *` preflight terminal
    /// plus a derived group whose middleware stamps the CORS headers on
    /// every other request.
    pub fn apply<'a, 'r>(&self, group: &'a mut RouteGroup<'r>) -> RouteGroup<'a> {
        group.handle(Method::OPTIONS, "*", vec![self.middleware(true)]);
        group.group("", vec![self.middleware(false)])
    }

    /// Build the CORS handler. With `preflight` the handler terminates
    /// the chain with `204 No Content`; otherwise it stamps headers and
    /// continues. Requests without an `Origin` header pass untouched;
    /// disallowed origins get `403`.
    #[must_use]
    pub fn middleware(&self, preflight: bool) -> HandlerFunc {
        let config = self.clone();
        let allow_methods = config.allow_methods.join(", ");
        let allow_headers = config.allow_headers.join(", ");
        let max_age = config.max_age.map(|age| age.as_secs().to_string());
        let forbidden: Arc<dyn Responder> = Arc::new(DefaultResponder::new(403, "cors forbidden"));
        let preflight_ok: Arc<dyn Responder> = Arc::new(Status(204));

        handler(move |ctx: &mut RequestContext<'_>| {
            let Some(origin) = ctx.request.header("origin") else {
                return None;
            };
            if !config.allow(origin) {
                return Some(forbidden.clone());
            }

            let origin = origin.to_string();
            let w = &mut *ctx.writer;
            w.insert_header("Vary", "Origin");
            w.insert_header("Access-Control-Allow-Origin", &origin);
            w.insert_header("Access-Control-Allow-Methods", &allow_methods);
            w.insert_header("Access-Control-Allow-Headers", &allow_headers);
            if let Some(max_age) = &max_age {
                w.insert_header("Access-Control-Max-Age", max_age);
            }
            if config.allow_credentials {
                w.insert_header("Access-Control-Allow-Credentials", "true");
            }

            if preflight {
                Some(preflight_ok.clone())
            } else {
                None
            }
        })
    }
}
