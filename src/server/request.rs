use std::collections::HashMap;
use std::io::Read;

use http::Method;

use crate::context::Context;

/// Owned, decoded inbound request.
///
/// Header names are stored lower-cased. The body is kept as raw bytes;
/// interpreting it is the handlers' business. A parent [`Context`] rides
/// along and becomes the dispatch fallback when the router has no context
/// factory.
pub struct Request {
    pub method: Method,
    /// Request path, query string excluded.
    pub path: String,
    /// Query string without the leading `?`, empty when absent.
    pub raw_query: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,

    context: Context,
}

impl Request {
    /// Build a request from a method and a target such as `/users?page=2`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, raw_query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (target.to_string(), String::new()),
        };
        Request {
            method,
            path,
            raw_query,
            headers: HashMap::new(),
            body: Vec::new(),
            context: Context::background(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Header lookup by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The context attached to this request.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }
}

/// Decode a `may_minihttp` request into an owned [`Request`]: split the
/// query string off the path, lower-case header names and slurp the body.
pub fn parse_request(req: may_minihttp::Request) -> Request {
    let method = req.method().parse().unwrap_or(Method::GET);
    let target = req.path().to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let mut body = Vec::new();
    let _ = req.body().read_to_end(&mut body);

    let mut request = Request::new(method, &target);
    request.headers = headers;
    request.body = body;
    request
}
