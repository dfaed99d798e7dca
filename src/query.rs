//! Query-string helpers.
//!
//! The router matches the path only; the query string rides along on
//! [`Request::raw_query`](crate::server::Request) untouched. These helpers
//! decode it on demand, either directly or through [`parser`], a
//! middleware that parses once and shares the result down the chain.

use std::collections::HashMap;

use crate::router::{handler, HandlerFunc, RequestContext};

/// Context key under which [`parser`] stores the parsed [`Values`].
pub const VALUES_KEY: &str = "routrie.query";

/// Decoded query parameters. Repeated keys keep every value in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Values {
    map: HashMap<String, Vec<String>>,
}

impl Values {
    /// Percent-decode `raw` (the query string without the leading `?`).
    #[must_use]
    pub fn parse(raw: &str) -> Values {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            map.entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Values { map }
    }

    /// First value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values under `key`, in query order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.map.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// First value under `key` parsed as an integer; `None` when absent
    /// or unparseable.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    /// First value under `key` parsed as a bool (`true`/`false`/`1`/`0`).
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "1" => Some(true),
            "0" => Some(false),
            other => other.parse().ok(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Middleware that parses the query string once and stores the [`Values`]
/// under [`VALUES_KEY`] for downstream handlers:
///
/// `ctx.value::<query::Values>(query::VALUES_KEY)`
#[must_use]
pub fn parser() -> HandlerFunc {
    handler(|ctx: &mut RequestContext<'_>| {
        let values = Values::parse(&ctx.request.raw_query);
        ctx.set_value(VALUES_KEY, values);
        None
    })
}
