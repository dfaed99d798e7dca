pub mod context;
pub mod middleware;
pub mod query;
pub mod responder;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod trie;

pub use context::{Context, ContextError};
pub use responder::{DefaultResponder, Responder};
pub use router::{
    handler, wrap_writer, HandlerChain, HandlerFunc, RequestContext, RouteGroup, Router,
};
pub use server::{Request, ResponseWriter};
pub use trie::RadixTrie;
