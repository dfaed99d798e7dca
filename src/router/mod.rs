//! Request routing: registration, dispatch and the chain executor.

mod chain;
mod context;
mod core;
mod group;
mod pool;

pub use chain::{handler, wrap_writer, HandlerChain, HandlerFunc};
pub use context::RequestContext;
pub use core::{AfterFunc, ContextFactory, RecoverFunc, Router};
pub use group::RouteGroup;
