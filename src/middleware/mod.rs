//! Reusable middleware built on the handler protocol.

mod cors;

pub use cors::{CorsConfig, CorsConfigBuilder, CorsConfigError};
