//! Environment-driven runtime configuration.
//!
//! `ROUTRIE_STACK_SIZE` sets the stack size, in bytes, of the coroutines
//! the embedded server spawns per connection. Accepts decimal (`65536`)
//! or hex (`0x10000`); the default is 64 KB. Total virtual memory is
//! `stack_size * concurrent connections`, so tune it down for very high
//! connection counts and up for handlers with deep call chains.

use std::env;

#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes (default 0x10000, 64 KB).
    pub stack_size: usize,
}

const DEFAULT_STACK_SIZE: usize = 0x10000;

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let stack_size = match env::var("ROUTRIE_STACK_SIZE") {
            Ok(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).unwrap_or(DEFAULT_STACK_SIZE)
                } else {
                    val.parse().unwrap_or(DEFAULT_STACK_SIZE)
                }
            }
            Err(_) => DEFAULT_STACK_SIZE,
        };

        RuntimeConfig { stack_size }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}
