//! Parent request context: cancellation, deadline and value carrier.
//!
//! Dispatch attaches one of these to every request; the chain executor
//! polls [`Context::done`] before invoking each handler. Contexts form a
//! chain: deriving with [`Context::with_value`], [`Context::with_cancel`]
//! or [`Context::with_deadline`] wraps the parent, and lookups walk the
//! chain outward. Cloning is cheap (an `Arc` bump).

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// Cancelled through a [`CancelHandle`].
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::Cancelled => write!(f, "context cancelled"),
            ContextError::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl std::error::Error for ContextError {}

struct Inner {
    parent: Option<Context>,
    cancelled: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
    value: Option<(String, Box<dyn Any + Send + Sync>)>,
}

/// A cancellation/deadline/value carrier attached to a request.
#[derive(Clone)]
pub struct Context {
    inner: Option<Arc<Inner>>,
}

/// Cancels the [`Context`] it was created with, and every context derived
/// from it.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// The empty root context: never done, no deadline, no values.
    #[must_use]
    pub fn background() -> Self {
        Context { inner: None }
    }

    fn derive(&self, inner: Inner) -> Context {
        Context {
            inner: Some(Arc::new(inner)),
        }
    }

    /// Derive a cancellable child context.
    #[must_use]
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = self.derive(Inner {
            parent: Some(self.clone()),
            cancelled: Some(flag.clone()),
            deadline: None,
            value: None,
        });
        (ctx, CancelHandle { flag })
    }

    /// Derive a child context that is done once `deadline` passes.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        self.derive(Inner {
            parent: Some(self.clone()),
            cancelled: None,
            deadline: Some(deadline),
            value: None,
        })
    }

    /// Derive a child context that is done after `timeout` from now.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child context carrying `value` under `key`.
    #[must_use]
    pub fn with_value(&self, key: &str, value: impl Any + Send + Sync) -> Context {
        self.derive(Inner {
            parent: Some(self.clone()),
            cancelled: None,
            deadline: None,
            value: Some((key.to_string(), Box::new(value))),
        })
    }

    /// The earliest deadline along the context chain.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let mut earliest: Option<Instant> = None;
        let mut cur = self.inner.as_ref();
        while let Some(inner) = cur {
            if let Some(d) = inner.deadline {
                earliest = Some(earliest.map_or(d, |e| e.min(d)));
            }
            cur = inner.parent.as_ref().and_then(|p| p.inner.as_ref());
        }
        earliest
    }

    /// Whether this context or any ancestor has been terminated.
    #[must_use]
    pub fn done(&self) -> bool {
        self.err().is_some()
    }

    /// The termination cause, if any. Cancellation is reported before a
    /// deadline when both apply at the same level.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        let now = Instant::now();
        let mut cur = self.inner.as_ref();
        while let Some(inner) = cur {
            if let Some(flag) = &inner.cancelled {
                if flag.load(Ordering::Acquire) {
                    return Some(ContextError::Cancelled);
                }
            }
            if let Some(deadline) = inner.deadline {
                if now >= deadline {
                    return Some(ContextError::DeadlineExceeded);
                }
            }
            cur = inner.parent.as_ref().and_then(|p| p.inner.as_ref());
        }
        None
    }

    /// Look up `key` along the context chain, innermost first.
    #[must_use]
    pub fn value<V: Any + Send + Sync>(&self, key: &str) -> Option<&V> {
        let mut cur = self.inner.as_ref();
        while let Some(inner) = cur {
            if let Some((k, v)) = &inner.value {
                if k == key {
                    return v.downcast_ref::<V>();
                }
            }
            cur = inner.parent.as_ref().and_then(|p| p.inner.as_ref());
        }
        None
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0usize;
        let mut cur = self.inner.as_ref();
        while let Some(inner) = cur {
            depth += 1;
            cur = inner.parent.as_ref().and_then(|p| p.inner.as_ref());
        }
        f.debug_struct("Context")
            .field("depth", &depth)
            .field("err", &self.err())
            .finish()
    }
}
