use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;

/// The owned, recyclable parts of a request context: the user-values bag
/// and the deferred-action list. Only these are pooled; the writer and
/// request are borrowed per dispatch and can never outlive it.
#[derive(Default)]
pub(crate) struct ContextSlots {
    pub(crate) values: HashMap<String, Box<dyn Any + Send + Sync>>,
    pub(crate) deferred: Vec<Box<dyn FnOnce() + Send>>,
}

impl ContextSlots {
    fn clear(&mut self) {
        self.values.clear();
        self.deferred.clear();
    }
}

/// Free-list of [`ContextSlots`] shared across dispatch threads.
///
/// Cleared slots keep their map/vec capacity, so steady-state dispatch
/// does not allocate for user values or deferred actions.
pub(crate) struct ContextPool {
    free: Mutex<Vec<ContextSlots>>,
}

/// Retention bound; beyond it released slots are dropped instead.
const MAX_POOLED: usize = 256;

impl ContextPool {
    pub(crate) fn new() -> Self {
        ContextPool {
            free: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn acquire(&self) -> ContextSlots {
        self.free
            .lock()
            .expect("context pool poisoned")
            .pop()
            .unwrap_or_default()
    }

    pub(crate) fn release(&self, mut slots: ContextSlots) {
        slots.clear();
        let mut free = self.free.lock().expect("context pool poisoned");
        if free.len() < MAX_POOLED {
            free.push(slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_come_back_cleared() {
        let pool = ContextPool::new();

        let mut slots = pool.acquire();
        slots.values.insert("k".into(), Box::new(1u32));
        slots.deferred.push(Box::new(|| {}));
        pool.release(slots);

        let slots = pool.acquire();
        assert!(slots.values.is_empty());
        assert!(slots.deferred.is_empty());
    }

    #[test]
    fn acquire_on_empty_pool_allocates() {
        let pool = ContextPool::new();
        let slots = pool.acquire();
        assert!(slots.values.is_empty());
    }
}
