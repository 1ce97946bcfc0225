//! Process shutdown hook registration.
//!
//! Hosts that embed the runner register teardown actions here and call
//! [`ShutdownHooks::run`] once at process exit (or wire it into their own
//! lifecycle mechanism). Hooks run in reverse registration order, so
//! dependents registered later are torn down before what they depend on.

use parking_lot::Mutex;
use tracing::debug;

struct NamedHook {
    name: String,
    action: Box<dyn FnOnce() + Send>,
}

/// Collector of named, run-once shutdown hooks.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<NamedHook>>,
}

impl ShutdownHooks {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named hook.
    ///
    /// Registration after [`run`](Self::run) is accepted but the hook will
    /// only execute if `run` is called again.
    pub fn register(&self, name: impl Into<String>, action: impl FnOnce() + Send + 'static) {
        let name = name.into();
        debug!(hook = %name, "registered shutdown hook");
        self.hooks.lock().push(NamedHook {
            name,
            action: Box::new(action),
        });
    }

    /// Runs all registered hooks in reverse registration order.
    ///
    /// Each hook runs at most once; a second `run` with no new registrations
    /// is a no-op.
    pub fn run(&self) {
        let hooks = std::mem::take(&mut *self.hooks.lock());
        if hooks.is_empty() {
            return;
        }
        for hook in hooks.into_iter().rev() {
            debug!(hook = %hook.name, "running shutdown hook");
            (hook.action)();
        }
    }

    /// Returns the number of pending hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    /// Returns whether no hooks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }
}

impl std::fmt::Debug for ShutdownHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.hooks.lock().iter().map(|h| h.name.clone()).collect();
        f.debug_struct("ShutdownHooks").field("pending", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn hooks_run_in_reverse_order_exactly_once() {
        let hooks = ShutdownHooks::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            hooks.register(label, move || order.lock().push(label));
        }
        assert_eq!(hooks.len(), 3);

        hooks.run();
        assert_eq!(*order.lock(), vec!["third", "second", "first"]);
        assert!(hooks.is_empty());

        // Second run is a no-op.
        hooks.run();
        assert_eq!(order.lock().len(), 3);
    }

    #[test]
    fn registration_after_run_needs_another_run() {
        let hooks = ShutdownHooks::new();
        let count = Arc::new(AtomicUsize::new(0));

        hooks.run();

        let counter = Arc::clone(&count);
        hooks.register("late", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);

        hooks.run();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
