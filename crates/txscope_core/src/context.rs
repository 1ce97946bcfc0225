//! Per-unit-of-work execution context.
//!
//! An [`ExecutionContext`] is a key/value store scoped to one logical unit of
//! work, typically one inbound request or one explicit work block. The current
//! context is bound to the thread that entered it; under a cooperative
//! scheduler the scope must be entered on the task that runs the work, so the
//! association follows the logical unit of work rather than a pool thread.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static CURRENT: RefCell<Vec<Rc<ExecutionContext>>> = const { RefCell::new(Vec::new()) };
}

/// Key/value state scoped to one unit of work.
///
/// Contexts are deliberately not `Send`: a unit of work runs on one thread at
/// a time, and the state bound to it must never be shared across concurrent
/// units of work.
#[derive(Default)]
pub struct ExecutionContext {
    args: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.args.borrow().keys().cloned().collect();
        f.debug_struct("ExecutionContext").field("args", &keys).finish()
    }
}

impl ExecutionContext {
    fn new() -> Self {
        Self::default()
    }

    /// Binds a fresh context to the calling thread and returns a guard that
    /// restores the previous binding when dropped.
    ///
    /// Scopes nest: entering inside an existing scope shadows it until the
    /// inner guard is dropped.
    #[must_use]
    pub fn enter() -> ContextGuard {
        let context = Rc::new(Self::new());
        CURRENT.with(|stack| stack.borrow_mut().push(Rc::clone(&context)));
        ContextGuard { context }
    }

    /// Returns the context bound to the calling thread, if any.
    #[must_use]
    pub fn current() -> Option<Rc<ExecutionContext>> {
        CURRENT.with(|stack| stack.borrow().last().cloned())
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn put_arg(&self, key: impl Into<String>, value: Rc<dyn Any>) {
        self.args.borrow_mut().insert(key.into(), value);
    }

    /// Returns the value stored under `key`, if present and of type `T`.
    #[must_use]
    pub fn arg<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        let value = self.args.borrow().get(key).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Removes the value stored under `key`.
    pub fn remove_arg(&self, key: &str) {
        self.args.borrow_mut().remove(key);
    }
}

/// Guard for an entered execution context scope.
///
/// Dropping the guard unbinds the context and restores whatever was bound
/// before [`ExecutionContext::enter`].
#[derive(Debug)]
pub struct ContextGuard {
    context: Rc<ExecutionContext>,
}

impl ContextGuard {
    /// Returns the context this guard keeps bound.
    #[must_use]
    pub fn context(&self) -> &Rc<ExecutionContext> {
        &self.context
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_context_outside_scope() {
        assert!(ExecutionContext::current().is_none());
    }

    #[test]
    fn enter_binds_and_drop_unbinds() {
        {
            let guard = ExecutionContext::enter();
            let current = ExecutionContext::current().unwrap();
            assert!(Rc::ptr_eq(guard.context(), &current));
        }
        assert!(ExecutionContext::current().is_none());
    }

    #[test]
    fn nested_scopes_restore_previous() {
        let outer = ExecutionContext::enter();
        {
            let inner = ExecutionContext::enter();
            let current = ExecutionContext::current().unwrap();
            assert!(Rc::ptr_eq(inner.context(), &current));
            assert!(!Rc::ptr_eq(outer.context(), &current));
        }
        let current = ExecutionContext::current().unwrap();
        assert!(Rc::ptr_eq(outer.context(), &current));
    }

    #[test]
    fn args_roundtrip_by_type() {
        let guard = ExecutionContext::enter();
        let cx = guard.context();

        cx.put_arg("answer", Rc::new(42_u32));
        assert_eq!(cx.arg::<u32>("answer").as_deref(), Some(&42));

        // Wrong type yields nothing.
        assert!(cx.arg::<String>("answer").is_none());

        cx.remove_arg("answer");
        assert!(cx.arg::<u32>("answer").is_none());
    }
}
