//! Per-context stack of visible resource handles.
//!
//! One stack exists per [`ExecutionContext`], created lazily on first use and
//! discarded with the context. The stack orders handles most-recently-pushed
//! first, which models nested `run` calls directly: code inside a unit of work
//! that asks for "the" resource gets the innermost one.
//!
//! Removal is by identity rather than strict LIFO position. This is
//! intentional: keep-open workflows let a handle outlive its creating call,
//! and a nested callee may legitimately close or replace a handle before
//! returning, so the cleanup path must be able to remove its own handle from
//! any position.

use crate::context::ExecutionContext;
use crate::error::{ScopeError, ScopeResult};
use crate::handle::{same_handle, HandleRef};
use std::cell::RefCell;
use std::rc::Rc;

/// Context arg key under which the stack is stored.
const STACK_KEY: &str = "txscope.resource_stack";

/// Ordered collection of resource handles visible in one execution context.
#[derive(Debug, Default)]
pub struct ContextStack {
    handles: RefCell<Vec<HandleRef>>,
}

impl ContextStack {
    fn new() -> Self {
        Self::default()
    }

    /// Returns the stack of the current execution context, creating it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NoActiveContext`] if no context is bound to the
    /// calling thread. This is distinct from an empty stack: callers must be
    /// able to tell "nothing bound" from "nothing to bind to".
    pub fn for_current() -> ScopeResult<Rc<ContextStack>> {
        let context = ExecutionContext::current().ok_or(ScopeError::NoActiveContext)?;
        if let Some(stack) = context.arg::<ContextStack>(STACK_KEY) {
            return Ok(stack);
        }
        let stack = Rc::new(ContextStack::new());
        let shared: Rc<dyn std::any::Any> = Rc::<ContextStack>::clone(&stack);
        context.put_arg(STACK_KEY, shared);
        Ok(stack)
    }

    /// Pushes a handle, making it the current resource of the context.
    pub fn push(&self, handle: HandleRef) {
        self.handles.borrow_mut().push(handle);
    }

    /// Returns the most recently pushed handle.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NoActiveResource`] if the stack is empty.
    pub fn top(&self) -> ScopeResult<HandleRef> {
        self.handles
            .borrow()
            .last()
            .cloned()
            .ok_or(ScopeError::NoActiveResource)
    }

    /// Removes `handle` from the stack by identity, regardless of position.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::HandleNotFound`] if the handle is absent.
    pub fn remove(&self, handle: &HandleRef) -> ScopeResult<()> {
        let mut handles = self.handles.borrow_mut();
        let position = handles
            .iter()
            .rposition(|entry| same_handle(entry, handle))
            .ok_or(ScopeError::HandleNotFound)?;
        handles.remove(position);
        Ok(())
    }

    /// Removes and returns the top entry.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::StackUnderflow`] if the stack is empty.
    pub fn pop_top(&self) -> ScopeResult<HandleRef> {
        self.handles
            .borrow_mut()
            .pop()
            .ok_or(ScopeError::StackUnderflow)
    }

    /// Returns whether `handle` is present on the stack.
    #[must_use]
    pub fn contains(&self, handle: &HandleRef) -> bool {
        self.handles
            .borrow()
            .iter()
            .any(|entry| same_handle(entry, handle))
    }

    /// Returns the number of handles on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    /// Returns whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }
}

/// Returns the current resource of the calling unit of work.
///
/// This is the read-side accessor for code running inside a transactional
/// scope that wants the resource without having it passed explicitly.
///
/// # Errors
///
/// Returns [`ScopeError::NoActiveResource`] if nothing has been pushed, or
/// [`ScopeError::NoActiveContext`] if no execution context is bound at all.
pub fn current() -> ScopeResult<HandleRef> {
    ContextStack::for_current()?.top()
}

/// Pushes a handle onto the current context's stack.
pub fn push(handle: HandleRef) -> ScopeResult<()> {
    ContextStack::for_current().map(|stack| stack.push(handle))
}

/// Removes a handle from the current context's stack by identity.
pub fn remove(handle: &HandleRef) -> ScopeResult<()> {
    ContextStack::for_current()?.remove(handle)
}

/// Removes and returns the top of the current context's stack.
pub fn pop() -> ScopeResult<HandleRef> {
    ContextStack::for_current()?.pop_top()
}
