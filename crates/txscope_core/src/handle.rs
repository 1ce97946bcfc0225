//! Resource handle and factory traits.
//!
//! These are the seams to the external persistence provider. The core never
//! creates transactions itself; it drives these traits according to the
//! demarcation policy and guarantees release.

use crate::config::UnitConfig;
use crate::error::ScopeResult;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a live resource handle.
///
/// Used for identity in log output; stack membership is decided by pointer
/// identity, not by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Generates a fresh handle id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live, stateful persistence session with one transaction scope.
///
/// A handle is owned by the `run` invocation that acquired it and is not safe
/// for concurrent use; when visible in the execution context it is jointly
/// referenced, but only the acquiring invocation ever closes it.
pub trait ResourceHandle: fmt::Debug {
    /// Returns this handle's identifier.
    fn id(&self) -> HandleId;

    /// Begins a transaction on this handle.
    fn begin_transaction(&self) -> ScopeResult<()>;

    /// Commits the active transaction.
    fn commit(&self) -> ScopeResult<()>;

    /// Rolls back the active transaction.
    fn rollback(&self) -> ScopeResult<()>;

    /// Marks the active transaction so it must be rolled back at the commit
    /// point instead of committed.
    ///
    /// Nested work uses this to veto an outer commit without having direct
    /// control of the transaction.
    fn set_rollback_only(&self);

    /// Returns whether the transaction is marked rollback-only.
    fn is_rollback_only(&self) -> bool;

    /// Returns whether a transaction is active.
    fn is_transaction_active(&self) -> bool;

    /// Returns whether the handle is open.
    fn is_open(&self) -> bool;

    /// Closes the handle. Closing an already-closed handle is a no-op.
    fn close(&self) -> ScopeResult<()>;
}

/// Shared reference to a resource handle.
pub type HandleRef = Arc<dyn ResourceHandle>;

/// Returns whether two handle references point at the same handle.
///
/// Compares data pointers so two references to the same allocation always
/// match, regardless of how the trait object was produced.
#[must_use]
pub fn same_handle(a: &HandleRef, b: &HandleRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Creates resource handles for one logical unit.
///
/// Factories live for the process lifetime inside the registry and are shared
/// across concurrent units of work.
pub trait ResourceFactory: Send + Sync {
    /// Creates a fresh resource handle.
    fn create(&self) -> ScopeResult<HandleRef>;

    /// Closes the factory and releases provider-side resources.
    fn close(&self) -> ScopeResult<()>;
}

/// Maps unit configuration to resource factories.
///
/// Implemented by the external persistence provider; called once per
/// configured unit at registry startup.
pub trait ResourceProvider {
    /// Creates the factory for one configured unit.
    fn create_factory(&self, unit: &UnitConfig) -> ScopeResult<Box<dyn ResourceFactory>>;
}
