//! Transaction orchestration around a unit of work.

use crate::config::DEFAULT_UNIT;
use crate::error::{ScopeError, ScopeResult};
use crate::handle::HandleRef;
use crate::policy::TransactionPolicy;
use crate::registry::ResourceRegistry;
use crate::stack;
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

/// Runs units of work against registry-acquired resources.
///
/// `run` is the single demarcation point: it acquires a handle, optionally
/// makes it visible on the context stack, begins and ends a transaction
/// around the supplied work, and releases the handle on every exit path. Once
/// a handle has been acquired, detach-and-close runs unconditionally unless
/// the policy keeps the handle open across a successful completion.
#[derive(Debug, Clone)]
pub struct TransactionRunner {
    registry: Arc<ResourceRegistry>,
}

impl TransactionRunner {
    /// Creates a runner over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Runs `work` in a transaction on the default unit with the default
    /// policy.
    pub fn with_transaction<T>(
        &self,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        self.run(DEFAULT_UNIT, TransactionPolicy::default(), work)
    }

    /// Runs `work` in a transaction on the named unit with the default
    /// policy.
    pub fn with_transaction_in<T>(
        &self,
        name: &str,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        self.run(name, TransactionPolicy::default(), work)
    }

    /// Runs `work` on the named unit without transaction demarcation.
    pub fn read_only<T>(
        &self,
        name: &str,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        self.run(name, TransactionPolicy::new().read_only(true), work)
    }

    /// Acquires a handle for the named unit, bypassing policy.
    ///
    /// The caller owns the handle's whole lifecycle; nothing is pushed onto
    /// the context stack and no transaction is begun.
    pub fn acquire(&self, name: &str) -> ScopeResult<HandleRef> {
        self.registry.acquire(name)
    }

    /// Runs `work` against a freshly acquired handle under `policy`.
    ///
    /// On success the transaction (if begun) is committed, or rolled back if
    /// the handle was marked rollback-only, and the result of `work` is
    /// returned either way. On failure from any step after acquisition, a
    /// rollback is attempted if a transaction is active; a secondary failure
    /// from that rollback is logged and swallowed so the primary error is
    /// what propagates. A failure also forces `keep_open` off.
    ///
    /// # Errors
    ///
    /// Propagates failures from acquisition, context binding, transaction
    /// begin, the work block itself, and commit/rollback. Cleanup-path
    /// failures (detach, close) are logged, never raised.
    pub fn run<T>(
        &self,
        name: &str,
        policy: TransactionPolicy,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        let span = debug_span!("unit_of_work", unit = name, read_only = policy.read_only);
        let _entered = span.enter();

        let handle = self.registry.acquire(name)?;
        debug!(handle = %handle.id(), "acquired resource");

        let mut keep_open = policy.keep_open;
        let result = Self::demarcate(&handle, policy, &mut keep_open, work);

        if !keep_open {
            Self::release(&handle, policy);
        }
        result
    }

    /// Transaction demarcation around `work`. The handle is already acquired;
    /// release is the caller's job.
    fn demarcate<T>(
        handle: &HandleRef,
        policy: TransactionPolicy,
        keep_open: &mut bool,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        let result = Self::try_demarcate(handle, policy, *keep_open, work);

        if result.is_err() {
            // A resource must never be left open across a failure.
            *keep_open = false;
            if handle.is_transaction_active() {
                if let Err(rollback_err) = handle.rollback() {
                    warn!(handle = %handle.id(), error = %rollback_err,
                        "rollback after failed unit of work also failed");
                }
            }
        }
        result
    }

    fn try_demarcate<T>(
        handle: &HandleRef,
        policy: TransactionPolicy,
        keep_open: bool,
        work: impl FnOnce(&HandleRef) -> ScopeResult<T>,
    ) -> ScopeResult<T> {
        if policy.visible_in_context {
            stack::push(Arc::clone(handle))?;
        }

        let begun = if policy.read_only {
            false
        } else {
            handle.begin_transaction()?;
            true
        };

        let value = work(handle)?;

        if begun && !keep_open {
            if handle.is_rollback_only() {
                debug!(handle = %handle.id(), "transaction marked rollback-only, rolling back");
                handle.rollback()?;
            } else {
                handle.commit()?;
            }
        }
        Ok(value)
    }

    /// Detaches the handle from the context and closes it. Runs on every
    /// exit path that does not keep the handle open.
    fn release(handle: &HandleRef, policy: TransactionPolicy) {
        if policy.visible_in_context {
            match stack::remove(handle) {
                Ok(()) => {}
                // A nested callee may already have removed the handle, and a
                // push that failed for lack of a context leaves nothing to
                // remove.
                Err(ScopeError::HandleNotFound | ScopeError::NoActiveContext) => {}
                Err(err) => {
                    warn!(handle = %handle.id(), error = %err,
                        "failed to detach resource from context");
                }
            }
        }
        if handle.is_open() {
            if let Err(err) = handle.close() {
                warn!(handle = %handle.id(), error = %err, "failed to close resource");
            }
        }
    }
}
