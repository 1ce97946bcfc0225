//! Transaction demarcation policy.

/// Policy for one runner invocation.
///
/// The policy decides whether a transaction is begun, whether the handle is
/// visible on the context stack, and whether commit/rollback/close happen at
/// the end of the invocation. It is immutable per invocation; the only
/// override is that a failure in the work block forces `keep_open` off, since
/// a resource must never be left open across a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionPolicy {
    /// Skip transaction demarcation entirely; the work only reads.
    pub read_only: bool,

    /// Push the handle onto the context stack so nested code can reach it
    /// via [`current`](crate::current).
    pub visible_in_context: bool,

    /// Suppress automatic commit/rollback/close at the end of the
    /// invocation, for multi-call transaction spans. The caller owns the
    /// handle's remaining lifecycle.
    pub keep_open: bool,
}

impl Default for TransactionPolicy {
    fn default() -> Self {
        Self {
            read_only: false,
            visible_in_context: true,
            keep_open: false,
        }
    }
}

impl TransactionPolicy {
    /// Creates the default policy: read-write, visible in context,
    /// auto-closed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            read_only: false,
            visible_in_context: true,
            keep_open: false,
        }
    }

    /// Sets whether the invocation is read-only.
    #[must_use]
    pub const fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    /// Sets whether the handle is pushed onto the context stack.
    #[must_use]
    pub const fn visible_in_context(mut self, value: bool) -> Self {
        self.visible_in_context = value;
        self
    }

    /// Sets whether the handle is kept open past the invocation.
    #[must_use]
    pub const fn keep_open(mut self, value: bool) -> Self {
        self.keep_open = value;
        self
    }
}
