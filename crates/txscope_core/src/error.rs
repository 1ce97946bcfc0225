//! Error types for the txscope core.

use std::error::Error;
use std::io;
use thiserror::Error;

/// Result type for scoping operations.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors that can occur while acquiring, scoping, or demarcating resources.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// Requested logical unit name has no registered factory.
    #[error("no resource unit registered under '{name}'")]
    UnitNotFound {
        /// The unregistered unit name.
        name: String,
    },

    /// The same unit name appeared twice in the registry configuration.
    #[error("duplicate resource unit '{name}' in configuration")]
    DuplicateUnit {
        /// The duplicated unit name.
        name: String,
    },

    /// The registry has been shut down; no further acquisitions are possible.
    #[error("resource registry has been shut down")]
    RegistryShutdown,

    /// A resource factory could not be created at registry startup.
    #[error("could not create resource factory for unit '{unit}': {source}")]
    StartupFailed {
        /// The unit whose factory creation failed.
        unit: String,
        /// The underlying failure.
        source: Box<ScopeError>,
    },

    /// A factory could not produce a resource handle.
    #[error("could not acquire a resource for unit '{unit}': {source}")]
    AcquisitionFailed {
        /// The unit the acquisition was for.
        unit: String,
        /// The underlying failure.
        source: Box<ScopeError>,
    },

    /// No execution context is bound to the calling thread.
    #[error("no execution context is bound to the current thread; enter an execution context before using context-visible resources")]
    NoActiveContext,

    /// An execution context is bound but no resource has been pushed onto it.
    #[error("no resource is bound to the current execution context; run the work inside a transactional scope")]
    NoActiveResource,

    /// Tried to pop an entry from an empty context stack.
    #[error("tried to pop a resource from an empty context stack")]
    StackUnderflow,

    /// The handle to remove is not present on the context stack.
    #[error("resource handle is not present on the context stack")]
    HandleNotFound,

    /// Operation attempted on a closed resource handle.
    #[error("resource handle is closed")]
    ResourceClosed,

    /// Commit or rollback attempted with no active transaction.
    #[error("no transaction is active on this resource")]
    NoActiveTransaction,

    /// Begin attempted while a transaction is already active.
    #[error("a transaction is already active on this resource")]
    TransactionActive,

    /// The persistence provider reported a failure.
    #[error("provider error: {message}")]
    Provider {
        /// Description of the provider failure.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A failure raised by the supplied unit of work.
    ///
    /// The source is carried unmodified so the caller of `run` sees the
    /// original failure, never a cleanup-path one.
    #[error("unit of work failed: {source}")]
    Work {
        /// The original failure from the work block.
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ScopeError {
    /// Creates a unit-not-found error.
    pub fn unit_not_found(name: impl Into<String>) -> Self {
        Self::UnitNotFound { name: name.into() }
    }

    /// Creates a duplicate-unit error.
    pub fn duplicate_unit(name: impl Into<String>) -> Self {
        Self::DuplicateUnit { name: name.into() }
    }

    /// Creates a startup-failed error for the named unit.
    pub fn startup_failed(unit: impl Into<String>, source: ScopeError) -> Self {
        Self::StartupFailed {
            unit: unit.into(),
            source: Box::new(source),
        }
    }

    /// Creates an acquisition-failed error for the named unit.
    pub fn acquisition_failed(unit: impl Into<String>, source: ScopeError) -> Self {
        Self::AcquisitionFailed {
            unit: unit.into(),
            source: Box::new(source),
        }
    }

    /// Creates a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary failure raised by a unit of work.
    pub fn work(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Work {
            source: source.into(),
        }
    }
}
