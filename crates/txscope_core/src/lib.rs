//! # txscope Core
//!
//! Transactional resource scoping for one logical unit of work.
//!
//! This crate provides:
//! - A registry mapping logical unit names to resource factories
//! - A per-context stack of acquired resource handles
//! - Policy-driven transaction demarcation around work blocks
//! - Guaranteed release of every acquired resource on every exit path
//! - Shutdown hook plumbing for process teardown
//!
//! Persistence itself is delegated to an external provider behind the
//! [`ResourceHandle`]/[`ResourceFactory`]/[`ResourceProvider`] traits; the
//! hard part this crate owns is the scoping, stacking, and lifecycle
//! discipline around those handles.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txscope_core::{
//!     ExecutionContext, RegistryConfig, ResourceRegistry, TransactionRunner,
//! };
//! use std::sync::Arc;
//!
//! let registry = ResourceRegistry::start(&RegistryConfig::default_unit("main"), &provider)?;
//! let runner = TransactionRunner::new(Arc::new(registry));
//!
//! let _scope = ExecutionContext::enter();
//! let value = runner.with_transaction(|handle| {
//!     // use the handle, or reach it from nested code via txscope_core::current()
//!     Ok(42)
//! })?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod policy;
pub mod registry;
pub mod runner;
pub mod stack;

#[cfg(test)]
mod test_support;

pub use config::{RegistryConfig, UnitConfig, DEFAULT_UNIT};
pub use context::{ContextGuard, ExecutionContext};
pub use error::{ScopeError, ScopeResult};
pub use handle::{
    same_handle, HandleId, HandleRef, ResourceFactory, ResourceHandle, ResourceProvider,
};
pub use lifecycle::ShutdownHooks;
pub use policy::TransactionPolicy;
pub use registry::ResourceRegistry;
pub use runner::TransactionRunner;
pub use stack::{current, ContextStack};
