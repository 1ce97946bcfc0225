//! # txscope Testkit
//!
//! Test utilities for txscope.
//!
//! This crate provides:
//! - An instrumented mock provider/factory/handle with operation counters
//!   and failure injection
//! - Fixtures bundling a registry, runner, and provider
//! - Property-based generators for policies and unit names
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txscope_testkit::prelude::*;
//!
//! #[test]
//! fn commits_on_success() {
//!     let t = TestRunner::new();
//!     with_context(|| t.with_transaction(|_| Ok(())).unwrap());
//!     assert_eq!(t.last_handle().commits(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod provider;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::provider::*;
}

pub use fixtures::*;
pub use generators::*;
pub use provider::*;
