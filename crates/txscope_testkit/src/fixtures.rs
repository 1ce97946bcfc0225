//! Test fixtures bundling a registry, runner, and mock provider.

use crate::provider::{MockFactory, MockHandle, MockProvider};
use std::sync::Arc;
use txscope_core::{
    ExecutionContext, RegistryConfig, ResourceRegistry, TransactionRunner, DEFAULT_UNIT,
};

/// A runner wired to a mock provider, ready for scenario tests.
pub struct TestRunner {
    /// The runner under test.
    pub runner: TransactionRunner,
    /// The provider backing the registry, for counter inspection and
    /// failure injection.
    pub provider: MockProvider,
}

impl TestRunner {
    /// Creates a runner with a single unit named
    /// [`DEFAULT_UNIT`](txscope_core::DEFAULT_UNIT).
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default_unit("test-main"))
    }

    /// Creates a runner with the given registry configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        let provider = MockProvider::new();
        let registry =
            ResourceRegistry::start(&config, &provider).expect("failed to start test registry");
        Self {
            runner: TransactionRunner::new(Arc::new(registry)),
            provider,
        }
    }

    /// Returns the factory for the named unit.
    pub fn factory(&self, name: &str) -> MockFactory {
        self.provider
            .factory(name)
            .expect("no factory for requested unit")
    }

    /// Returns the factory for the default unit.
    pub fn default_factory(&self) -> MockFactory {
        self.factory(DEFAULT_UNIT)
    }

    /// Returns the most recently created handle of the default unit.
    pub fn last_handle(&self) -> Arc<MockHandle> {
        self.default_factory()
            .last_handle()
            .expect("no handle has been created yet")
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestRunner {
    type Target = TransactionRunner;

    fn deref(&self) -> &Self::Target {
        &self.runner
    }
}

/// Runs `f` inside a freshly entered execution context.
pub fn with_context<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ExecutionContext::enter();
    f()
}

/// Initializes a tracing subscriber for test output.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
