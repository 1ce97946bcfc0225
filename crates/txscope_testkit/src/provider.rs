//! Instrumented mock provider, factory, and handle.
//!
//! Every lifecycle operation is counted and every step can be made to fail,
//! so tests can assert exact commit/rollback/close behavior and exercise the
//! suppressed-error cleanup paths.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use txscope_core::{
    HandleId, HandleRef, ResourceFactory, ResourceHandle, ResourceProvider, ScopeError,
    ScopeResult, UnitConfig,
};

/// Mock resource handle with operation counters and failure injection.
#[derive(Debug)]
pub struct MockHandle {
    id: HandleId,
    open: AtomicBool,
    tx_active: AtomicBool,
    rollback_only: AtomicBool,
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    closes: AtomicUsize,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
    fail_close: AtomicBool,
}

impl MockHandle {
    fn new() -> Self {
        Self {
            id: HandleId::new(),
            open: AtomicBool::new(true),
            tx_active: AtomicBool::new(false),
            rollback_only: AtomicBool::new(false),
            begins: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
            rollbacks: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_commit: AtomicBool::new(false),
            fail_rollback: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
        }
    }

    /// Number of successful `begin_transaction` calls.
    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Number of successful rollbacks.
    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Number of open-to-closed transitions (at most one).
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Makes the next commits fail, leaving the transaction active.
    pub fn fail_commit(&self, value: bool) {
        self.fail_commit.store(value, Ordering::SeqCst);
    }

    /// Makes the next rollbacks fail, leaving the transaction active.
    pub fn fail_rollback(&self, value: bool) {
        self.fail_rollback.store(value, Ordering::SeqCst);
    }

    /// Makes the next closes fail, leaving the handle open.
    pub fn fail_close(&self, value: bool) {
        self.fail_close.store(value, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> ScopeResult<()> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ScopeError::ResourceClosed)
        }
    }

    fn ensure_tx(&self) -> ScopeResult<()> {
        if self.tx_active.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ScopeError::NoActiveTransaction)
        }
    }
}

impl ResourceHandle for MockHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn begin_transaction(&self) -> ScopeResult<()> {
        self.ensure_open()?;
        if self.tx_active.swap(true, Ordering::SeqCst) {
            return Err(ScopeError::TransactionActive);
        }
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&self) -> ScopeResult<()> {
        self.ensure_open()?;
        self.ensure_tx()?;
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(ScopeError::provider("injected commit failure"));
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.tx_active.store(false, Ordering::SeqCst);
        self.rollback_only.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&self) -> ScopeResult<()> {
        self.ensure_open()?;
        self.ensure_tx()?;
        if self.fail_rollback.load(Ordering::SeqCst) {
            return Err(ScopeError::provider("injected rollback failure"));
        }
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.tx_active.store(false, Ordering::SeqCst);
        self.rollback_only.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_rollback_only(&self) {
        self.rollback_only.store(true, Ordering::SeqCst);
    }

    fn is_rollback_only(&self) -> bool {
        self.rollback_only.load(Ordering::SeqCst)
    }

    fn is_transaction_active(&self) -> bool {
        self.tx_active.load(Ordering::SeqCst)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) -> ScopeResult<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(ScopeError::provider("injected close failure"));
        }
        if self.open.swap(false, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct FactoryState {
    unit: UnitConfig,
    handles: Mutex<Vec<Arc<MockHandle>>>,
    closes: AtomicUsize,
    fail_create: AtomicBool,
}

/// Mock factory remembering every handle it created.
#[derive(Debug, Clone)]
pub struct MockFactory {
    state: Arc<FactoryState>,
}

impl MockFactory {
    fn new(unit: UnitConfig) -> Self {
        Self {
            state: Arc::new(FactoryState {
                unit,
                handles: Mutex::new(Vec::new()),
                closes: AtomicUsize::new(0),
                fail_create: AtomicBool::new(false),
            }),
        }
    }

    /// The unit configuration this factory was created for.
    pub fn unit(&self) -> UnitConfig {
        self.state.unit.clone()
    }

    /// All handles this factory has created, in creation order.
    pub fn handles(&self) -> Vec<Arc<MockHandle>> {
        self.state.handles.lock().clone()
    }

    /// The most recently created handle.
    pub fn last_handle(&self) -> Option<Arc<MockHandle>> {
        self.state.handles.lock().last().cloned()
    }

    /// Number of times the factory itself was closed.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Makes subsequent handle creation fail.
    pub fn fail_create(&self, value: bool) {
        self.state.fail_create.store(value, Ordering::SeqCst);
    }
}

impl ResourceFactory for MockFactory {
    fn create(&self) -> ScopeResult<HandleRef> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(ScopeError::provider("injected create failure"));
        }
        let handle = Arc::new(MockHandle::new());
        self.state.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }

    fn close(&self) -> ScopeResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock provider creating [`MockFactory`] instances.
#[derive(Debug, Default)]
pub struct MockProvider {
    factories: Mutex<HashMap<String, MockFactory>>,
    fail_units: Mutex<HashSet<String>>,
}

impl MockProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes factory creation fail for the named unit.
    pub fn fail_unit(&self, name: impl Into<String>) {
        self.fail_units.lock().insert(name.into());
    }

    /// Returns the factory created for the named unit, if any.
    pub fn factory(&self, name: &str) -> Option<MockFactory> {
        self.factories.lock().get(name).cloned()
    }
}

impl ResourceProvider for MockProvider {
    fn create_factory(&self, unit: &UnitConfig) -> ScopeResult<Box<dyn ResourceFactory>> {
        if self.fail_units.lock().contains(&unit.name) {
            return Err(ScopeError::provider("injected factory failure"));
        }
        let factory = MockFactory::new(unit.clone());
        self.factories
            .lock()
            .insert(unit.name.clone(), factory.clone());
        Ok(Box::new(factory))
    }
}
