//! In-crate test doubles for the handle traits.

use crate::config::UnitConfig;
use crate::error::{ScopeError, ScopeResult};
use crate::handle::{HandleId, HandleRef, ResourceFactory, ResourceHandle, ResourceProvider};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Instrumented resource handle counting every lifecycle operation.
#[derive(Debug)]
pub(crate) struct StubHandle {
    id: HandleId,
    open: AtomicBool,
    tx_active: AtomicBool,
    rollback_only: AtomicBool,
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    closes: AtomicUsize,
    fail_rollback: AtomicBool,
}

impl StubHandle {
    pub(crate) fn new() -> Self {
        Self {
            id: HandleId::new(),
            open: AtomicBool::new(true),
            tx_active: AtomicBool::new(false),
            rollback_only: AtomicBool::new(false),
            begins: AtomicUsize::new(0),
            commits: AtomicUsize::new(0),
            rollbacks: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_rollback: AtomicBool::new(false),
        }
    }

    pub(crate) fn open_ref() -> HandleRef {
        Arc::new(Self::new())
    }

    pub(crate) fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub(crate) fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_rollback(&self, value: bool) {
        self.fail_rollback.store(value, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> ScopeResult<()> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ScopeError::ResourceClosed)
        }
    }
}

impl ResourceHandle for StubHandle {
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
        if !self.tx_active.load(Ordering::SeqCst) {
            return Err(ScopeError::NoActiveTransaction);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.tx_active.store(false, Ordering::SeqCst);
        self.rollback_only.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&self) -> ScopeResult<()> {
        self.ensure_open()?;
        if !self.tx_active.load(Ordering::SeqCst) {
            return Err(ScopeError::NoActiveTransaction);
        }
        if self.fail_rollback.load(Ordering::SeqCst) {
            // Leave the transaction active, as a wedged provider would.
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
        if self.open.swap(false, Ordering::SeqCst) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct FactoryState {
    handles: Mutex<Vec<Arc<StubHandle>>>,
    closes: AtomicUsize,
    fail_create: AtomicBool,
}

/// Factory handing out stub handles and remembering every one it created.
#[derive(Debug, Clone)]
pub(crate) struct StubFactory {
    state: Arc<FactoryState>,
}

impl StubFactory {
    fn new() -> Self {
        Self {
            state: Arc::new(FactoryState {
                handles: Mutex::new(Vec::new()),
                closes: AtomicUsize::new(0),
                fail_create: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn last_handle(&self) -> Option<Arc<StubHandle>> {
        self.state.handles.lock().last().cloned()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_create(&self, value: bool) {
        self.state.fail_create.store(value, Ordering::SeqCst);
    }
}

impl ResourceFactory for StubFactory {
    fn create(&self) -> ScopeResult<HandleRef> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(ScopeError::provider("injected create failure"));
        }
        let handle = Arc::new(StubHandle::new());
        self.state.handles.lock().push(Arc::clone(&handle));
        Ok(handle)
    }

    fn close(&self) -> ScopeResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider creating stub factories, with per-unit failure injection.
#[derive(Debug, Default)]
pub(crate) struct StubProvider {
    factories: Mutex<HashMap<String, StubFactory>>,
    fail_units: Mutex<HashSet<String>>,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_unit(&self, name: impl Into<String>) {
        self.fail_units.lock().insert(name.into());
    }

    pub(crate) fn factory(&self, name: &str) -> Option<StubFactory> {
        self.factories.lock().get(name).cloned()
    }

    pub(crate) fn factory_close_count(&self, name: &str) -> usize {
        self.factory(name).map_or(0, |factory| factory.close_count())
    }
}

impl ResourceProvider for StubProvider {
    fn create_factory(&self, unit: &UnitConfig) -> ScopeResult<Box<dyn ResourceFactory>> {
        if self.fail_units.lock().contains(&unit.name) {
            return Err(ScopeError::provider("injected factory failure"));
        }
        let factory = StubFactory::new();
        self.factories
            .lock()
            .insert(unit.name.clone(), factory.clone());
        Ok(Box::new(factory))
    }
}
