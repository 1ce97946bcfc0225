//! Process-lifetime registry of resource factories.

use crate::config::RegistryConfig;
use crate::error::{ScopeError, ScopeResult};
use crate::handle::{HandleRef, ResourceFactory, ResourceProvider};
use crate::lifecycle::ShutdownHooks;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the mapping from logical unit name to live resource factories.
///
/// The mapping is populated once at startup and immutable afterwards, so it
/// is the only state shared across concurrent units of work and needs no
/// locking on the acquire path.
pub struct ResourceRegistry {
    factories: HashMap<String, Box<dyn ResourceFactory>>,
    open: AtomicBool,
}

impl ResourceRegistry {
    /// Starts the registry, eagerly creating one factory per configured unit.
    ///
    /// Fails fast on the first unit whose factory cannot be created, closing
    /// any factories already created, so a half-started registry never
    /// escapes.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::DuplicateUnit`] if a unit name is configured
    /// twice, or [`ScopeError::StartupFailed`] naming the unit whose factory
    /// creation failed.
    pub fn start(config: &RegistryConfig, provider: &dyn ResourceProvider) -> ScopeResult<Self> {
        let mut factories: HashMap<String, Box<dyn ResourceFactory>> = HashMap::new();

        for unit in &config.units {
            if factories.contains_key(&unit.name) {
                Self::close_all(&factories);
                return Err(ScopeError::duplicate_unit(&unit.name));
            }
            match provider.create_factory(unit) {
                Ok(factory) => {
                    debug!(unit = %unit.name, provider_unit = %unit.provider_unit,
                        "created resource factory");
                    factories.insert(unit.name.clone(), factory);
                }
                Err(err) => {
                    Self::close_all(&factories);
                    return Err(ScopeError::startup_failed(&unit.name, err));
                }
            }
        }

        Ok(Self {
            factories,
            open: AtomicBool::new(true),
        })
    }

    /// Creates a fresh resource handle for the named unit.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::RegistryShutdown`] after [`shutdown`], or
    /// [`ScopeError::UnitNotFound`] for an unregistered name, or
    /// [`ScopeError::AcquisitionFailed`] when the factory cannot produce a
    /// handle.
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn acquire(&self, name: &str) -> ScopeResult<HandleRef> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(ScopeError::RegistryShutdown);
        }
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ScopeError::unit_not_found(name))?;
        factory
            .create()
            .map_err(|err| ScopeError::acquisition_failed(name, err))
    }

    /// Returns the configured unit names.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Returns whether the registry is still accepting acquisitions.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Shuts the registry down, closing every owned factory.
    ///
    /// A second call is a no-op; factories are closed exactly once. Close
    /// failures are logged and swallowed so one factory cannot block the
    /// teardown of the rest.
    pub fn shutdown(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            debug!("resource registry already shut down");
            return;
        }
        debug!(units = self.factories.len(), "shutting down resource registry");
        Self::close_all(&self.factories);
    }

    /// Registers this registry's shutdown on the given hook collector.
    pub fn register_shutdown(self: &Arc<Self>, hooks: &ShutdownHooks) {
        let registry = Arc::clone(self);
        hooks.register("resource-registry", move || registry.shutdown());
    }

    fn close_all(factories: &HashMap<String, Box<dyn ResourceFactory>>) {
        for (name, factory) in factories {
            if let Err(err) = factory.close() {
                warn!(unit = %name, error = %err, "failed to close resource factory");
            }
        }
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("units", &self.factories.keys().collect::<Vec<_>>())
            .field("open", &self.is_open())
            .finish()
    }
}
