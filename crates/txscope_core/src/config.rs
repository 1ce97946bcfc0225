//! Registry configuration.
//!
//! Maps logical unit names to the provider-side unit they resolve to.
//! Loading this mapping from files or the environment is the embedding
//! application's concern; this module only models the resolved values.

/// Name of the logical unit used by the convenience entry points.
pub const DEFAULT_UNIT: &str = "default";

/// Configuration for a single logical resource unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConfig {
    /// Logical unit name used by callers of the runner and registry.
    pub name: String,

    /// Name of the unit on the provider side.
    pub provider_unit: String,
}

impl UnitConfig {
    /// Creates a unit configuration.
    pub fn new(name: impl Into<String>, provider_unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_unit: provider_unit.into(),
        }
    }
}

/// Configuration for starting a [`ResourceRegistry`](crate::ResourceRegistry).
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Configured logical units, in declaration order.
    pub units: Vec<UnitConfig>,
}

impl RegistryConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with a single unit.
    pub fn of(name: impl Into<String>, provider_unit: impl Into<String>) -> Self {
        Self::new().unit(name, provider_unit)
    }

    /// Creates a configuration with a single unit named [`DEFAULT_UNIT`].
    pub fn default_unit(provider_unit: impl Into<String>) -> Self {
        Self::of(DEFAULT_UNIT, provider_unit)
    }

    /// Adds a unit to the configuration.
    #[must_use]
    pub fn unit(mut self, name: impl Into<String>, provider_unit: impl Into<String>) -> Self {
        self.units.push(UnitConfig::new(name, provider_unit));
        self
    }
}
