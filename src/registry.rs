//! Filter registry and active filter selection
//!
//! The registry maps filter names to color cubes and is immutable once
//! built. A [`FilterContext`] owns a registry plus the single active
//! selection; switching filters swaps that selection under a lock, so a
//! reader always sees a complete old or new table.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::lut::ColorCube;

/// Reserved name of the identity (no table) filter
pub const NO_FILTER: &str = "None";

/// Builder for [`FilterRegistry`]
#[derive(Debug)]
pub struct FilterRegistryBuilder {
    filters: BTreeMap<String, Option<Arc<ColorCube>>>,
}

impl FilterRegistryBuilder {
    /// Register a table under `name`.
    ///
    /// Registering a name again replaces its table. The reserved
    /// [`NO_FILTER`] name cannot be registered.
    pub fn register(self, name: impl Into<String>, cube: ColorCube) -> Result<Self> {
        self.register_shared(name, Arc::new(cube))
    }

    /// Register an already shared table
    pub fn register_shared(mut self, name: impl Into<String>, cube: Arc<ColorCube>) -> Result<Self> {
        let name = name.into();
        if name == NO_FILTER {
            return Err(Error::ReservedFilterName(name));
        }
        if self.filters.insert(name.clone(), Some(cube)).is_some() {
            tracing::debug!("Replaced filter table: {}", name);
        }
        Ok(self)
    }

    /// Finish construction
    pub fn build(self) -> FilterRegistry {
        tracing::info!("Initialized {} filters in the filter registry", self.filters.len());
        FilterRegistry {
            filters: self.filters,
        }
    }
}

/// Immutable name → table mapping
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Option<Arc<ColorCube>>>,
}

impl FilterRegistry {
    /// Start a registry containing only the identity filter
    pub fn builder() -> FilterRegistryBuilder {
        let mut filters = BTreeMap::new();
        filters.insert(NO_FILTER.to_string(), None);
        FilterRegistryBuilder { filters }
    }

    /// Look up a filter. `Ok(None)` is the identity filter.
    pub fn lookup(&self, name: &str) -> Result<Option<Arc<ColorCube>>> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFilter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names in sorted order (includes [`NO_FILTER`])
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Never true for a registry made by [`FilterRegistry::builder`]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
struct Selection {
    name: String,
    table: Option<Arc<ColorCube>>,
}

/// A registry plus the active filter selection.
///
/// Shared between the thread that switches filters and the threads that
/// process frames. Starts with [`NO_FILTER`] active.
#[derive(Debug)]
pub struct FilterContext {
    registry: FilterRegistry,
    active: RwLock<Selection>,
}

impl FilterContext {
    pub fn new(registry: FilterRegistry) -> Self {
        Self {
            registry,
            active: RwLock::new(Selection {
                name: NO_FILTER.to_string(),
                table: None,
            }),
        }
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Make `name` the active filter.
    ///
    /// On an unknown name the previous selection stays in effect.
    pub fn activate(&self, name: &str) -> Result<()> {
        let table = match self.registry.lookup(name) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Filter not found: {}", name);
                return Err(e);
            }
        };

        *self.active.write() = Selection {
            name: name.to_string(),
            table,
        };
        tracing::debug!("Switched filter to: {}", name);
        Ok(())
    }

    /// Boolean form of [`activate`](Self::activate)
    pub fn set_active_filter(&self, name: &str) -> bool {
        self.activate(name).is_ok()
    }

    /// Table of the active filter (`None` for identity)
    pub fn current(&self) -> Option<Arc<ColorCube>> {
        self.active.read().table.clone()
    }

    /// Name of the active filter
    pub fn active_name(&self) -> String {
        self.active.read().name.clone()
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(FilterRegistry::default())
    }
}
