//! harness::registry
//!
//! Named-dependency registry.
//!
//! Construction is fallible; nothing here panics, so library consumers
//! see registration failures as ordinary errors at the entry point.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::errors::{causes, Error};

use super::deps::{Docker, GraphqlCodegen, RustToolchain};
use super::{Dependency, Generator};

/// Mapping from dependency name to dependency, plus the subset that
/// can generate source artifacts.
#[derive(Default)]
pub struct Registry {
    deps: HashMap<String, Arc<dyn Dependency>>,
    generators: Vec<Arc<dyn Generator>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the standard toolchain and container runtime
    /// registered.
    pub fn with_defaults() -> Result<Self, Error> {
        let mut registry = Self::new();
        registry.register(Arc::new(RustToolchain::new()))?;
        registry.register(Arc::new(Docker::new()))?;
        registry.register_generator(Arc::new(GraphqlCodegen::default()))?;
        Ok(registry)
    }

    /// Register a dependency. Duplicate names are rejected.
    pub fn register(&mut self, dep: Arc<dyn Dependency>) -> Result<(), Error> {
        let name = dep.name().to_string();
        if self.deps.contains_key(&name) {
            return Err(Error::conflict(
                causes::DUPLICATE_DEPENDENCY,
                format!("dependency '{}' is already registered", name),
            ));
        }
        self.deps.insert(name, dep);
        Ok(())
    }

    /// Register a generator under its dependency name.
    pub fn register_generator(&mut self, gen: Arc<dyn Generator>) -> Result<(), Error> {
        self.register(gen.clone())?;
        self.generators.push(gen);
        Ok(())
    }

    /// Resolve dependencies in the requested order.
    ///
    /// # Errors
    ///
    /// Not-found naming the first unknown dependency.
    pub fn get(&self, names: &[&str]) -> Result<Vec<Arc<dyn Dependency>>, Error> {
        names
            .iter()
            .map(|name| {
                self.deps.get(*name).cloned().ok_or_else(|| {
                    Error::not_found(
                        causes::UNKNOWN_DEPENDENCY,
                        format!("unknown dependency '{}'", name),
                    )
                })
            })
            .collect()
    }

    /// All registered generators, in registration order.
    pub fn generators(&self) -> &[Arc<dyn Generator>] {
        &self.generators
    }
}
