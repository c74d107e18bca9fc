//! A registered module and its lazy, memoized evaluation.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::value::{Deps, Resolved, Value};
use super::{Package, PackageState};
use crate::config::LoadOptions;
use crate::core::{DefinitionError, PackageError, Result};
use crate::names::NameSpec;

/// Type-erased module definition.
pub(crate) type Definition = Rc<dyn Fn(&Unit, &Deps) -> anyhow::Result<Value>>;

/// Lifecycle of a unit.
///
/// `Defined -> Loading -> Cached`. A definition that fails sends the unit
/// back to `Defined`; failures are never memoized.
#[derive(Debug, Clone)]
pub enum UnitState {
    /// Registered, never successfully resolved
    Defined,
    /// Dependencies or definition currently running
    Loading,
    /// Resolved; the value is returned to every later request
    Cached(Value),
}

/// A named, lazily evaluated, memoized module.
///
/// Units are created by [`Package::define`] and owned by their package. A
/// unit is also a resolution context: the `&Unit` passed to a definition can
/// request further modules that were not declared up front.
pub struct Unit {
    name: String,
    dependencies: Vec<String>,
    options: LoadOptions,
    definition: Definition,
    state: RefCell<UnitState>,
    package: Weak<RefCell<PackageState>>,
}

impl Unit {
    pub(crate) fn new(
        name: String,
        dependencies: Vec<String>,
        options: LoadOptions,
        definition: Definition,
        package: Weak<RefCell<PackageState>>,
    ) -> Self {
        Self {
            name,
            dependencies,
            options,
            definition,
            state: RefCell::new(UnitState::Defined),
            package,
        }
    }

    /// The module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dependency names, in the order their values are passed.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Options frozen at registration.
    #[must_use]
    pub const fn options(&self) -> LoadOptions {
        self.options
    }

    /// A snapshot of the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.state.borrow().clone()
    }

    /// Returns `true` once the definition has completed successfully.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        matches!(*self.state.borrow(), UnitState::Cached(_))
    }

    /// The memoized value, if any.
    #[must_use]
    pub fn cached_value(&self) -> Option<Value> {
        match &*self.state.borrow() {
            UnitState::Cached(value) => Some(Rc::clone(value)),
            _ => None,
        }
    }

    /// Return the memoized value, evaluating the module first if needed.
    ///
    /// On first success the declared dependencies are resolved in order, the
    /// definition is called with their values and the result is cached.
    /// Later calls return the cached value without side effects. Calling
    /// this while the unit is still loading fails with
    /// [`PackageError::CircularDependency`].
    pub fn load(&self) -> Result<Value> {
        if let Some(value) = self.cached_value() {
            tracing::trace!("Module '{}' served from cache", self.name);
            return Ok(value);
        }

        let package = self.package()?;
        if matches!(*self.state.borrow(), UnitState::Loading) {
            let mut chain = package.loading_stack();
            chain.push(self.name.clone());
            tracing::debug!("Module '{}' re-entered while loading", self.name);
            return Err(PackageError::CircularDependency {
                duplicates: vec![self.name.clone()],
                chain,
            });
        }
        *self.state.borrow_mut() = UnitState::Loading;

        if self.options.log_on_load {
            tracing::info!("Loading module '{}'", self.name);
        }

        match self.evaluate(&package) {
            Ok(value) => {
                *self.state.borrow_mut() = UnitState::Cached(Rc::clone(&value));
                if self.options.log_after_load {
                    tracing::info!("Finished loading module '{}'", self.name);
                }
                Ok(value)
            }
            Err(e) => {
                *self.state.borrow_mut() = UnitState::Defined;
                tracing::warn!("Module '{}' failed to load: {}", self.name, e);
                Err(e)
            }
        }
    }

    fn evaluate(&self, package: &Package) -> Result<Value> {
        let mut resolved = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            resolved.push((dependency.clone(), package.load(dependency)?));
        }

        let deps = Deps::new(resolved);
        (self.definition)(self, &deps).map_err(|source| PackageError::DefinitionFailed {
            name: self.name.clone(),
            source: match source.downcast::<PackageError>() {
                Ok(inner) => Box::new(inner) as DefinitionError,
                Err(other) => other.into(),
            },
        })
    }

    /// Resolve additional modules through the owning package.
    ///
    /// Same argument shapes and return rules as [`Package::needs`].
    pub fn needs(&self, names: impl Into<NameSpec>) -> Result<Resolved> {
        self.package()?.needs(names)
    }

    /// Resolve one module through the owning package and downcast it.
    pub fn needs_as<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        self.package()?.needs_as(name)
    }

    /// Resolve modules for their side effects only.
    pub fn run(&self, names: impl Into<NameSpec>) -> Result<()> {
        self.package()?.run(names)
    }

    /// The owning package.
    pub fn package(&self) -> Result<Package> {
        self.package.upgrade().map(Package::from_inner).ok_or_else(|| {
            PackageError::PackageDropped {
                name: self.name.clone(),
            }
        })
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("options", &self.options)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
