//! The module registry and its resolution loop.
//!
//! A [`Package`] owns every registered [`Unit`], the default load options
//! and the in-flight [`LoadingStack`]. Resolution is a depth-first walk that
//! lives entirely on the call stack:
//!
//! ```text
//! Package::needs -> Package::load -> Unit::load -> Package::load (deps) -> ...
//! ```
//!
//! Each `Package::load` pushes its name, checks the stack for repeats, lets
//! the unit evaluate (which may recurse) and unwinds its entry on the way
//! out, whether the unit succeeded or not.
//!
//! # Threading
//!
//! `Package` is a cheap handle over `Rc<RefCell<..>>` and is therefore
//! neither `Send` nor `Sync`. All registration and resolution happens on one
//! thread. No `RefCell` borrow is held while a definition runs, so
//! definitions may call back into the package freely.
//!
//! # Examples
//!
//! ```rust
//! use modpack::Package;
//!
//! # fn main() -> modpack::Result<()> {
//! let package = Package::new();
//! package.define("greeting", (), |_, _| Ok("hello".to_string()))?;
//! package.define("shout", "greeting", |_, deps| {
//!     Ok(deps.get::<String>(0)?.to_uppercase())
//! })?;
//!
//! let shout = package.needs_as::<String>("shout")?;
//! assert_eq!(shout.as_str(), "HELLO");
//! # Ok(())
//! # }
//! ```

mod stack;
mod unit;
mod value;

pub use stack::LoadingStack;
pub use unit::{Unit, UnitState};
pub use value::{Deps, Resolved, ResolvedMap, Value, downcast};

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use strsim::levenshtein;

use crate::config::{LoadOptions, LoadOverrides};
use crate::core::{PackageError, Result};
use crate::graph::ModuleGraph;
use crate::names::{NameSpec, parse, validate_name};
use unit::Definition;

/// Registering a module under this name resolves it immediately.
pub const MAIN_MODULE: &str = "main";

/// Maximum edit distance, as a percentage of the requested name's length,
/// for a registered name to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

#[derive(Default)]
pub(crate) struct PackageState {
    units: HashMap<String, Rc<Unit>>,
    defaults: LoadOptions,
    stack: LoadingStack,
    load_count: u64,
}

/// Registry of named modules with lazy, memoized, cycle-checked resolution.
#[derive(Clone, Default)]
pub struct Package {
    inner: Rc<RefCell<PackageState>>,
}

impl Package {
    /// Create an empty package with all load options off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty package with the given default options.
    #[must_use]
    pub fn with_options(defaults: LoadOptions) -> Self {
        let package = Self::new();
        package.inner.borrow_mut().defaults = defaults;
        package
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<PackageState>>) -> Self {
        Self { inner }
    }

    /// Merge `overrides` into the default options.
    ///
    /// Only modules registered after this call see the change.
    pub fn config(&self, overrides: impl Into<LoadOverrides>) {
        let overrides = overrides.into();
        let mut state = self.inner.borrow_mut();
        state.defaults.apply(&overrides);
        tracing::debug!("Default load options now {:?}", state.defaults);
    }

    /// The current default options.
    #[must_use]
    pub fn options(&self) -> LoadOptions {
        self.inner.borrow().defaults
    }

    /// Returns `true` if a module named `name` is registered.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.inner.borrow().units.contains_key(name)
    }

    /// Returns `true` if `name` is registered and has been resolved.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.inner.borrow().units.get(name).is_some_and(|unit| unit.is_cached())
    }

    /// Look up a registered unit.
    ///
    /// Fails with [`PackageError::ModuleNotFound`]; when exactly one
    /// registered name matches ignoring case, the error names it.
    pub fn get_unit(&self, name: &str) -> Result<Rc<Unit>> {
        let unit = self.inner.borrow().units.get(name).cloned();
        unit.ok_or_else(|| self.not_found(name))
    }

    /// All registered module names, sorted.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().units.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of top-level resolution requests served so far.
    #[must_use]
    pub fn load_count(&self) -> u64 {
        self.inner.borrow().load_count
    }

    /// The chain of modules currently being resolved, outermost first.
    #[must_use]
    pub fn loading_stack(&self) -> Vec<String> {
        self.inner.borrow().stack.as_slice().to_vec()
    }

    /// Register a module with the default options.
    ///
    /// `deps` lists the dependency names in any [`NameSpec`] shape; their
    /// values are passed to `definition` in the same order. Registering
    /// [`MAIN_MODULE`] resolves it before this call returns.
    pub fn define<T, F>(&self, name: &str, deps: impl Into<NameSpec>, definition: F) -> Result<()>
    where
        T: Any,
        F: Fn(&Unit, &Deps) -> anyhow::Result<T> + 'static,
    {
        self.define_with(name, deps, LoadOverrides::new(), definition)
    }

    /// Register a module, merging `overrides` over the default options.
    ///
    /// # Errors
    ///
    /// - [`PackageError::InvalidName`] if `name` cannot be requested by name
    /// - [`PackageError::DuplicateModule`] if `name` is already registered
    /// - [`PackageError::InvalidDefinition`] if `deps` names an invalid module
    /// - any resolution error, if the module loads eagerly; the module stays
    ///   registered in that case
    pub fn define_with<T, F>(
        &self,
        name: &str,
        deps: impl Into<NameSpec>,
        overrides: LoadOverrides,
        definition: F,
    ) -> Result<()>
    where
        T: Any,
        F: Fn(&Unit, &Deps) -> anyhow::Result<T> + 'static,
    {
        validate_name(name)?;

        let dependencies = parse(&deps.into());
        for dependency in &dependencies {
            validate_name(dependency).map_err(|e| PackageError::InvalidDefinition {
                name: name.to_string(),
                reason: format!("dependency list is malformed: {e}"),
            })?;
        }

        let definition: Definition = Rc::new(move |unit: &Unit, deps: &Deps| {
            definition(unit, deps).map(|value| Rc::new(value) as Value)
        });

        let options = {
            let mut state = self.inner.borrow_mut();
            if state.units.contains_key(name) {
                return Err(PackageError::DuplicateModule {
                    name: name.to_string(),
                });
            }

            let options = state.defaults.merged(&overrides);
            let unit = Unit::new(
                name.to_string(),
                dependencies,
                options,
                definition,
                Rc::downgrade(&self.inner),
            );
            tracing::debug!("Registered module '{}' needing {:?}", name, unit.dependencies());
            state.units.insert(name.to_string(), Rc::new(unit));
            options
        };

        if name == MAIN_MODULE || options.load_now {
            tracing::debug!("Module '{}' loads on registration", name);
            self.resolve(&[name.to_string()])?;
        }

        Ok(())
    }

    /// Register a module whose definition does nothing and returns `()`.
    pub fn declare(&self, name: &str, deps: impl Into<NameSpec>) -> Result<()> {
        self.define(name, deps, |_, _| Ok(()))
    }

    /// Register a module with a no-op definition and explicit options.
    pub fn declare_with(
        &self,
        name: &str,
        deps: impl Into<NameSpec>,
        overrides: LoadOverrides,
    ) -> Result<()> {
        self.define_with(name, deps, overrides, |_, _| Ok(()))
    }

    /// Resolve modules and return their values.
    ///
    /// A single bare name returns [`Resolved::Value`]. Anything else (several
    /// names, a namespace shorthand, a sequence) returns [`Resolved::Map`]
    /// with one entry per distinct name, in resolution order.
    pub fn needs(&self, names: impl Into<NameSpec>) -> Result<Resolved> {
        let spec = names.into();
        let mut values = self.resolve(&parse(&spec))?;

        if spec.is_bare()
            && let Some((name, value)) = values.pop()
        {
            return Ok(Resolved::Value { name, value });
        }

        Ok(Resolved::Map(ResolvedMap::from_entries(values)))
    }

    /// Resolve one module and downcast its value to `T`.
    pub fn needs_as<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        let value = self.load_request(name)?;
        downcast(name, &value)
    }

    /// Resolve modules for their side effects, discarding the values.
    pub fn run(&self, names: impl Into<NameSpec>) -> Result<()> {
        self.resolve(&parse(&names.into())).map(drop)
    }

    /// Resolve a single module by exact name.
    ///
    /// This is the step the resolution loop performs for every dependency:
    /// push, cycle check, evaluate, unwind.
    pub fn load(&self, name: &str) -> Result<Value> {
        let unit = self.get_unit(name)?;

        let depth = {
            let mut state = self.inner.borrow_mut();
            let depth = state.stack.push(name);
            if let Err(e) = state.stack.check() {
                tracing::debug!("Cycle detected at '{}': {:?}", name, state.stack.as_slice());
                state.stack.unwind_to(depth);
                return Err(e);
            }
            depth
        };

        let result = unit.load();
        self.inner.borrow_mut().stack.unwind_to(depth);
        result
    }

    /// Snapshot the declared dependency graph of every registered module.
    #[must_use]
    pub fn graph(&self) -> ModuleGraph {
        let state = self.inner.borrow();
        let mut units: Vec<_> = state.units.iter().collect();
        units.sort_by(|a, b| a.0.cmp(b.0));

        let mut graph = ModuleGraph::new();
        for (name, unit) in units {
            graph.add_module(name);
            for dependency in unit.dependencies() {
                graph.add_dependency(name, dependency);
            }
        }
        graph
    }

    fn load_request(&self, name: &str) -> Result<Value> {
        self.begin_request(std::slice::from_ref(&name));
        self.load(name)
    }

    fn resolve(&self, names: &[String]) -> Result<Vec<(String, Value)>> {
        self.begin_request(names);
        names.iter().map(|name| Ok((name.clone(), self.load(name)?))).collect()
    }

    fn begin_request<S: fmt::Debug>(&self, names: &[S]) {
        let mut state = self.inner.borrow_mut();
        if state.stack.is_empty() {
            state.load_count += 1;
            tracing::debug!("Resolution request #{} for {:?}", state.load_count, names);
        }
    }

    fn not_found(&self, name: &str) -> PackageError {
        let state = self.inner.borrow();
        let lowered = name.to_lowercase();

        let mut case_matches =
            state.units.keys().filter(|candidate| candidate.to_lowercase() == lowered);
        let suggestion = match (case_matches.next(), case_matches.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        };

        PackageError::ModuleNotFound {
            name: name.to_string(),
            suggestion,
            similar: similar_names(name, state.units.keys()),
        }
    }
}

/// Up to three candidates close to `target` in edit distance, closest first.
fn similar_names<'a>(target: &str, candidates: impl Iterator<Item = &'a String>) -> Vec<String> {
    let limit = target.len() * SIMILARITY_THRESHOLD_PERCENT / 100;
    let mut scored: Vec<_> = candidates
        .map(|candidate| (levenshtein(target, candidate), candidate.clone()))
        .filter(|(distance, _)| *distance <= limit)
        .collect();

    scored.sort();
    scored.into_iter().take(3).map(|(_, name)| name).collect()
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Package")
            .field("modules", &state.units.len())
            .field("defaults", &state.defaults)
            .field("stack", &state.stack)
            .field("load_count", &state.load_count)
            .finish()
    }
}
