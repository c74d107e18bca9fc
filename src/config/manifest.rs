//! TOML manifests describing a package without Rust code.
//!
//! ```toml
//! [defaults]
//! log_on_load = true
//!
//! [modules]
//! main = ["app: config server"]
//! "app/config" = []
//! "app/server" = { needs = ["app/config"], log_after_load = true }
//! ```
//!
//! Every module is registered with a definition that does nothing, so a
//! manifest is enough to check a dependency layout, print its load order, or
//! watch the order in which definitions would run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::{LoadOptions, LoadOverrides};
use crate::core::{PackageError, Result};
use crate::graph::ModuleGraph;
use crate::names::{NameSpec, parse, validate_name};
use crate::package::{MAIN_MODULE, Package};

/// A manifest: default options plus module declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Defaults merged into every module.
    #[serde(default)]
    pub defaults: LoadOptions,

    /// Module declarations keyed by module name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}

/// One module declaration.
///
/// Either a plain list of dependency specs or a table with `needs` and
/// option overrides. Dependency specs use the same syntax as `needs`, so
/// `"db: pool cache"` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleEntry {
    /// `name = ["dep", "ns: a b"]`
    Simple(Vec<String>),
    /// `name = { needs = [...], load_now = true }`
    Detailed(DetailedModule),
}

/// The table form of a module declaration. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetailedModule {
    /// Dependency specs
    pub needs: Vec<String>,
    /// Override for [`LoadOptions::load_now`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_now: Option<bool>,
    /// Override for [`LoadOptions::log_on_load`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_on_load: Option<bool>,
    /// Override for [`LoadOptions::log_after_load`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_after_load: Option<bool>,
}

impl ModuleEntry {
    /// The dependency specs of this entry.
    #[must_use]
    pub fn needs(&self) -> &[String] {
        match self {
            Self::Simple(needs) => needs,
            Self::Detailed(detailed) => &detailed.needs,
        }
    }

    /// The option overrides of this entry.
    #[must_use]
    pub fn overrides(&self) -> LoadOverrides {
        match self {
            Self::Simple(_) => LoadOverrides::new(),
            Self::Detailed(detailed) => LoadOverrides {
                load_now: detailed.load_now,
                log_on_load: detailed.log_on_load,
                log_after_load: detailed.log_after_load,
            },
        }
    }
}

impl PackageConfig {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            PackageError::Toml(inner) => PackageError::ConfigError {
                message: format!("{}: {}", path.display(), inner),
            },
            other => other,
        })?;
        tracing::debug!("Loaded manifest {} with {} modules", path.display(), config.modules.len());
        Ok(config)
    }

    /// Returns `true` if `name` loads as soon as it is registered.
    #[must_use]
    pub fn is_eager(&self, name: &str, entry: &ModuleEntry) -> bool {
        name == MAIN_MODULE || self.defaults.merged(&entry.overrides()).load_now
    }

    /// Entries in the order they should be registered.
    ///
    /// Lazy modules come first, sorted by name. Eager modules follow in
    /// dependency order, so an eager module that needs another eager module
    /// registers after it. If the graph has a cycle the eager group stays in
    /// name order and the cycle surfaces when the first eager module loads.
    #[must_use]
    pub fn registration_order(&self) -> Vec<(&str, &ModuleEntry)> {
        let (mut eager, lazy): (Vec<_>, Vec<_>) =
            self.modules.iter().partition(|(name, entry)| self.is_eager(name, entry));

        if eager.len() > 1
            && let Ok(order) = self.graph().load_order()
        {
            let position: HashMap<&str, usize> =
                order.iter().enumerate().map(|(i, name)| (name.as_str(), i)).collect();
            eager.sort_by_key(|(name, _)| position.get(name.as_str()).copied());
        }

        lazy.into_iter().chain(eager).map(|(name, entry)| (name.as_str(), entry)).collect()
    }

    /// Register every module into `package` with a no-op definition.
    pub fn register_into(&self, package: &Package) -> Result<()> {
        for (name, entry) in self.registration_order() {
            package.declare_with(name, entry.needs(), entry.overrides())?;
        }
        Ok(())
    }

    /// Check every module name and dependency spec without registering.
    pub fn validate(&self) -> Result<()> {
        for (name, entry) in &self.modules {
            validate_name(name)?;
            for dependency in parse(&NameSpec::from(entry.needs())) {
                validate_name(&dependency).map_err(|e| PackageError::InvalidDefinition {
                    name: name.clone(),
                    reason: format!("dependency list is malformed: {e}"),
                })?;
            }
        }
        Ok(())
    }

    /// The declared dependency graph, without running anything.
    #[must_use]
    pub fn graph(&self) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for (name, entry) in &self.modules {
            graph.add_module(name);
            for dependency in parse(&NameSpec::from(entry.needs())) {
                graph.add_dependency(name, &dependency);
            }
        }
        graph
    }

    /// Build a new package with these defaults and modules.
    pub fn into_package(self) -> Result<Package> {
        let package = Package::with_options(self.defaults);
        self.register_into(&package)?;
        Ok(package)
    }
}
