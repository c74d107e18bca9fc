//! Configuration for modpack
//!
//! Two layers are configured here:
//!
//! 1. **Load options** ([`LoadOptions`]) - the per-module switches `load_now`,
//!    `log_on_load` and `log_after_load`. A package keeps a set of defaults;
//!    each registration merges call-site [`LoadOverrides`] on top and freezes
//!    the result into the new unit.
//! 2. **Manifests** ([`PackageConfig`]) - a TOML description of default
//!    options and module declarations, used by the CLI to build a package
//!    without writing Rust.
//!
//! # Merging
//!
//! Merging is key-by-key and the right-hand side wins. Only keys that are
//! set in an override replace the base value:
//!
//! ```rust
//! use modpack::config::{LoadOptions, LoadOverrides};
//!
//! let base = LoadOptions { log_on_load: true, ..LoadOptions::default() };
//! let merged = base.merged(&LoadOverrides::new().load_now(true));
//! assert!(merged.load_now);
//! assert!(merged.log_on_load);
//! ```

mod manifest;

pub use manifest::{DetailedModule, ModuleEntry, PackageConfig};

use serde::{Deserialize, Serialize};

/// Frozen options of a module, or the defaults of a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Resolve the module as soon as it is registered.
    pub load_now: bool,
    /// Emit an `info` event before the module's first resolution.
    pub log_on_load: bool,
    /// Emit an `info` event after the module's first resolution completes.
    pub log_after_load: bool,
}

impl LoadOptions {
    /// Return a copy with every key set in `overrides` replaced.
    #[must_use]
    pub fn merged(mut self, overrides: &LoadOverrides) -> Self {
        self.apply(overrides);
        self
    }

    /// Replace every key set in `overrides`, in place.
    pub fn apply(&mut self, overrides: &LoadOverrides) {
        if let Some(v) = overrides.load_now {
            self.load_now = v;
        }
        if let Some(v) = overrides.log_on_load {
            self.log_on_load = v;
        }
        if let Some(v) = overrides.log_after_load {
            self.log_after_load = v;
        }
    }
}

/// A partial set of [`LoadOptions`]; unset keys leave the base untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOverrides {
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

impl LoadOverrides {
    /// An override that changes nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            load_now: None,
            log_on_load: None,
            log_after_load: None,
        }
    }

    /// Set `load_now`.
    #[must_use]
    pub const fn load_now(mut self, value: bool) -> Self {
        self.load_now = Some(value);
        self
    }

    /// Set `log_on_load`.
    #[must_use]
    pub const fn log_on_load(mut self, value: bool) -> Self {
        self.log_on_load = Some(value);
        self
    }

    /// Set `log_after_load`.
    #[must_use]
    pub const fn log_after_load(mut self, value: bool) -> Self {
        self.log_after_load = Some(value);
        self
    }

    /// Returns `true` if no key is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.load_now.is_none() && self.log_on_load.is_none() && self.log_after_load.is_none()
    }
}

impl From<LoadOptions> for LoadOverrides {
    fn from(options: LoadOptions) -> Self {
        Self {
            load_now: Some(options.load_now),
            log_on_load: Some(options.log_on_load),
            log_after_load: Some(options.log_after_load),
        }
    }
}
