//! modpack - a synchronous, in-process module registry
//!
//! Code is organised into named modules whose values are produced by
//! definitions. A definition runs at most once, the first time its module is
//! needed, after every module it depends on has been resolved. Values are
//! memoized, failures are not, and a module that ends up depending on itself
//! is reported with the full chain instead of recursing forever.
//!
//! # Architecture Overview
//!
//! - [`package`] - the registry: `define`, `needs`, `run`, lazy units and the
//!   loading stack used for cycle detection
//! - [`names`] - the `"ns: a b"` name syntax shared by every entry point
//! - [`config`] - load options and TOML manifests
//! - [`graph`] - static view of the declared dependencies (load order, trees)
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - the `modpack` command-line tool
//!
//! # Example
//!
//! ```rust
//! use modpack::{Package, PackageError};
//!
//! # fn main() -> modpack::Result<()> {
//! let package = Package::new();
//! package.define("db/url", (), |_, _| Ok("postgres://localhost".to_string()))?;
//! package.define("db/pool", "db: url", |_, deps| {
//!     Ok(format!("pool({})", deps.get::<String>(0)?))
//! })?;
//!
//! let pool = package.needs_as::<String>("db/pool")?;
//! assert_eq!(pool.as_str(), "pool(postgres://localhost)");
//!
//! let err = package.needs("db/pol").unwrap_err();
//! assert!(matches!(err, PackageError::ModuleNotFound { .. }));
//! # Ok(())
//! # }
//! ```
//!
//! # Manifest Format
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

pub mod cli;
pub mod config;
pub mod core;
pub mod graph;
pub mod names;
pub mod package;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{LoadOptions, LoadOverrides, ModuleEntry, PackageConfig};
pub use core::{ErrorContext, PackageError, Result};
pub use graph::ModuleGraph;
pub use names::NameSpec;
pub use package::{Deps, MAIN_MODULE, Package, Resolved, ResolvedMap, Unit, UnitState, Value};
