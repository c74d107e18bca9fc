//! Manifest loading shared by the commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::PackageConfig;
use crate::core::PackageError;
use crate::graph::ModuleGraph;
use crate::names::{NameSpec, parse};

/// A parsed manifest and its declared graph.
#[derive(Debug)]
pub struct CommandContext {
    /// The parsed manifest
    pub config: PackageConfig,
    /// Dependency graph built from the manifest
    pub graph: ModuleGraph,
    /// Where the manifest was read from
    pub manifest_path: PathBuf,
}

impl CommandContext {
    /// Read `manifest_path` and validate every name in it.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let config = PackageConfig::load(manifest_path)
            .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
        config.validate()?;
        let graph = config.graph();

        Ok(Self {
            config,
            graph,
            manifest_path: manifest_path.to_path_buf(),
        })
    }

    /// Fail if a dependency names an undeclared module or the graph has a
    /// cycle.
    pub fn verify(&self) -> Result<()> {
        let missing = self.graph.missing();
        if !missing.is_empty() {
            return Err(PackageError::ConfigError {
                message: format!(
                    "{} depends on undeclared modules: {}",
                    self.manifest_path.display(),
                    missing.join(", ")
                ),
            }
            .into());
        }

        self.graph.detect_cycles()?;
        Ok(())
    }
}

/// Expand command-line name arguments with the `needs` syntax.
pub fn parse_names(args: &[String]) -> Vec<String> {
    parse(&NameSpec::from(args))
}
