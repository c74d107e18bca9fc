//! Print the dependency tree of a module.
//!
//! ```text
//! main
//! ├── app/config
//! └── app/server
//!     └── app/config
//! ```

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

use super::common::CommandContext;

/// Display the modules below `name`.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Path to the manifest
    pub manifest: PathBuf,

    /// Root module of the tree
    pub name: String,
}

impl TreeCommand {
    /// Print the tree. Missing modules and cycles are marked inline rather
    /// than treated as errors.
    pub fn execute(self) -> Result<()> {
        let context = CommandContext::load(&self.manifest)?;
        if !context.config.modules.contains_key(&self.name) {
            bail!("Module '{}' is not declared in {}", self.name, self.manifest.display());
        }

        print!("{}", context.graph.to_tree_string(&self.name));
        Ok(())
    }
}
