//! Print the order in which definitions would run.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{CommandContext, parse_names};

/// Print a load order.
///
/// With no names every module is listed, dependencies first. With names the
/// order is exactly the one `needs` would follow for that request.
#[derive(Args, Debug)]
pub struct OrderCommand {
    /// Path to the manifest
    pub manifest: PathBuf,

    /// Modules to resolve, in `needs` syntax (`"db: pool cache"`)
    pub names: Vec<String>,
}

impl OrderCommand {
    /// Print one module per line, numbered from 1.
    pub fn execute(self) -> Result<()> {
        let context = CommandContext::load(&self.manifest)?;
        context.verify()?;

        let order = if self.names.is_empty() {
            context.graph.load_order()?
        } else {
            context.graph.load_order_for(&parse_names(&self.names))?
        };

        for (position, name) in order.iter().enumerate() {
            println!("{:>3}. {}", position + 1, name);
        }
        Ok(())
    }
}
