//! Validate a manifest without running any module.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::CommandContext;

/// Check names, references and cycles.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Path to the manifest
    pub manifest: PathBuf,
}

impl CheckCommand {
    /// Run the check and print a summary.
    pub fn execute(self) -> Result<()> {
        let context = CommandContext::load(&self.manifest)?;
        context.verify()?;

        let eager = context
            .config
            .modules
            .iter()
            .filter(|(name, entry)| context.config.is_eager(name, entry))
            .count();

        tracing::debug!("{} passed all checks", self.manifest.display());
        println!(
            "{} {} modules, {} dependencies, {} loaded on registration",
            "✓".green(),
            context.graph.node_count(),
            context.graph.edge_count(),
            eager
        );
        Ok(())
    }
}
