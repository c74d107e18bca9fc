//! Register a manifest and resolve modules for real.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::common::{CommandContext, parse_names};
use crate::package::Package;

/// Resolve modules and print each one as its definition runs.
///
/// Eager modules (`main` and `load_now`) run while the manifest is being
/// registered. Afterwards the requested names are resolved; with no names,
/// every module not yet loaded is resolved in name order.
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Path to the manifest
    pub manifest: PathBuf,

    /// Modules to resolve, in `needs` syntax (`"db: pool cache"`)
    pub names: Vec<String>,
}

impl RunCommand {
    /// Register, resolve and report.
    pub fn execute(self) -> Result<()> {
        let context = CommandContext::load(&self.manifest)?;
        let executed = Rc::new(RefCell::new(Vec::new()));
        let package = Package::with_options(context.config.defaults);

        for (name, entry) in context.config.registration_order() {
            let log = Rc::clone(&executed);
            package.define_with(name, entry.needs(), entry.overrides(), move |unit, _| {
                println!("{} {}", "→".cyan(), unit.name());
                log.borrow_mut().push(unit.name().to_string());
                Ok(())
            })?;
        }

        let requested: Vec<String> = if self.names.is_empty() {
            package
                .module_names()
                .into_iter()
                .filter(|name| !package.is_loaded(name))
                .collect()
        } else {
            parse_names(&self.names)
        };
        if !requested.is_empty() {
            package.run(requested)?;
        }

        let count = executed.borrow().len();
        println!(
            "{} {} modules loaded, resolution requests: {}",
            "✓".green(),
            count,
            package.load_count()
        );
        Ok(())
    }
}
