//! Command-line interface for modpack.
//!
//! The binary works on TOML manifests (see [`crate::config`]) and exposes the
//! registry through four commands:
//!
//! - `check` - validate names, references and cycles without running anything
//! - `order` - print the order in which definitions would run
//! - `tree` - print the dependency tree below one module
//! - `run` - register the manifest and resolve modules, printing each one as
//!   its definition runs
//!
//! ```bash
//! modpack check modpack.toml
//! modpack order modpack.toml main
//! modpack --verbose run modpack.toml "app: server"
//! ```

mod check;
mod common;
mod order;
mod run;
mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use check::CheckCommand;
pub use order::OrderCommand;
pub use run::RunCommand;
pub use tree::TreeCommand;

/// Runtime configuration derived from global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can drive commands with
/// an explicit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging.
    pub log_level: Option<String>,
}

impl CliConfig {
    /// A configuration with logging disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log filter directive.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Install a stderr subscriber for the configured level.
    ///
    /// `RUST_LOG` takes precedence when set. Installing twice is a no-op.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Inspect and run module packages described by TOML manifests.
#[derive(Parser, Debug)]
#[command(name = "modpack", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging, including every registration and cache hit
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging; only results and errors are printed
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a manifest without running any module
    Check(CheckCommand),
    /// Print the order in which modules would load
    Order(OrderCommand),
    /// Print the dependency tree of a module
    Tree(TreeCommand),
    /// Resolve modules and report each one as it runs
    Run(RunCommand),
}

impl Cli {
    /// Execute the parsed command line.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Map `--verbose` and `--quiet` to a log level.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        if self.verbose {
            CliConfig::new().with_log_level("debug")
        } else if self.quiet {
            CliConfig::new()
        } else {
            CliConfig::new().with_log_level("info")
        }
    }

    /// Execute with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Check(cmd) => cmd.execute(),
            Commands::Order(cmd) => cmd.execute(),
            Commands::Tree(cmd) => cmd.execute(),
            Commands::Run(cmd) => cmd.execute(),
        }
    }
}
