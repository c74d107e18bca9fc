//! Error handling for modpack
//!
//! This module provides the error types returned by the registry and the
//! user-facing presentation layer used by the CLI. The system follows two
//! principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`PackageError`] - Enumerated failure modes of registration and resolution
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! Every error is fatal to the `define`/`needs`/`run` call that produced it.
//! Nothing is retried automatically and nothing is converted into a default
//! value; a failed resolution leaves the target module un-cached so a later
//! call can retry from scratch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modpack::core::{ErrorContext, PackageError};
//!
//! let context = ErrorContext::new(PackageError::DuplicateModule {
//!     name: "db".to_string(),
//! })
//! .with_suggestion("Pick a different name or reuse the existing module")
//! .with_details("Registration is write-once");
//!
//! context.display(); // coloured output on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = PackageError> = std::result::Result<T, E>;

/// Boxed error produced by a failing module definition.
pub type DefinitionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for modpack operations
///
/// # Error Categories
///
/// ## Registration
/// - [`InvalidName`] - Module name is empty or cannot be requested through the parser
/// - [`DuplicateModule`] - A module with the same name is already registered
/// - [`InvalidDefinition`] - The dependency manifest of a definition is malformed
///
/// ## Resolution
/// - [`ModuleNotFound`] - Resolution requested for an unregistered name
/// - [`CircularDependency`] - A name reappeared on the active resolution chain
/// - [`DefinitionFailed`] - A module's definition returned an error
/// - [`TypeMismatch`] - A resolved value was downcast to the wrong type
/// - [`PackageDropped`] - A unit outlived the package that owns it
///
/// ## Configuration
/// - [`ConfigError`], [`Io`], [`Toml`] - Manifest loading problems
///
/// [`InvalidName`]: PackageError::InvalidName
/// [`DuplicateModule`]: PackageError::DuplicateModule
/// [`InvalidDefinition`]: PackageError::InvalidDefinition
/// [`ModuleNotFound`]: PackageError::ModuleNotFound
/// [`CircularDependency`]: PackageError::CircularDependency
/// [`DefinitionFailed`]: PackageError::DefinitionFailed
/// [`TypeMismatch`]: PackageError::TypeMismatch
/// [`PackageDropped`]: PackageError::PackageDropped
/// [`ConfigError`]: PackageError::ConfigError
/// [`Io`]: PackageError::Io
/// [`Toml`]: PackageError::Toml
#[derive(Error, Debug)]
pub enum PackageError {
    /// Module name is not a usable, non-empty name
    ///
    /// Names must be non-empty, must not contain whitespace (the name parser
    /// would split them) and must not end with `:` (the parser would read them
    /// as a namespace prefix).
    #[error("Invalid module name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: &'static str,
    },

    /// A module with this name already exists
    ///
    /// Registration is write-once. The existing module is left untouched.
    #[error("Module '{name}' is already defined")]
    DuplicateModule {
        /// The name that was registered twice
        name: String,
    },

    /// The definition's dependency manifest is malformed
    #[error("Invalid definition for module '{name}': {reason}")]
    InvalidDefinition {
        /// The module being defined
        name: String,
        /// Description of the problem
        reason: String,
    },

    /// No module is registered under the requested name
    ///
    /// When exactly one registered name matches the request ignoring letter
    /// case, it is carried in `suggestion` and named in the message. `similar`
    /// holds up to three registered names within a small edit distance and is
    /// used by [`user_friendly_error`](crate::core::user_friendly_error).
    #[error("Module '{name}' is not defined{}", case_hint(.suggestion))]
    ModuleNotFound {
        /// The requested name
        name: String,
        /// A registered name differing only in letter case, if unique
        suggestion: Option<String>,
        /// Registered names that are close in edit distance
        similar: Vec<String>,
    },

    /// A name appeared more than once on the active resolution stack
    #[error("Circular dependency detected: {} (chain: {})", .duplicates.join(", "), .chain.join(" -> "))]
    CircularDependency {
        /// Every name that occurs more than once on the stack
        duplicates: Vec<String>,
        /// The full active resolution chain at the time of detection
        chain: Vec<String>,
    },

    /// A module's definition returned an error
    #[error("Module '{name}' failed to load")]
    DefinitionFailed {
        /// The module whose definition failed
        name: String,
        /// The error returned by the definition
        #[source]
        source: DefinitionError,
    },

    /// A resolved value is not of the requested type
    #[error("Module '{name}' does not hold a value of type {expected}")]
    TypeMismatch {
        /// The module whose value was requested
        name: String,
        /// The requested type name
        expected: &'static str,
    },

    /// The package owning a unit no longer exists
    #[error("Package owning module '{name}' has been dropped")]
    PackageDropped {
        /// The unit that tried to resolve through its package
        name: String,
    },

    /// Manifest or option configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// I/O error while reading a manifest
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error while reading a manifest
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Catch-all used when re-presenting errors found deep in a chain
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

fn case_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(candidate) => format!(" (did you mean '{candidate}'?)"),
        None => String::new(),
    }
}

impl PackageError {
    /// Returns `true` for the cycle error, at any depth of definition wrapping.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        match self {
            Self::CircularDependency { .. } => true,
            Self::DefinitionFailed { source, .. } => source
                .downcast_ref::<Self>()
                .is_some_and(Self::is_circular),
            _ => false,
        }
    }
}

/// Error wrapper that adds user-friendly details and a suggestion
///
/// The CLI converts every failure into an `ErrorContext` before printing it.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PackageError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: PackageError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
