//! Core types for modpack
//!
//! This module holds the error system shared by the registry, the manifest
//! loader and the CLI:
//! - [`PackageError`] - Enumerated error types covering every failure mode
//! - [`ErrorContext`] - User-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error into a displayable context
//!
//! # Examples
//!
//! ```rust
//! use modpack::core::{PackageError, user_friendly_error};
//!
//! let error = anyhow::Error::from(PackageError::DuplicateModule {
//!     name: "db".to_string(),
//! });
//! let friendly = user_friendly_error(error);
//! assert!(friendly.suggestion.is_some());
//! ```

pub mod error;
mod error_formatting;

pub use error::{DefinitionError, ErrorContext, PackageError, Result};
pub use error_formatting::user_friendly_error;
