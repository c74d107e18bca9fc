//! Error formatting utilities for modpack
//!
//! This module converts internal errors into clear, actionable messages for
//! users of the CLI.

use super::error::{ErrorContext, PackageError};

/// Convert any error into a user-friendly format with contextual suggestions
///
/// The error chain is walked outermost first. The first [`PackageError`]
/// found that is not merely a wrapper around a failing definition decides
/// the suggestion, and context messages above it are kept as details; a
/// failing definition whose cause is not a [`PackageError`] is reported with
/// the root cause as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let mut current: &dyn std::error::Error = error.as_ref();
    let mut outermost_failure: Option<&str> = None;
    let mut context: Vec<String> = Vec::new();

    loop {
        match current.downcast_ref::<PackageError>() {
            Some(PackageError::DefinitionFailed { name, .. }) => {
                outermost_failure.get_or_insert(name.as_str());
            }
            Some(other) => {
                return with_outer_context(create_error_context(other, outermost_failure), &context);
            }
            None => context.push(current.to_string()),
        }

        match current.source() {
            Some(source) => current = source,
            None => break,
        }
    }

    let root = error.root_cause().to_string();
    match outermost_failure {
        Some(name) => ErrorContext::new(PackageError::DefinitionFailed {
            name: name.to_string(),
            source: root.clone().into(),
        })
        .with_details(root)
        .with_suggestion(format!("Fix the definition of module '{name}' and resolve it again")),
        None => ErrorContext::new(PackageError::Other {
            message: error.to_string(),
        }),
    }
}

/// Prepend context messages that wrapped the error to its details.
fn with_outer_context(mut ctx: ErrorContext, context: &[String]) -> ErrorContext {
    if context.is_empty() {
        return ctx;
    }

    let outer = context.join(": ");
    ctx.details = Some(match ctx.details.take() {
        Some(details) => format!("{outer}; {details}"),
        None => outer,
    });
    ctx
}

/// Build an [`ErrorContext`] for a specific [`PackageError`].
///
/// `via` names the outermost module whose definition surfaced the error, if
/// the error was raised while a definition was running.
pub(crate) fn create_error_context(error: &PackageError, via: Option<&str>) -> ErrorContext {
    let ctx = match error {
        PackageError::InvalidName { name, reason } => ErrorContext::new(PackageError::InvalidName {
            name: name.clone(),
            reason: *reason,
        })
        .with_suggestion("Use a non-empty name without whitespace or a trailing ':'"),
        PackageError::DuplicateModule { name } => {
            ErrorContext::new(PackageError::DuplicateModule { name: name.clone() })
                .with_suggestion(format!(
                    "Request the existing '{name}' with needs() or register under a different name"
                ))
                .with_details("Module registration is write-once; redefinition never overwrites")
        }
        PackageError::InvalidDefinition { name, reason } => {
            ErrorContext::new(PackageError::InvalidDefinition {
                name: name.clone(),
                reason: reason.clone(),
            })
            .with_suggestion("Check the dependency list passed alongside the definition")
        }
        PackageError::ModuleNotFound { name, suggestion, similar } => {
            let ctx = ErrorContext::new(PackageError::ModuleNotFound {
                name: name.clone(),
                suggestion: suggestion.clone(),
                similar: similar.clone(),
            });
            if let Some(candidate) = suggestion {
                ctx.with_suggestion(format!("Module names are case-sensitive; use '{candidate}'"))
            } else if !similar.is_empty() {
                ctx.with_suggestion(format!("Did you mean one of: {}?", similar.join(", ")))
            } else {
                ctx.with_suggestion(format!("Define '{name}' before it is requested"))
            }
        }
        PackageError::CircularDependency { duplicates, chain } => {
            ErrorContext::new(PackageError::CircularDependency {
                duplicates: duplicates.clone(),
                chain: chain.clone(),
            })
            .with_details(format!("Active resolution chain: {}", chain.join(" -> ")))
            .with_suggestion(
                "Break the cycle by moving shared code into a module both sides depend on",
            )
        }
        PackageError::TypeMismatch { name, expected } => {
            ErrorContext::new(PackageError::TypeMismatch {
                name: name.clone(),
                expected: *expected,
            })
            .with_suggestion(format!("Check the type returned by the definition of '{name}'"))
        }
        PackageError::ConfigError { message } => ErrorContext::new(PackageError::ConfigError {
            message: message.clone(),
        })
        .with_suggestion("Check the [defaults] and [modules] tables of the manifest"),
        PackageError::Toml(e) => ErrorContext::new(PackageError::Other {
            message: format!("Invalid manifest: {e}"),
        })
        .with_suggestion("Check the manifest's TOML syntax"),
        PackageError::Io(e) => ErrorContext::new(PackageError::Other {
            message: format!("Could not read manifest: {e}"),
        })
        .with_suggestion("Check that the manifest path exists and is readable"),
        other => ErrorContext::new(PackageError::Other {
            message: other.to_string(),
        }),
    };

    match via {
        Some(name) if ctx.details.is_none() => {
            ctx.with_details(format!("Raised while loading module '{name}'"))
        }
        _ => ctx,
    }
}
