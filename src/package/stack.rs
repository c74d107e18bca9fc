//! The in-flight resolution stack used for cycle detection.
//!
//! Resolution is depth-first and synchronous, so at any instant the stack is
//! exactly the ancestor chain of the module currently being resolved. A name
//! that occurs twice therefore means the chain has looped back on itself.
//! Modules resolved twice in *different* subtrees (a diamond) never occupy
//! the stack at the same time and are not reported.

use std::collections::HashSet;

use crate::core::{PackageError, Result};

/// Ordered sequence of module names currently mid-resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingStack {
    entries: Vec<String>,
}

impl LoadingStack {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Push `name` and return the depth before the push, for [`unwind_to`].
    ///
    /// [`unwind_to`]: LoadingStack::unwind_to
    pub fn push(&mut self, name: &str) -> usize {
        let depth = self.entries.len();
        self.entries.push(name.to_string());
        depth
    }

    /// Drop every entry above `depth`.
    pub fn unwind_to(&mut self, depth: usize) {
        self.entries.truncate(depth);
    }

    /// Every name that occurs more than once, in order of first occurrence.
    #[must_use]
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();

        for name in &self.entries {
            if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
                duplicates.push(name.clone());
            }
        }

        // Report in order of first appearance on the chain
        duplicates.sort_by_key(|d| self.entries.iter().position(|e| e == d));
        duplicates
    }

    /// Fail with [`PackageError::CircularDependency`] if any name repeats.
    pub fn check(&self) -> Result<()> {
        let duplicates = self.duplicates();
        if duplicates.is_empty() {
            return Ok(());
        }

        Err(PackageError::CircularDependency {
            duplicates,
            chain: self.entries.clone(),
        })
    }

    /// Returns `true` if nothing is being resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The active chain, outermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }
}
