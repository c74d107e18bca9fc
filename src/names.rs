//! Dependency-name parsing.
//!
//! `needs`, `run` and dependency manifests all accept the same loose argument
//! shapes, which this module flattens into one ordered list of module names:
//!
//! - `"db"` is a single name.
//! - `"db cache"` is split on whitespace into `["db", "cache"]`.
//! - `"app: config server"` uses the namespace shorthand: the leading token
//!   ends with `:`, so every following token in the same string is prefixed,
//!   giving `["app/config", "app/server"]`.
//! - Sequences are flattened left to right, recursively.
//!
//! Duplicates are preserved. Parsing never fails; name validity is checked
//! by the registry at its public entry points.
//!
//! ```rust
//! use modpack::names;
//! use modpack::names::parse;
//!
//! let spec = names!["foo: a b", ["bar: a b c", ["qux: a b"]]];
//! assert_eq!(
//!     parse(&spec),
//!     ["foo/a", "foo/b", "bar/a", "bar/b", "bar/c", "qux/a", "qux/b"]
//! );
//! ```

use crate::core::{PackageError, Result};

/// Separator placed between a namespace prefix and a member name.
pub const NAMESPACE_SEPARATOR: char = '/';

/// A polymorphic module-name argument: a string or a nested sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSpec {
    /// A string holding one name, several names, or a namespace shorthand
    One(String),
    /// A sequence of further specs, flattened in order
    Many(Vec<NameSpec>),
}

impl NameSpec {
    /// An empty sequence.
    #[must_use]
    pub const fn none() -> Self {
        Self::Many(Vec::new())
    }

    /// Returns `true` when this spec is one string naming exactly one module
    /// without whitespace. `needs` unwraps the result for such requests.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        match self {
            Self::One(s) => !s.is_empty() && !s.contains(char::is_whitespace),
            Self::Many(_) => false,
        }
    }

    /// Flatten this spec into names. Shorthand for [`parse`].
    #[must_use]
    pub fn to_names(&self) -> Vec<String> {
        parse(self)
    }
}

impl From<&str> for NameSpec {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for NameSpec {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<&String> for NameSpec {
    fn from(s: &String) -> Self {
        Self::One(s.clone())
    }
}

impl From<()> for NameSpec {
    fn from((): ()) -> Self {
        Self::none()
    }
}

impl<T: Into<NameSpec>> From<Vec<T>> for NameSpec {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NameSpec>, const N: usize> From<[T; N]> for NameSpec {
    fn from(items: [T; N]) -> Self {
        Self::Many(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<NameSpec>> From<&[T]> for NameSpec {
    fn from(items: &[T]) -> Self {
        Self::Many(items.iter().cloned().map(Into::into).collect())
    }
}

/// Build a nested [`NameSpec`] from literals.
///
/// Square brackets nest; any other token is converted with `NameSpec::from`.
///
/// ```rust
/// use modpack::{names, NameSpec};
///
/// let spec = names!["a b", ["ns: c"]];
/// assert_eq!(spec.to_names(), ["a", "b", "ns/c"]);
/// assert_eq!(names![], NameSpec::none());
/// ```
#[macro_export]
macro_rules! names {
    (@item [$($inner:tt),* $(,)?]) => {
        $crate::names![$($inner),*]
    };
    (@item $item:expr) => {
        $crate::NameSpec::from($item)
    };
    ($($item:tt),* $(,)?) => {
        $crate::NameSpec::Many(vec![$($crate::names!(@item $item)),*])
    };
}

/// Flatten a [`NameSpec`] into an ordered list of module names.
#[must_use]
pub fn parse(spec: &NameSpec) -> Vec<String> {
    let mut out = Vec::new();
    collect(spec, &mut out);
    out
}

fn collect(spec: &NameSpec, out: &mut Vec<String>) {
    match spec {
        NameSpec::One(s) => expand_string(s, out),
        NameSpec::Many(items) => {
            for item in items {
                collect(item, out);
            }
        }
    }
}

fn expand_string(s: &str, out: &mut Vec<String>) {
    if !s.contains(char::is_whitespace) {
        if !s.is_empty() {
            out.push(s.to_string());
        }
        return;
    }

    let mut tokens = s.split_whitespace();
    let Some(first) = tokens.next() else {
        return;
    };

    match first.strip_suffix(':') {
        Some(prefix) => {
            let prefix = prefix.replace(':', "/");
            out.extend(tokens.map(|token| format!("{prefix}{NAMESPACE_SEPARATOR}{token}")));
        }
        None => {
            out.push(first.to_string());
            out.extend(tokens.map(str::to_string));
        }
    }
}

/// Check that `name` can be registered and later requested through [`parse`].
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.contains(char::is_whitespace) {
        "name must not contain whitespace"
    } else if name.ends_with(':') {
        "name must not end with ':'"
    } else {
        return Ok(());
    };

    Err(PackageError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name() {
        assert_eq!(parse(&"foo".into()), ["foo"]);
        assert!(NameSpec::from("foo").is_bare());
    }

    #[test]
    fn test_whitespace_splits() {
        let spec = NameSpec::from("foo  bar\tbaz");
        assert_eq!(parse(&spec), ["foo", "bar", "baz"]);
        assert!(!spec.is_bare());
    }

    #[test]
    fn test_namespace_shorthand() {
        assert_eq!(parse(&"foo: a b c".into()), ["foo/a", "foo/b", "foo/c"]);
    }

    #[test]
    fn test_nested_namespace_shorthand() {
        let spec = names!["foo: a b", ["bar: a b c", ["qux: a b"]]];
        assert_eq!(
            parse(&spec),
            ["foo/a", "foo/b", "bar/a", "bar/b", "bar/c", "qux/a", "qux/b"]
        );
    }

    #[test]
    fn test_inner_colons_become_separators() {
        assert_eq!(parse(&"app:http: get post".into()), ["app/http/get", "app/http/post"]);
    }

    #[test]
    fn test_prefix_only_applies_to_its_own_string() {
        let spec = names!["ns: a", "b"];
        assert_eq!(parse(&spec), ["ns/a", "b"]);
    }

    #[test]
    fn test_colon_not_in_first_token_is_literal() {
        assert_eq!(parse(&"a b: c".into()), ["a", "b:", "c"]);
    }

    #[test]
    fn test_lone_prefix_expands_to_nothing() {
        assert!(parse(&"ns: ".into()).is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        let spec = NameSpec::from(vec!["a", "b a"]);
        assert_eq!(parse(&spec), ["a", "b", "a"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse(&NameSpec::from(())).is_empty());
        assert!(parse(&"".into()).is_empty());
        assert!(parse(&"   ".into()).is_empty());
        assert!(!NameSpec::from("").is_bare());
    }

    #[test]
    fn test_sequence_of_one_is_not_bare() {
        assert!(!NameSpec::from(["foo"]).is_bare());
        assert!(!names!["foo"].is_bare());
    }

    #[test]
    fn test_slice_and_owned_strings() {
        let owned = vec!["x".to_string(), "y z".to_string()];
        assert_eq!(parse(&NameSpec::from(owned.as_slice())), ["x", "y", "z"]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("db").is_ok());
        assert!(validate_name("app/db").is_ok());
        assert!(matches!(validate_name(""), Err(PackageError::InvalidName { .. })));
        assert!(matches!(validate_name("a b"), Err(PackageError::InvalidName { .. })));
        assert!(matches!(validate_name("ns:"), Err(PackageError::InvalidName { .. })));
    }
}
