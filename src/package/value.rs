//! Type-erased module values and the containers that carry them.

use std::any::{Any, type_name};
use std::rc::Rc;

use crate::core::{PackageError, Result};

/// The memoized result of a module definition.
///
/// Definitions may return any `'static` type; the value is erased on the way
/// in and recovered with a checked downcast on the way out.
pub type Value = Rc<dyn Any>;

/// Downcast the value of module `name` to `T`.
pub fn downcast<T: Any>(name: &str, value: &Value) -> Result<Rc<T>> {
    Rc::clone(value).downcast::<T>().map_err(|_| PackageError::TypeMismatch {
        name: name.to_string(),
        expected: type_name::<T>(),
    })
}

/// Ordered `(name, value)` pairs shared by [`Deps`] and [`ResolvedMap`].
#[derive(Debug, Clone, Default)]
struct Entries(Vec<(String, Value)>);

impl Entries {
    fn find(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn typed<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        let value = self.find(name).ok_or_else(|| PackageError::ModuleNotFound {
            name: name.to_string(),
            suggestion: None,
            similar: Vec::new(),
        })?;
        downcast(name, value)
    }
}

/// The resolved dependencies handed to a definition, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Deps {
    entries: Entries,
}

impl Deps {
    pub(crate) fn new(entries: Vec<(String, Value)>) -> Self {
        Self {
            entries: Entries(entries),
        }
    }

    /// Number of declared dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.0.len()
    }

    /// Returns `true` if the module declared no dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.0.is_empty()
    }

    /// The untyped value at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.entries.0.get(index).map(|(_, v)| v)
    }

    /// The dependency name at `index`.
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.0.get(index).map(|(n, _)| n.as_str())
    }

    /// The value at `index`, downcast to `T`.
    pub fn get<T: Any>(&self, index: usize) -> Result<Rc<T>> {
        let (name, value) = self.entries.0.get(index).ok_or_else(|| PackageError::Other {
            message: format!(
                "Dependency index {index} is out of range ({} declared)",
                self.len()
            ),
        })?;
        downcast(name, value)
    }

    /// The value of dependency `name`, downcast to `T`.
    pub fn by_name<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        self.entries.typed(name)
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Values returned by `needs` for a multi-name request, in resolution order.
///
/// Each name appears once; repeated requests for the same name collapse
/// into its first entry.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMap {
    entries: Entries,
}

impl ResolvedMap {
    pub(crate) fn from_entries(entries: Vec<(String, Value)>) -> Self {
        let mut map = Self::default();
        for (name, value) in entries {
            if map.entries.find(&name).is_none() {
                map.entries.0.push((name, value));
            }
        }
        map
    }

    /// Number of distinct modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.0.len()
    }

    /// Returns `true` if nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.0.is_empty()
    }

    /// Returns `true` if `name` was resolved by this request.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.find(name).is_some()
    }

    /// The untyped value of `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries.find(name)
    }

    /// The value of `name`, downcast to `T`.
    pub fn get<T: Any>(&self, name: &str) -> Result<Rc<T>> {
        self.entries.typed(name)
    }

    /// Module names in resolution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.0.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, value)` pairs in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// The result of `needs`.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A single bare name was requested; its value is returned unwrapped
    Value {
        /// The requested module
        name: String,
        /// Its value
        value: Value,
    },
    /// Several names (or a sequence) were requested
    Map(ResolvedMap),
}

impl Resolved {
    /// The single value, downcast to `T`.
    ///
    /// Fails with [`PackageError::TypeMismatch`] for a map result.
    pub fn get<T: Any>(&self) -> Result<Rc<T>> {
        match self {
            Self::Value { name, value } => downcast(name, value),
            Self::Map(_) => Err(PackageError::TypeMismatch {
                name: "<multiple modules>".to_string(),
                expected: type_name::<T>(),
            }),
        }
    }

    /// The untyped single value, if this is one.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value { value, .. } => Some(value),
            Self::Map(_) => None,
        }
    }

    /// The map, if several names were requested.
    #[must_use]
    pub fn into_map(self) -> Option<ResolvedMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Value { .. } => None,
        }
    }

    /// Returns `true` for an unwrapped single value.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}
