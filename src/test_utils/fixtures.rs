//! Sample manifests for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A manifest file to be written into a test directory.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    /// TOML content
    pub content: String,
    /// File stem, also used to tell fixtures apart in failures
    pub name: String,
}

impl ManifestFixture {
    /// An application with an eager `main` and a namespaced dependency.
    pub fn basic() -> Self {
        Self::new(
            "basic",
            r#"
[modules]
main = ["app: config server"]
"app/config" = []
"app/server" = { needs = ["app/config", "db/pool"] }
"db/pool" = ["db/url"]
"db/url" = []
"#,
        )
    }

    /// Lazy modules only; nothing runs at registration.
    pub fn lazy() -> Self {
        Self::new(
            "lazy",
            r#"
[modules]
a = ["b", "c"]
b = ["c"]
c = []
d = []
"#,
        )
    }

    /// `qux -> foo -> bar -> qux`.
    pub fn cyclic() -> Self {
        Self::new(
            "cyclic",
            r#"
[modules]
foo = ["bar"]
bar = ["qux"]
qux = ["foo"]
"#,
        )
    }

    /// `app` depends on a misspelled module.
    pub fn missing_dependency() -> Self {
        Self::new(
            "missing",
            r#"
[modules]
app = ["Config"]
config = []
"#,
        )
    }

    /// Not valid TOML.
    pub fn invalid_syntax() -> Self {
        Self::new("invalid", "[modules\na = [")
    }

    /// A manifest with custom content.
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.trim().to_string(),
        }
    }

    /// Write the manifest as `<dir>/<name>.toml` and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.toml", self.name));
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}
