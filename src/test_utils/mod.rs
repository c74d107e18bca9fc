//! Test utilities for modpack
//!
//! Logging setup and manifest fixtures shared by unit and integration tests.
//! Available under `cfg(test)` and with the `test-utils` feature.

pub mod fixtures;

pub use fixtures::ManifestFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set that level is used;
/// otherwise `RUST_LOG` is honoured, and with neither nothing is installed.
///
/// ```bash
/// RUST_LOG=modpack=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageConfig;

    #[test]
    fn test_fixtures_parse() {
        init_test_logging(None);
        for fixture in [
            ManifestFixture::basic(),
            ManifestFixture::lazy(),
            ManifestFixture::cyclic(),
            ManifestFixture::missing_dependency(),
        ] {
            let config = PackageConfig::from_toml_str(&fixture.content);
            assert!(config.is_ok(), "fixture {} should parse", fixture.name);
        }
        assert!(PackageConfig::from_toml_str(&ManifestFixture::invalid_syntax().content).is_err());
    }
}
