#![allow(clippy::option_if_let_else)]

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

/// Extension of scenario fixtures
pub const FIXTURE_EXTENSION: &str = "toml";

pub(crate) static WORKSPACE_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let mut current = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    loop {
        if current.join("Cargo.toml").exists() {
            let cargo_toml = std::fs::read_to_string(current.join("Cargo.toml"))
                .expect("Failed to read Cargo.toml");
            if cargo_toml.contains("[workspace]") {
                return current;
            }
        }

        current = current
            .parent()
            .expect("Could not find workspace root")
            .to_path_buf();
    }
});

pub fn test_data_path() -> PathBuf {
    WORKSPACE_ROOT.join("test_data")
}

/// Get the path to a test fixture file relative to the test_data directory
///
/// ## Arguments
/// * `name` - The relative path to the fixture file (e.g., "access/write_read.toml")
pub fn fixture_path(name: &str) -> PathBuf {
    test_data_path().join(name)
}

/// Read the contents of a test fixture file
pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

fn is_fixture(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(FIXTURE_EXTENSION)
}

/// Discover all scenario files in the test_data directory
///
/// ## Returns
/// Paths relative to the test_data directory, sorted
pub fn discover_all_fixtures() -> Vec<String> {
    let test_data = test_data_path();
    let mut fixtures = Vec::new();
    discover_fixtures_recursive(&test_data, &test_data, &mut fixtures);
    fixtures.sort();
    fixtures
}

fn discover_fixtures_recursive(
    base_path: &Path,
    current_path: &Path,
    fixtures: &mut Vec<String>,
) {
    if let Ok(entries) = std::fs::read_dir(current_path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                discover_fixtures_recursive(base_path, &path, fixtures);
            } else if is_fixture(&path) {
                if let Ok(relative_path) = path.strip_prefix(base_path) {
                    fixtures.push(relative_path.to_string_lossy().replace('\\', "/"));
                }
            }
        }
    }
}

/// Route `tracing` output of the code under test to the test harness.
/// Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
