//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use formtree::{FieldProps, Form};
use serde_json::Value;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Build a props mapping from literal entries.
#[allow(dead_code)]
pub fn props_of(entries: &[(&str, Value)]) -> formtree::Props {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// A form populated with default-configured fields at each of `paths`.
#[allow(dead_code)]
pub fn form_with(paths: &[&str]) -> Form {
    init_logging();
    let form = Form::new();
    for path in paths {
        form.create_field(path, FieldProps::default()).unwrap();
    }
    form
}
