//! Shared test utilities

use serde_json::Value;

use crate::properties::Props;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Build a props mapping from literal entries
pub fn props_of(entries: &[(&str, Value)]) -> Props {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
