use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Crate error type. Only genuinely fallible seams surface a [FormError]:
/// path/pattern parsing and state snapshot (de)serialization. Runtime state
/// mutation never errors; invalid inputs fall back to safe defaults instead,
/// since the engine runs inside continuously re-rendering hosts where a
/// thrown failure mid-update would corrupt the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum FormError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<JsonError> for FormError {
    fn from(src: JsonError) -> FormError {
        FormError::Serialization(format!("Json conversion error: {src}"))
    }
}

impl From<regex::Error> for FormError {
    fn from(src: regex::Error) -> FormError {
        FormError::InvalidPath(format!("Pattern did not compile: {src}"))
    }
}
