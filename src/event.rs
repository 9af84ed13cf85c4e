use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle transitions reported to the container's observers.
///
/// `FieldInit` fires exactly once per node, synchronously at the end of
/// construction. `FieldMount`/`FieldUnmount` are driven by the rendering
/// host and may alternate any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    FieldInit,
    FieldMount,
    FieldUnmount,
}

impl LifecycleEvent {
    /// Wire name used when relaying events to non-Rust hosts.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::FieldInit => "onFieldInit",
            LifecycleEvent::FieldMount => "onFieldMount",
            LifecycleEvent::FieldUnmount => "onFieldUnmount",
        }
    }
}

impl Display for LifecycleEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
