//! Value types for field state: the display and interaction axes, the
//! descriptor pairs handed to a rendering host, construction props, and the
//! plain-data state snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use crate::{error::FormError, field::FieldNode};

/// Opaque props mapping attached to a descriptor. The engine never inspects
/// values; merges are shallow and key-wise.
pub type Props = serde_json::Map<String, Value>;

/// Reaction callback registered at construction. Re-runs after every commit
/// that may have changed state it read, with the owning node as argument.
pub type Reaction = Arc<dyn Fn(&FieldNode) + Send + Sync>;

/// Visibility axis. `Hidden` and `None` render identically (not visible) but
/// carry distinct provenance: `Hidden` comes from the `hidden` setter,
/// `None` from un-setting `visible`. The distinction is deliberate and
/// load-bearing for hosts that treat "conditionally hidden" and "never
/// shown" differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldDisplay {
    None,
    Hidden,
    Visible,
}

impl FieldDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldDisplay::None => "none",
            FieldDisplay::Hidden => "hidden",
            FieldDisplay::Visible => "visible",
        }
    }
}

impl Display for FieldDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interaction axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPattern {
    Editable,
    Disabled,
    ReadOnly,
    ReadPretty,
}

impl FieldPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPattern::Editable => "editable",
            FieldPattern::Disabled => "disabled",
            FieldPattern::ReadOnly => "readOnly",
            FieldPattern::ReadPretty => "readPretty",
        }
    }
}

impl Display for FieldPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (kind, props) pair describing how a node is wrapped or rendered by the
/// host UI layer. Both halves are opaque to this engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: Option<String>,
    #[serde(default)]
    pub props: Props,
}

impl Descriptor {
    pub fn new(kind: impl Into<String>, props: Props) -> Descriptor {
        Descriptor {
            kind: Some(kind.into()),
            props,
        }
    }

    /// Shallow key-wise merge. Additive: existing keys not present in the
    /// patch survive, colliding keys take the patch value.
    pub fn merge_props(&mut self, patch: &Props) {
        for (key, value) in patch {
            self.props.insert(key.clone(), value.clone());
        }
    }
}

/// Boundary input for descriptor assignment: a bare kind or a full pair.
/// Normalized into the canonical [Descriptor] immediately at the boundary,
/// so internal state never branches on input shape; a missing props half
/// becomes the empty mapping.
#[derive(Debug, Clone)]
pub enum DescriptorInput {
    Kind(String),
    Pair(String, Props),
}

impl DescriptorInput {
    pub fn normalize(self) -> Descriptor {
        match self {
            DescriptorInput::Kind(kind) => Descriptor {
                kind: Some(kind),
                props: Props::new(),
            },
            DescriptorInput::Pair(kind, props) => Descriptor {
                kind: Some(kind),
                props,
            },
        }
    }
}

impl From<&str> for DescriptorInput {
    fn from(kind: &str) -> DescriptorInput {
        DescriptorInput::Kind(kind.to_string())
    }
}

impl From<String> for DescriptorInput {
    fn from(kind: String) -> DescriptorInput {
        DescriptorInput::Kind(kind)
    }
}

impl From<(&str, Props)> for DescriptorInput {
    fn from((kind, props): (&str, Props)) -> DescriptorInput {
        DescriptorInput::Pair(kind.to_string(), props)
    }
}

impl From<(String, Props)> for DescriptorInput {
    fn from((kind, props): (String, Props)) -> DescriptorInput {
        DescriptorInput::Pair(kind, props)
    }
}

/// Construction configuration for a field node. Every member is optional;
/// absent members leave the corresponding state unset rather than erasing
/// it. Boolean members are applied through the matching projection setters,
/// in the same order the setters would be called by hand: `pattern`,
/// `display`, `hidden`, `editable`, `disabled`, `read_only`, `read_pretty`,
/// `visible`, then the descriptors.
#[derive(Clone, Default)]
pub struct FieldProps {
    pub title: Option<String>,
    pub description: Option<String>,
    pub display: Option<FieldDisplay>,
    pub pattern: Option<FieldPattern>,
    pub hidden: Option<bool>,
    pub visible: Option<bool>,
    pub editable: Option<bool>,
    pub disabled: Option<bool>,
    pub read_only: Option<bool>,
    pub read_pretty: Option<bool>,
    pub decorator: Option<DescriptorInput>,
    pub component: Option<DescriptorInput>,
    pub reactions: Vec<Reaction>,
}

impl std::fmt::Debug for FieldProps {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProps")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("display", &self.display)
            .field("pattern", &self.pattern)
            .field("hidden", &self.hidden)
            .field("visible", &self.visible)
            .field("editable", &self.editable)
            .field("disabled", &self.disabled)
            .field("read_only", &self.read_only)
            .field("read_pretty", &self.read_pretty)
            .field("decorator", &self.decorator)
            .field("component", &self.component)
            .field("reactions", &self.reactions.len())
            .finish()
    }
}

/// Plain-data snapshot of a node's state. No live bindings: reading one is a
/// copy, applying one goes field-by-field through each setter's own
/// semantics (notably, `component_props`/`decorator_props` merge instead of
/// replacing, while the `component`/`decorator` pairs replace atomically).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<FieldDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<FieldPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorator: Option<Descriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Descriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorator_props: Option<Props>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_props: Option<Props>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmounted: Option<bool>,
}

impl FieldState {
    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<FieldState, FormError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(entries: &[(&str, Value)]) -> Props {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FieldPattern::ReadOnly).unwrap(),
            "\"readOnly\""
        );
        assert_eq!(
            serde_json::to_string(&FieldPattern::ReadPretty).unwrap(),
            "\"readPretty\""
        );
        assert_eq!(
            serde_json::to_string(&FieldDisplay::Visible).unwrap(),
            "\"visible\""
        );
        assert_eq!(FieldPattern::ReadPretty.to_string(), "readPretty");
        assert_eq!(FieldDisplay::None.to_string(), "none");
    }

    #[test]
    fn test_descriptor_normalization() {
        let bare = DescriptorInput::from("Card").normalize();
        assert_eq!(bare.kind.as_deref(), Some("Card"));
        assert!(bare.props.is_empty());

        let pair = DescriptorInput::from(("Input", props(&[("size", json!("small"))]))).normalize();
        assert_eq!(pair.kind.as_deref(), Some("Input"));
        assert_eq!(pair.props.get("size"), Some(&json!("small")));
    }

    #[test]
    fn test_descriptor_merge_is_additive() {
        let mut descriptor = Descriptor::new("Input", props(&[("a", json!(1))]));
        descriptor.merge_props(&props(&[("b", json!(2))]));
        assert_eq!(descriptor.props.get("a"), Some(&json!(1)));
        assert_eq!(descriptor.props.get("b"), Some(&json!(2)));

        descriptor.merge_props(&props(&[("a", json!(3))]));
        assert_eq!(descriptor.props.get("a"), Some(&json!(3)));
        assert_eq!(descriptor.props.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_state_snapshot_round_trip() {
        let state = FieldState {
            title: Some("Profile".to_string()),
            pattern: Some(FieldPattern::ReadOnly),
            component: Some(Descriptor::new("Card", Props::new())),
            mounted: Some(true),
            ..Default::default()
        };
        let json = state.to_json().unwrap();
        // Unset members are omitted from the wire form entirely.
        assert!(!json.contains("description"));
        assert!(json.contains("\"pattern\":\"readOnly\""));
        let back = FieldState::from_json(&json).unwrap();
        assert_eq!(back, state);

        assert!(FieldState::from_json("{not json").is_err());
    }
}
