//! Inheritance resolution over the sparse field tree.
//!
//! The tree is sparse: intermediate structural addresses (array-index
//! levels, unmaterialized groups) often have no registered node, so a naive
//! direct-parent lookup fails. [resolve_parent] walks the address upward and
//! probes the registry at each level, skipping the holes. Effective display
//! and pattern derive from that walk: a node's own override wins, then the
//! nearest registered ancestor's effective value, then the container
//! default, then the hard fallback.

use crate::{
    field::FieldNode,
    properties::{FieldDisplay, FieldPattern},
};

/// Nearest registered ancestor of `node`, or `None` when every level up to
/// the root is unmaterialized. Terminates in at most address-depth steps
/// because `parent()` strictly shortens the address.
pub fn resolve_parent(node: &FieldNode) -> Option<FieldNode> {
    let form = node.form()?;
    let mut ancestor = node.address().parent();
    loop {
        let identifier = ancestor.to_string();
        if identifier.is_empty() {
            return None;
        }
        if let Some(found) = form.field(&identifier) {
            tracing::trace!("resolved parent of '{}' as '{}'", node.address(), identifier);
            return Some(found);
        }
        ancestor = ancestor.parent();
    }
}

/// Effective display: self override, else nearest parent's effective
/// display, else the container default, else `visible`.
pub fn resolve_display(node: &FieldNode) -> FieldDisplay {
    if let Some(display) = node.self_display() {
        return display;
    }
    if let Some(parent) = resolve_parent(node) {
        return parent.display();
    }
    node.form()
        .and_then(|form| form.display())
        .unwrap_or(FieldDisplay::Visible)
}

/// Effective pattern: self override, else nearest parent's effective
/// pattern, else the container default, else `editable`.
pub fn resolve_pattern(node: &FieldNode) -> FieldPattern {
    if let Some(pattern) = node.self_pattern() {
        return pattern;
    }
    if let Some(parent) = resolve_parent(node) {
        return parent.pattern();
    }
    node.form()
        .and_then(|form| form.pattern())
        .unwrap_or(FieldPattern::Editable)
}
