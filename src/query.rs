//! Lazy views over the field registry.
//!
//! A [FieldQuery] captures a pattern, a base address for relative
//! resolution, and a non-owning handle to the container. It holds no
//! results: every enumeration re-scans the live registry, so a query object
//! created before a structural change observes the change on its next use.

use std::sync::Weak;

use crate::{
    field::FieldNode,
    form::FormInner,
    paths::{Address, Pattern},
};

pub struct FieldQuery {
    pattern: String,
    base: Address,
    form: Weak<FormInner>,
}

impl FieldQuery {
    pub(crate) fn new(pattern: &str, base: Address, form: Weak<FormInner>) -> FieldQuery {
        FieldQuery {
            pattern: pattern.to_string(),
            base,
            form,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn base(&self) -> &Address {
        &self.base
    }

    /// Every currently-registered node whose alias group the pattern
    /// accepts, in path order. A dropped container, an unparseable pattern,
    /// or zero matches all produce an empty vec.
    pub fn all(&self) -> Vec<FieldNode> {
        let Some(form) = self.form.upgrade() else {
            return Vec::new();
        };
        let pattern = match Pattern::parse_in(&self.pattern, &self.base) {
            Ok(pattern) => pattern,
            Err(err) => {
                tracing::debug!("query pattern rejected: {err}");
                return Vec::new();
            }
        };
        let fields = form.fields.read();
        fields
            .values()
            .filter(|node| pattern.match_alias_group(node.address(), node.path()))
            .cloned()
            .collect()
    }

    /// First match, if any.
    pub fn take(&self) -> Option<FieldNode> {
        self.all().into_iter().next()
    }

    /// Visit each match. The registry lock is released before `f` runs.
    pub fn each(&self, mut f: impl FnMut(&FieldNode)) {
        for node in self.all() {
            f(&node);
        }
    }

    /// Collect a projection over the matches.
    pub fn map<R>(&self, mut f: impl FnMut(&FieldNode) -> R) -> Vec<R> {
        self.all().iter().map(|node| f(node)).collect()
    }
}
