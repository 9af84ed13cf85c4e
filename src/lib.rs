//! # formtree
//!
//! A reactive state engine for hierarchical form models.
//!
//! formtree maintains a sparse tree of named field nodes, addressed by
//! dotted/indexed paths (`profile.contacts.0.email`), each carrying
//! display and interaction state. State set on a node overrides state
//! inherited from its nearest registered ancestor, which overrides the
//! container default; mutations propagate through an explicit reactive
//! scope so computed reads are never stale.
//!
//! ## Architecture
//!
//! - **[`paths`]**: addresses ([`paths::Address`]) and compiled wildcard
//!   matchers ([`paths::Pattern`]) with alias-group equivalence
//! - **[`form`]**: the container ([`form::Form`]) owning the canonical-path
//!   registry, container defaults, and the lifecycle event bus
//! - **[`field`]**: the structural node ([`field::FieldNode`]): local
//!   overrides, descriptor pairs, lifecycle flags, reactions, disposal
//! - **[`resolve`]**: the sparse-tree ancestor walk and the
//!   self/parent/default/fallback resolution chain
//! - **[`reactive`]**: the epoch-based scope, observable cells, memoized
//!   computed values, and idempotent subscriptions
//! - **[`query`]**: lazy, restartable views over the registry
//! - **[`properties`]**: the value vocabulary (display/pattern axes,
//!   descriptors, props, state snapshots)
//!
//! ## Quick start
//!
//! ```rust
//! use formtree::{FieldPattern, FieldProps, Form};
//!
//! # fn main() -> Result<(), formtree::FormError> {
//! let form = Form::new();
//!
//! // A read-only group; descendants inherit its pattern.
//! let _group = form.create_field(
//!     "profile",
//!     FieldProps {
//!         pattern: Some(FieldPattern::ReadOnly),
//!         ..Default::default()
//!     },
//! )?;
//!
//! // No node exists at profile.contacts or profile.contacts.0: the
//! // ancestor walk skips the unmaterialized levels.
//! let email = form.create_field("profile.contacts.0.email", FieldProps::default())?;
//! assert_eq!(email.pattern(), FieldPattern::ReadOnly);
//!
//! // A local override wins until cleared.
//! email.set_editable(Some(true));
//! assert_eq!(email.pattern(), FieldPattern::Editable);
//! email.set_pattern(None);
//! assert_eq!(email.pattern(), FieldPattern::ReadOnly);
//!
//! // Bulk reads go through lazy queries.
//! assert_eq!(form.query("profile.*").all().len(), 0);
//! assert_eq!(form.query("profile.contacts.0.*").all().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event;
pub mod field;
pub mod form;
pub mod paths;
pub mod properties;
pub mod query;
pub mod reactive;
pub mod resolve;
#[cfg(test)]
mod tests;

pub use error::*;
pub use event::LifecycleEvent;
pub use field::{create_field_node, FieldNode};
pub use form::Form;
pub use paths::{Address, Pattern, Segment};
pub use properties::{
    Descriptor, DescriptorInput, FieldDisplay, FieldPattern, FieldProps, FieldState, Props,
    Reaction,
};
pub use query::FieldQuery;
pub use reactive::{Memo, Observable, ReactiveScope, Subscription};
