//! The form container: exclusive owner of the field registry, holder of
//! container-level display/pattern defaults, and the event bus lifecycle
//! transitions are reported through.
//!
//! The registry maps canonical path strings to nodes. Nodes only read it
//! (through lookups and ancestor walks); every mutation goes through the
//! container, which commits to the reactive scope so dependent computed
//! state recomputes on its next read.

use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use crate::{
    error::FormError,
    event::LifecycleEvent,
    field::FieldNode,
    paths::Address,
    properties::{FieldDisplay, FieldPattern, FieldProps},
    query::FieldQuery,
    reactive::{Observable, ReactiveScope, Subscription},
};

type LifecycleObserver = Arc<dyn Fn(LifecycleEvent, &FieldNode) + Send + Sync>;

pub(crate) struct FormInner {
    scope: ReactiveScope,
    pub(crate) fields: RwLock<BTreeMap<String, FieldNode>>,
    display: Observable<Option<FieldDisplay>>,
    pattern: Observable<Option<FieldPattern>>,
    observers: RwLock<BTreeMap<u64, LifecycleObserver>>,
    next_observer: AtomicU64,
}

/// Cheap-clone handle to one form tree.
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

impl Form {
    pub fn new() -> Form {
        Form::with_defaults(None, None)
    }

    /// A form with container-level defaults. Fields with no override and no
    /// registered ancestor resolve to these before the hard fallbacks.
    pub fn with_defaults(
        display: Option<FieldDisplay>,
        pattern: Option<FieldPattern>,
    ) -> Form {
        let scope = ReactiveScope::new();
        Form {
            inner: Arc::new(FormInner {
                scope: scope.clone(),
                fields: RwLock::new(BTreeMap::new()),
                display: Observable::new(scope.clone(), display),
                pattern: Observable::new(scope, pattern),
                observers: RwLock::new(BTreeMap::new()),
                next_observer: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<FormInner>) -> Form {
        Form { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<FormInner> {
        Arc::downgrade(&self.inner)
    }

    /// The reactive scope shared by every node in this tree. External
    /// layers that only need a coarse change feed subscribe here.
    pub fn scope(&self) -> &ReactiveScope {
        &self.inner.scope
    }

    pub fn display(&self) -> Option<FieldDisplay> {
        self.inner.display.get()
    }

    /// Container default for the display axis. Commits, so every dependent
    /// node recomputes on its next read.
    pub fn set_display(&self, display: Option<FieldDisplay>) {
        self.inner.display.set(display);
    }

    pub fn pattern(&self) -> Option<FieldPattern> {
        self.inner.pattern.get()
    }

    /// Container default for the interaction axis.
    pub fn set_pattern(&self, pattern: Option<FieldPattern>) {
        self.inner.pattern.set(pattern);
    }

    /// Construct and register a field node at `address`. The node is
    /// queryable before its reactions run and fires `FieldInit` before this
    /// returns. Creating a second node at the same path replaces the first
    /// in the registry (last write wins).
    pub fn create_field(&self, address: &str, props: FieldProps) -> Result<FieldNode, FormError> {
        let address = Address::parse(address)?;
        if address.is_root() {
            return Err(FormError::InvalidPath(
                "a field cannot occupy the tree root".to_string(),
            ));
        }
        Ok(FieldNode::create(address, props, self))
    }

    /// Registry lookup by canonical path string.
    pub fn field(&self, path: &str) -> Option<FieldNode> {
        self.inner.fields.read().get(path).cloned()
    }

    /// Snapshot of every registered node, in path order.
    pub fn fields(&self) -> Vec<FieldNode> {
        self.inner.fields.read().values().cloned().collect()
    }

    pub(crate) fn register(&self, node: FieldNode) {
        let identifier = node.path().to_string();
        tracing::debug!("registering field '{identifier}'");
        self.inner.fields.write().insert(identifier, node);
        // Registration is a structural change: ancestor walks resolved
        // before this insert may now route differently.
        self.inner.scope.commit();
    }

    /// Drop the registry entry at `path`, returning the node if present.
    /// The node itself stays usable; releasing its reactions is
    /// [FieldNode::dispose]'s job.
    pub fn remove_field(&self, path: &str) -> Option<FieldNode> {
        let removed = self.inner.fields.write().remove(path);
        if removed.is_some() {
            tracing::debug!("removed field '{path}'");
            self.inner.scope.commit();
        }
        removed
    }

    /// Report a lifecycle transition to every registered observer.
    /// Observers run outside the registry and observer locks.
    pub fn notify(&self, event: LifecycleEvent, node: &FieldNode) {
        tracing::trace!("{} '{}'", event, node.path());
        let observers: Vec<LifecycleObserver> =
            self.inner.observers.read().values().cloned().collect();
        for observer in observers {
            observer(event, node);
        }
    }

    /// Register a lifecycle observer; the returned [Subscription]
    /// unregisters it.
    pub fn on_lifecycle(
        &self,
        observer: impl Fn(LifecycleEvent, &FieldNode) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_observer.fetch_add(1, Ordering::SeqCst);
        self.inner.observers.write().insert(id, Arc::new(observer));
        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.observers.write().remove(&id);
            }
        })
    }

    /// A lazy view over registered nodes matching `pattern`, resolved from
    /// the tree root.
    pub fn query(&self, pattern: &str) -> FieldQuery {
        FieldQuery::new(pattern, Address::root(), self.downgrade())
    }
}

impl Default for Form {
    fn default() -> Form {
        Form::new()
    }
}

impl Debug for Form {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.inner.fields.read().len())
            .field("display", &self.display())
            .field("pattern", &self.pattern())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::init_logging;

    #[test]
    fn test_registration_precedes_wiring() {
        init_logging();
        let form = Form::new();
        let probe = form.clone();
        // The reaction runs during construction; the registry entry must
        // already be visible to it.
        let node = form
            .create_field(
                "a",
                FieldProps {
                    reactions: vec![Arc::new(move |node: &FieldNode| {
                        assert!(probe.field("a").is_some());
                        assert!(node.path().to_string() == "a");
                    })],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(form.field("a").unwrap().path(), node.path());
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let form = Form::new();
        let first = form.create_field("dup", FieldProps::default()).unwrap();
        first.set_title(Some("first".to_string()));
        let second = form.create_field("dup", FieldProps::default()).unwrap();

        assert_eq!(form.fields().len(), 1);
        let registered = form.field("dup").unwrap();
        assert_eq!(registered.title(), second.title());
        assert!(registered.title().is_none());
    }

    #[test]
    fn test_root_address_rejected() {
        let form = Form::new();
        assert!(matches!(
            form.create_field("", FieldProps::default()),
            Err(FormError::InvalidPath(_))
        ));
        assert!(form.create_field("a..b", FieldProps::default()).is_err());
    }

    #[test]
    fn test_remove_field_commits() {
        let form = Form::new();
        form.create_field("a", FieldProps::default()).unwrap();
        let epoch = form.scope().epoch();
        assert!(form.remove_field("a").is_some());
        assert!(form.field("a").is_none());
        assert!(form.scope().epoch() > epoch);
        // Removing a missing path is quiet.
        let epoch = form.scope().epoch();
        assert!(form.remove_field("a").is_none());
        assert_eq!(form.scope().epoch(), epoch);
    }

    #[test]
    fn test_observer_subscription_disposes() {
        let form = Form::new();
        let seen = Arc::new(AtomicU64::new(0));
        let counted = seen.clone();
        let sub = form.on_lifecycle(move |_, _| {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        form.create_field("a", FieldProps::default()).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        sub.dispose();
        form.create_field("b", FieldProps::default()).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
