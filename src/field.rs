//! The structural field node: one slot of the form tree, without a data
//! value of its own.
//!
//! A [FieldNode] is a cheap-clone handle; the container's registry and any
//! number of external callers share the same underlying state. Local
//! overrides live in observable cells, the effective `display`/`pattern`
//! are memoized against the form's reactive epoch and resolved through the
//! ancestor walk in [crate::resolve], and lifecycle transitions are
//! reported to the container's observers.

use parking_lot::Mutex;
use std::{
    fmt::{Debug, Formatter},
    sync::{Arc, Weak},
};

use crate::{
    error::FormError,
    event::LifecycleEvent,
    form::{Form, FormInner},
    paths::{Address, Pattern},
    properties::{
        Descriptor, DescriptorInput, FieldDisplay, FieldPattern, FieldProps, FieldState, Props,
    },
    query::FieldQuery,
    reactive::{Memo, Observable, ReactiveScope, Subscription},
    resolve,
};

pub(crate) struct FieldInner {
    /// Fully-resolved position in the tree. Immutable after construction.
    address: Address,
    /// Alias-resolved canonical path; the registry key.
    path: Address,
    form: Weak<FormInner>,
    scope: ReactiveScope,
    title: Observable<Option<String>>,
    description: Observable<Option<String>>,
    self_display: Observable<Option<FieldDisplay>>,
    self_pattern: Observable<Option<FieldPattern>>,
    initialized: Observable<bool>,
    mounted: Observable<bool>,
    unmounted: Observable<bool>,
    decorator: Observable<Descriptor>,
    component: Observable<Descriptor>,
    display_memo: Memo<FieldDisplay>,
    pattern_memo: Memo<FieldPattern>,
    disposers: Mutex<Vec<Subscription>>,
}

#[derive(Clone)]
pub struct FieldNode {
    inner: Arc<FieldInner>,
}

/// Construct a field node inside `form`. Equivalent to
/// [Form::create_field]; the node is registered and initialized before this
/// returns.
pub fn create_field_node(
    address: &str,
    props: FieldProps,
    form: &Form,
) -> Result<FieldNode, FormError> {
    form.create_field(address, props)
}

impl FieldNode {
    pub(crate) fn create(address: Address, props: FieldProps, form: &Form) -> FieldNode {
        let scope = form.scope().clone();
        // No alias table in this engine: the canonical path coincides with
        // the address. Both are kept so alias-group matching stays a
        // two-sided test.
        let path = address.clone();
        let inner = Arc::new(FieldInner {
            address,
            path,
            form: form.downgrade(),
            scope: scope.clone(),
            title: Observable::new(scope.clone(), None),
            description: Observable::new(scope.clone(), None),
            self_display: Observable::new(scope.clone(), None),
            self_pattern: Observable::new(scope.clone(), None),
            initialized: Observable::new(scope.clone(), false),
            mounted: Observable::new(scope.clone(), false),
            unmounted: Observable::new(scope.clone(), false),
            decorator: Observable::new(scope.clone(), Descriptor::default()),
            component: Observable::new(scope.clone(), Descriptor::default()),
            display_memo: Memo::new(),
            pattern_memo: Memo::new(),
            disposers: Mutex::new(Vec::new()),
        });
        let node = FieldNode { inner };
        node.initialize(&props);
        // Registry entry must exist before reactions run and before any
        // computed read, so lookups issued from inside a reaction (or from
        // sibling recomputation) can already see this node.
        form.register(node.clone());
        node.make_reactive(&props);
        node.on_init();
        node
    }

    /// Apply construction props through the same setters external callers
    /// use, in the original member order. Absent members leave state unset.
    fn initialize(&self, props: &FieldProps) {
        if props.title.is_some() {
            self.inner.title.set(props.title.clone());
        }
        if props.description.is_some() {
            self.inner.description.set(props.description.clone());
        }
        if props.pattern.is_some() {
            self.set_pattern(props.pattern);
        }
        if props.display.is_some() {
            self.set_display(props.display);
        }
        self.set_hidden(props.hidden);
        self.set_editable(props.editable);
        self.set_disabled(props.disabled);
        self.set_read_only(props.read_only);
        self.set_read_pretty(props.read_pretty);
        self.set_visible(props.visible);
        if let Some(decorator) = props.decorator.clone() {
            self.replace_decorator(decorator);
        }
        if let Some(component) = props.component.clone() {
            self.replace_component(component);
        }
    }

    /// Wrap each configured reaction: run it once now, then re-run it after
    /// every commit. Subscriptions land in the disposer list released by
    /// [FieldNode::dispose].
    fn make_reactive(&self, props: &FieldProps) {
        for reaction in &props.reactions {
            reaction(self);
            let weak = Arc::downgrade(&self.inner);
            let reaction = reaction.clone();
            let subscription = self.inner.scope.subscribe(move || {
                if let Some(inner) = weak.upgrade() {
                    reaction(&FieldNode { inner });
                }
            });
            self.inner.disposers.lock().push(subscription);
        }
    }

    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    pub fn path(&self) -> &Address {
        &self.inner.path
    }

    /// The owning container, if it is still alive. The back-reference is
    /// non-owning so a dropped form never dangles.
    pub fn form(&self) -> Option<Form> {
        self.inner.form.upgrade().map(Form::from_inner)
    }

    /// Nearest registered ancestor, resolved by walking the registry on
    /// every call. Never cached: restructuring the tree cannot leave a
    /// stale pointer behind.
    pub fn parent(&self) -> Option<FieldNode> {
        resolve::resolve_parent(self)
    }

    pub fn title(&self) -> Option<String> {
        self.inner.title.get()
    }

    pub fn set_title(&self, title: impl Into<Option<String>>) {
        self.inner.title.set(title.into());
    }

    pub fn description(&self) -> Option<String> {
        self.inner.description.get()
    }

    pub fn set_description(&self, description: impl Into<Option<String>>) {
        self.inner.description.set(description.into());
    }

    /// The local display override, if any. `None` defers to inheritance.
    pub fn self_display(&self) -> Option<FieldDisplay> {
        self.inner.self_display.get()
    }

    /// The local pattern override, if any. `None` defers to inheritance.
    pub fn self_pattern(&self) -> Option<FieldPattern> {
        self.inner.self_pattern.get()
    }

    /// Write the display override. `None` clears it, restoring inheritance.
    pub fn set_display(&self, display: Option<FieldDisplay>) {
        self.inner.self_display.set(display);
    }

    /// Write the pattern override. `None` clears it, restoring inheritance.
    pub fn set_pattern(&self, pattern: Option<FieldPattern>) {
        self.inner.self_pattern.set(pattern);
    }

    /// Effective display, recomputed lazily after any commit: self override,
    /// nearest ancestor, container default, `visible`.
    pub fn display(&self) -> FieldDisplay {
        self.inner
            .display_memo
            .get_or(self.inner.scope.epoch(), || resolve::resolve_display(self))
    }

    /// Effective pattern, recomputed lazily after any commit: self override,
    /// nearest ancestor, container default, `editable`.
    pub fn pattern(&self) -> FieldPattern {
        self.inner
            .pattern_memo
            .get_or(self.inner.scope.epoch(), || resolve::resolve_pattern(self))
    }

    pub fn editable(&self) -> bool {
        self.pattern() == FieldPattern::Editable
    }

    pub fn disabled(&self) -> bool {
        self.pattern() == FieldPattern::Disabled
    }

    pub fn read_only(&self) -> bool {
        self.pattern() == FieldPattern::ReadOnly
    }

    pub fn read_pretty(&self) -> bool {
        self.pattern() == FieldPattern::ReadPretty
    }

    pub fn hidden(&self) -> bool {
        self.display() == FieldDisplay::Hidden
    }

    pub fn visible(&self) -> bool {
        self.display() == FieldDisplay::Visible
    }

    /// `None` is a no-op; `false` actively restores `visible`. This is the
    /// convenience pair of [FieldNode::set_visible], and the two are
    /// deliberately asymmetric on their "off" value.
    pub fn set_hidden(&self, hidden: Option<bool>) {
        match hidden {
            Some(true) => self.set_display(Some(FieldDisplay::Hidden)),
            Some(false) => self.set_display(Some(FieldDisplay::Visible)),
            None => {}
        }
    }

    /// `None` is a no-op; `false` writes `none`, not `hidden`: un-setting
    /// visibility and actively hiding are distinct display states with the
    /// same rendering effect.
    pub fn set_visible(&self, visible: Option<bool>) {
        match visible {
            Some(true) => self.set_display(Some(FieldDisplay::Visible)),
            Some(false) => self.set_display(Some(FieldDisplay::None)),
            None => {}
        }
    }

    pub fn set_editable(&self, editable: Option<bool>) {
        match editable {
            Some(true) => self.set_pattern(Some(FieldPattern::Editable)),
            Some(false) => self.set_pattern(Some(FieldPattern::ReadPretty)),
            None => {}
        }
    }

    pub fn set_disabled(&self, disabled: Option<bool>) {
        match disabled {
            Some(true) => self.set_pattern(Some(FieldPattern::Disabled)),
            Some(false) => self.set_pattern(Some(FieldPattern::Editable)),
            None => {}
        }
    }

    pub fn set_read_only(&self, read_only: Option<bool>) {
        match read_only {
            Some(true) => self.set_pattern(Some(FieldPattern::ReadOnly)),
            Some(false) => self.set_pattern(Some(FieldPattern::Editable)),
            None => {}
        }
    }

    pub fn set_read_pretty(&self, read_pretty: Option<bool>) {
        match read_pretty {
            Some(true) => self.set_pattern(Some(FieldPattern::ReadPretty)),
            Some(false) => self.set_pattern(Some(FieldPattern::Editable)),
            None => {}
        }
    }

    /// Current (kind, props) component pair.
    pub fn component(&self) -> Descriptor {
        self.inner.component.get()
    }

    /// Current (kind, props) decorator pair.
    pub fn decorator(&self) -> Descriptor {
        self.inner.decorator.get()
    }

    /// Replace the whole component pair. A bare kind gets an empty props
    /// mapping; both halves change atomically.
    pub fn replace_component(&self, input: impl Into<DescriptorInput>) {
        self.inner.component.set(input.into().normalize());
    }

    /// Replace the whole decorator pair.
    pub fn replace_decorator(&self, input: impl Into<DescriptorInput>) {
        self.inner.decorator.set(input.into().normalize());
    }

    /// Partial update: the kind changes only when provided and non-empty,
    /// and props merge into the existing mapping instead of replacing it.
    pub fn set_component(&self, kind: Option<&str>, props: Option<&Props>) {
        let mut descriptor = self.inner.component.get();
        if let Some(kind) = kind.filter(|kind| !kind.is_empty()) {
            descriptor.kind = Some(kind.to_string());
        }
        if let Some(props) = props {
            descriptor.merge_props(props);
        }
        self.inner.component.set(descriptor);
    }

    /// Merge into the component props, leaving the kind untouched.
    pub fn set_component_props(&self, props: &Props) {
        let mut descriptor = self.inner.component.get();
        descriptor.merge_props(props);
        self.inner.component.set(descriptor);
    }

    /// Partial update of the decorator pair; same contract as
    /// [FieldNode::set_component].
    pub fn set_decorator(&self, kind: Option<&str>, props: Option<&Props>) {
        let mut descriptor = self.inner.decorator.get();
        if let Some(kind) = kind.filter(|kind| !kind.is_empty()) {
            descriptor.kind = Some(kind.to_string());
        }
        if let Some(props) = props {
            descriptor.merge_props(props);
        }
        self.inner.decorator.set(descriptor);
    }

    /// Merge into the decorator props, leaving the kind untouched.
    pub fn set_decorator_props(&self, props: &Props) {
        let mut descriptor = self.inner.decorator.get();
        descriptor.merge_props(props);
        self.inner.decorator.set(descriptor);
    }

    pub fn initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    pub fn mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    pub fn unmounted(&self) -> bool {
        self.inner.unmounted.get()
    }

    /// Fires once, synchronously at construction end, after bindings are
    /// wired. The flag write commits to the scope, which is the coarse
    /// structural-update signal external layers observe the new node by.
    pub(crate) fn on_init(&self) {
        self.inner.initialized.set(true);
        self.notify(LifecycleEvent::FieldInit);
    }

    /// Driven by the rendering host; harmless to call on a mounted node.
    pub fn on_mount(&self) {
        self.inner.mounted.set(true);
        self.inner.unmounted.set(false);
        self.notify(LifecycleEvent::FieldMount);
    }

    pub fn on_unmount(&self) {
        self.inner.mounted.set(false);
        self.inner.unmounted.set(true);
        self.notify(LifecycleEvent::FieldUnmount);
    }

    fn notify(&self, event: LifecycleEvent) {
        if let Some(form) = self.form() {
            form.notify(event, self);
        }
    }

    /// A lazy view over currently-registered nodes matching `pattern`.
    /// Relative patterns (leading `.`) resolve against this node's address.
    pub fn query(&self, pattern: &str) -> FieldQuery {
        FieldQuery::new(pattern, self.inner.address.clone(), self.inner.form.clone())
    }

    /// Whether `pattern` accepts this node's alias group. An unparseable
    /// pattern matches nothing.
    pub fn matches(&self, pattern: &str) -> bool {
        match Pattern::parse(pattern) {
            Ok(pattern) => pattern.match_alias_group(&self.inner.address, &self.inner.path),
            Err(err) => {
                tracing::debug!("match pattern rejected: {err}");
                false
            }
        }
    }

    /// Plain-data snapshot: effective display/pattern, current descriptor
    /// pairs, metadata and lifecycle flags. No live bindings.
    pub fn get_state(&self) -> FieldState {
        FieldState {
            title: self.title(),
            description: self.description(),
            display: Some(self.display()),
            pattern: Some(self.pattern()),
            decorator: Some(self.decorator()),
            component: Some(self.component()),
            decorator_props: None,
            component_props: None,
            initialized: Some(self.initialized()),
            mounted: Some(self.mounted()),
            unmounted: Some(self.unmounted()),
        }
    }

    /// Apply a partial snapshot field-by-field through each setter's own
    /// semantics: pair members replace atomically, `*_props` members merge,
    /// absent members are skipped.
    pub fn set_state(&self, state: FieldState) {
        if state.title.is_some() {
            self.inner.title.set(state.title);
        }
        if state.description.is_some() {
            self.inner.description.set(state.description);
        }
        if state.display.is_some() {
            self.set_display(state.display);
        }
        if state.pattern.is_some() {
            self.set_pattern(state.pattern);
        }
        if let Some(decorator) = state.decorator {
            self.inner.decorator.set(decorator);
        }
        if let Some(component) = state.component {
            self.inner.component.set(component);
        }
        if let Some(props) = state.decorator_props.as_ref() {
            self.set_decorator_props(props);
        }
        if let Some(props) = state.component_props.as_ref() {
            self.set_component_props(props);
        }
        if let Some(initialized) = state.initialized {
            self.inner.initialized.set(initialized);
        }
        if let Some(mounted) = state.mounted {
            self.inner.mounted.set(mounted);
        }
        if let Some(unmounted) = state.unmounted {
            self.inner.unmounted.set(unmounted);
        }
    }

    /// Release every registered reaction. Each disposer runs at most once;
    /// calling this repeatedly is a no-op.
    pub fn dispose(&self) {
        let disposers = self.inner.disposers.lock();
        for subscription in disposers.iter() {
            subscription.dispose();
        }
    }
}

impl Debug for FieldNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldNode")
            .field("address", &self.inner.address.to_string())
            .field("path", &self.inner.path.to_string())
            .field("initialized", &self.initialized())
            .field("mounted", &self.mounted())
            .field("unmounted", &self.unmounted())
            .finish()
    }
}
