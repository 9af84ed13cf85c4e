//! Explicit dependency-tracking substrate for computed field state.
//!
//! There is no ambient tracking runtime here. A [ReactiveScope] carries a
//! monotonically increasing epoch plus a subscriber bus; every committed
//! write bumps the epoch and notifies subscribers. Computed properties are
//! memoized against the epoch ([Memo]) and lazily recompute on the next read
//! after any commit, so a read always reflects every mutation applied before
//! it in program order. Subscribers are explicit [Subscription] objects and
//! double as the disposer handles collected by field nodes.

use parking_lot::{Mutex, RwLock};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

#[derive(Clone)]
struct Watcher {
    callback: Arc<dyn Fn() + Send + Sync>,
    /// Reentrancy guard: a commit issued while this watcher is running does
    /// not re-enter the same watcher instance.
    running: Arc<AtomicBool>,
}

#[derive(Default)]
struct ScopeInner {
    epoch: AtomicU64,
    next_id: AtomicU64,
    watchers: RwLock<BTreeMap<u64, Watcher>>,
}

/// Shared reactive context for one form tree.
///
/// Cheap to clone; every observable belonging to the tree holds a clone and
/// commits through it. The scope owns no nodes and no registry, only the
/// epoch and the subscriber bus, so handles held by nodes do not keep the
/// container alive.
#[derive(Clone, Default)]
pub struct ReactiveScope {
    inner: Arc<ScopeInner>,
}

impl ReactiveScope {
    pub fn new() -> ReactiveScope {
        ReactiveScope::default()
    }

    /// Current epoch. A [Memo] produced at this epoch stays valid until the
    /// next commit.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Record a completed mutation: bump the epoch, then run subscribers.
    ///
    /// Subscribers run outside the bus lock, so a callback may subscribe or
    /// dispose freely. A callback that commits again will not re-enter
    /// itself.
    pub fn commit(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let watchers: Vec<Watcher> = self.inner.watchers.read().values().cloned().collect();
        for watcher in watchers {
            if watcher.running.swap(true, Ordering::SeqCst) {
                continue;
            }
            (watcher.callback)();
            watcher.running.store(false, Ordering::SeqCst);
        }
    }

    /// Register a callback to run after every subsequent commit. The
    /// returned [Subscription] unregisters it.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner.watchers.write().insert(
            id,
            Watcher {
                callback: Arc::new(callback),
                running: Arc::new(AtomicBool::new(false)),
            },
        );
        let scope = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(scope) = scope.upgrade() {
                scope.watchers.write().remove(&id);
            }
        })
    }

    /// Number of live subscribers. Instrumentation surface; tests use it to
    /// pin disposal behavior.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.read().len()
    }
}

/// A disposer that runs its cleanup exactly once, no matter how many times
/// [Subscription::dispose] is called.
pub struct Subscription {
    cleanup: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Subscription {
        Subscription {
            cleanup: Mutex::new(Some(Box::new(cleanup))),
        }
    }

    /// Run the cleanup if it has not run yet. Safe to call repeatedly.
    pub fn dispose(&self) {
        let cleanup = self.cleanup.lock().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.cleanup.lock().is_none()
    }
}

/// A mutable value cell bound to a [ReactiveScope].
///
/// Writes that change the value commit to the scope; equal writes are
/// absorbed so idempotent transitions (re-mounting a mounted node) stay
/// quiet.
pub struct Observable<T> {
    scope: ReactiveScope,
    value: RwLock<T>,
}

impl<T: Clone + PartialEq> Observable<T> {
    pub fn new(scope: ReactiveScope, initial: T) -> Observable<T> {
        Observable {
            scope,
            value: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    pub fn set(&self, value: T) {
        {
            let mut guard = self.value.write();
            if *guard == value {
                return;
            }
            *guard = value;
        }
        self.scope.commit();
    }
}

/// Epoch-keyed cache for a computed property.
///
/// The invalidation signal is the scope epoch: any committed write anywhere
/// in the tree invalidates the cache, and the next read recomputes. This is
/// conservative (some recomputations are unnecessary) but never stale.
#[derive(Default)]
pub struct Memo<T> {
    state: RwLock<Option<(u64, T)>>,
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Memo<T> {
        Memo {
            state: RwLock::new(None),
        }
    }

    /// Return the cached value when it was produced at `epoch`, otherwise
    /// recompute, cache, and return. The compute closure runs without any
    /// memo lock held.
    pub fn get_or(&self, epoch: u64, compute: impl FnOnce() -> T) -> T {
        {
            let guard = self.state.read();
            if let Some((cached_epoch, value)) = guard.as_ref() {
                if *cached_epoch == epoch {
                    return value.clone();
                }
            }
        }
        let value = compute();
        *self.state.write() = Some((epoch, value.clone()));
        value
    }
}
