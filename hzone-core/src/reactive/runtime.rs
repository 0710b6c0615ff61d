//! Reactive Runtime
//!
//! The runtime connects signals and effects. It keeps the dependency table
//! and reruns effects when a signal they read changes.
//!
//! # How It Works
//!
//! 1. When an effect is created, it registers with the runtime.
//!
//! 2. When an effect reads a signal, the runtime records the dependency.
//!
//! 3. When a signal's value changes, the runtime collects every registered
//!    dependent, releases its own tables and then schedules each one. Effects
//!    may therefore read and write signals while they run.
//!
//! All state is thread-local. Signals and effects are `!Send`, so a value
//! can never be observed from a thread whose runtime does not know it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::context::ReactiveContext;
use super::subscriber::{SignalId, SubscriberId};

/// A computation the runtime can rerun.
pub trait Reactive {
    fn subscriber_id(&self) -> SubscriberId;

    /// Rerun the computation because a dependency changed.
    fn schedule(&self);
}

/// Handle to a registered reactive value.
///
/// Dropping this handle unregisters the reactive value from the runtime.
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// The per-thread reactive runtime.
pub struct Runtime;

thread_local! {
    // Weak references, so registration never keeps an effect alive.
    static REGISTRY: RefCell<HashMap<SubscriberId, Weak<dyn Reactive>>> =
        RefCell::new(HashMap::new());
    static SIGNAL_SUBSCRIBERS: RefCell<HashMap<SignalId, Vec<SubscriberId>>> =
        RefCell::new(HashMap::new());
}

impl Runtime {
    /// Register a reactive value with the runtime.
    ///
    /// Returns a handle that unregisters the value when dropped.
    pub fn register(reactive: &Rc<dyn Reactive>) -> ReactiveHandle {
        let id = reactive.subscriber_id();
        REGISTRY.with(|registry| {
            registry.borrow_mut().insert(id, Rc::downgrade(reactive));
        });
        ReactiveHandle { subscriber_id: id }
    }

    fn unregister(id: SubscriberId) {
        // Handles can outlive the thread-locals during thread teardown
        let _ = REGISTRY.try_with(|registry| {
            registry.borrow_mut().remove(&id);
        });
        let _ = SIGNAL_SUBSCRIBERS.try_with(|subscribers| {
            for subs in subscribers.borrow_mut().values_mut() {
                subs.retain(|s| *s != id);
            }
        });
    }

    /// Record that a subscriber depends on a signal.
    pub fn add_dependency(signal_id: SignalId, subscriber_id: SubscriberId) {
        SIGNAL_SUBSCRIBERS.with(|subscribers| {
            let mut subscribers = subscribers.borrow_mut();
            let subs = subscribers.entry(signal_id).or_default();
            if !subs.contains(&subscriber_id) {
                subs.push(subscriber_id);
            }
        });
    }

    /// Remove all dependencies for a subscriber.
    ///
    /// Called before re-running a computation to clear stale dependencies.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        SIGNAL_SUBSCRIBERS.with(|subscribers| {
            for subs in subscribers.borrow_mut().values_mut() {
                subs.retain(|s| *s != subscriber_id);
            }
        });
    }

    /// Forget a signal that no longer exists.
    pub fn drop_signal(signal_id: SignalId) {
        let _ = SIGNAL_SUBSCRIBERS.try_with(|subscribers| {
            subscribers.borrow_mut().remove(&signal_id);
        });
    }

    /// Notify all subscribers that a signal changed.
    pub fn notify_signal_change(signal_id: SignalId) {
        let subscriber_ids = SIGNAL_SUBSCRIBERS.with(|subscribers| {
            subscribers
                .borrow()
                .get(&signal_id)
                .cloned()
                .unwrap_or_default()
        });
        if subscriber_ids.is_empty() {
            return;
        }

        let to_run: Vec<Rc<dyn Reactive>> = REGISTRY.with(|registry| {
            let registry = registry.borrow();
            subscriber_ids
                .iter()
                .filter_map(|id| registry.get(id).and_then(Weak::upgrade))
                .collect()
        });

        tracing::trace!(?signal_id, dependents = to_run.len(), "signal changed");
        for reactive in to_run {
            reactive.schedule();
        }
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a tracking context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct MockReactive {
        id: SubscriberId,
        scheduled: Cell<i32>,
    }

    impl MockReactive {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: SubscriberId::new(),
                scheduled: Cell::new(0),
            })
        }
    }

    impl Reactive for MockReactive {
        fn subscriber_id(&self) -> SubscriberId {
            self.id
        }

        fn schedule(&self) {
            self.scheduled.set(self.scheduled.get() + 1);
        }
    }

    fn is_registered(id: SubscriberId) -> bool {
        REGISTRY.with(|registry| registry.borrow().contains_key(&id))
    }

    fn depends_on(signal_id: SignalId, id: SubscriberId) -> bool {
        SIGNAL_SUBSCRIBERS.with(|subscribers| {
            subscribers
                .borrow()
                .get(&signal_id)
                .is_some_and(|subs| subs.contains(&id))
        })
    }

    #[test]
    fn runtime_registers_and_unregisters() {
        let reactive = MockReactive::new();
        let id = reactive.id;

        let dyn_reactive: Rc<dyn Reactive> = reactive;
        let handle = Runtime::register(&dyn_reactive);
        assert!(is_registered(id));

        drop(handle);
        assert!(!is_registered(id));
    }

    #[test]
    fn runtime_notifies_subscribers_once() {
        let first = MockReactive::new();
        let second = MockReactive::new();
        let signal = SignalId::new();

        let first_dyn: Rc<dyn Reactive> = first.clone();
        let second_dyn: Rc<dyn Reactive> = second.clone();
        let _first_handle = Runtime::register(&first_dyn);
        let _second_handle = Runtime::register(&second_dyn);

        Runtime::add_dependency(signal, first.id);
        Runtime::add_dependency(signal, first.id);
        Runtime::add_dependency(signal, second.id);

        Runtime::notify_signal_change(signal);

        assert_eq!(first.scheduled.get(), 1);
        assert_eq!(second.scheduled.get(), 1);
    }

    #[test]
    fn dropped_reactives_are_skipped() {
        let reactive = MockReactive::new();
        let signal = SignalId::new();
        let id = reactive.id;

        let dyn_reactive: Rc<dyn Reactive> = reactive;
        let _handle = Runtime::register(&dyn_reactive);
        Runtime::add_dependency(signal, id);
        drop(dyn_reactive);

        // Weak registration: nothing left to schedule
        Runtime::notify_signal_change(signal);
    }

    #[test]
    fn runtime_clears_dependencies() {
        let reactive = MockReactive::new();
        let signal = SignalId::new();
        let id = reactive.id;

        Runtime::add_dependency(signal, id);
        assert!(depends_on(signal, id));

        Runtime::clear_dependencies(id);
        assert!(!depends_on(signal, id));
    }
}
