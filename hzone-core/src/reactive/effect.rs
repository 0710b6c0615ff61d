//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency changes, the effect runs again, synchronously.
//!
//! 3. Before re-running, the effect clears its old dependencies and tracks
//!    new ones during execution.
//!
//! An effect that writes a signal it reads does not recurse: a notification
//! that arrives while the effect is running is ignored.
//!
//! Effects stay registered while at least one [`Effect`] handle is alive.
//! Dropping the last handle unregisters the effect.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::context::ReactiveContext;
use super::runtime::{Reactive, ReactiveHandle, Runtime};
use super::subscriber::{SignalId, SubscriberId};

struct EffectInner {
    subscriber_id: SubscriberId,
    run: RefCell<Box<dyn FnMut()>>,
    dependencies: RefCell<Vec<SignalId>>,
    running: Cell<bool>,
    disposed: Cell<bool>,
    run_count: Cell<usize>,
    handle: RefCell<Option<ReactiveHandle>>,
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.get() || self.running.get() {
            return;
        }
        self.running.set(true);

        Runtime::clear_dependencies(self.subscriber_id);
        let dependencies = {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            (&mut *self.run.borrow_mut())();
            ReactiveContext::get_dependencies()
        };

        *self.dependencies.borrow_mut() = dependencies;
        self.run_count.set(self.run_count.get() + 1);
        self.running.set(false);
    }
}

impl Reactive for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn schedule(&self) {
        self.execute();
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// let effect = Effect::new({
///     let count = count.clone();
///     move || println!("Count is: {}", count.get())
/// });
///
/// count.set(5);  // Prints: "Count is: 5"
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create a new effect without running it immediately.
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let inner = Rc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            run: RefCell::new(Box::new(run)),
            dependencies: RefCell::new(Vec::new()),
            running: Cell::new(false),
            disposed: Cell::new(false),
            run_count: Cell::new(0),
            handle: RefCell::new(None),
        });

        let reactive: Rc<dyn Reactive> = inner.clone();
        *inner.handle.borrow_mut() = Some(Runtime::register(&reactive));

        Self { inner }
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Run the effect function, tracking what it reads.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Rerun because a dependency changed.
    pub fn schedule(&self) {
        self.inner.schedule();
    }

    /// Stop the effect. It will not run again.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        Runtime::clear_dependencies(self.inner.subscriber_id);
        self.inner.dependencies.borrow_mut().clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
