//! Reactive Primitives
//!
//! A small signal engine: signals and effects with automatic dependency
//! tracking. The renderers never depend on it directly. They see live values
//! as [`Accessor`](crate::value::Accessor)s and create effects through an
//! [`EffectScheduler`](crate::render::EffectScheduler), and
//! [`SignalEffects`](crate::render::SignalEffects) is the scheduler backed by
//! this module.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracking context (an effect), the signal registers that context as
//! a dependent. When the signal's value changes, all dependents rerun.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change. The reactive binder uses effects to keep attributes,
//! members, styles and text nodes in sync with accessors.
//!
//! # Implementation Notes
//!
//! The engine is single-threaded. Tracking uses a thread-local context stack
//! and the dependency table lives in a thread-local runtime.

mod context;
mod effect;
mod runtime;
mod signal;
mod subscriber;

pub use context::{untracked, ReactiveContext};
pub use effect::Effect;
pub use runtime::{Reactive, ReactiveHandle, Runtime};
pub use signal::Signal;
pub use subscriber::{SignalId, SubscriberId};
