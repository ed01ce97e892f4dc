//! Context — the identity a registration is bound to.
//!
//! A context plays two roles: it is the value handed to a callback as its
//! receiver, and it is the key `off`/`stop_listening` match against. Matching
//! is by identity only: two contexts are equal when one is a clone of the
//! other, never because their values compare equal.
//!
//! A context built from a dispatcher holds it weakly. Registrations store
//! their context, so a strong handle would let a dispatcher that listens to
//! itself (or two that listen to each other) keep itself alive.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::dispatcher::{Dispatcher, WeakDispatcher};
use crate::id::next_object_id;

#[derive(Clone)]
pub struct Context {
    id: u64,
    value: Arc<dyn Any + Send + Sync>,
}

impl Context {
    /// Wrap `value` in a new context with its own identity.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            id: next_object_id(),
            value: Arc::new(value),
        }
    }

    /// Borrow the wrapped value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The dispatcher this context stands for, if it was built from one and
    /// is still alive.
    pub fn as_dispatcher(&self) -> Option<Dispatcher> {
        self.downcast_ref::<WeakDispatcher>()
            .and_then(WeakDispatcher::upgrade)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        self.id == other.id
    }
}

/// A dispatcher used as a context keeps its own identity: every conversion of
/// the same dispatcher yields equal contexts.
impl From<&Dispatcher> for Context {
    fn from(dispatcher: &Dispatcher) -> Self {
        Self {
            id: dispatcher.instance_id(),
            value: Arc::new(dispatcher.downgrade()),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("id", &self.id).finish_non_exhaustive()
    }
}
