//! Callback handles and the invocation they receive.
//!
//! Callbacks are stored as `Arc`s so that registry snapshots are cheap and so
//! that identity survives cloning: `off` removes a registration only when it
//! is handed a clone of the very handle that was registered.

use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::context::Context;
use crate::error::Result;

/// Closure type behind every [`Callback`].
pub type HandlerFn = dyn Fn(&Invocation<'_>) -> Result<()> + Send + Sync;

/// What a callback sees when it fires.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    context: &'a Context,
    args: &'a [Value],
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(context: &'a Context, args: &'a [Value]) -> Self {
        Self { context, args }
    }

    /// The resolved receiver: the declared context, or the dispatcher that
    /// owns the registration.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}

pub(crate) struct CallbackInner {
    handler: Box<HandlerFn>,
    /// Set on self-removing wrappers: the callback the caller registered.
    original: Option<Callback>,
}

/// An identity-compared, cheaply clonable event handler.
#[derive(Clone)]
pub struct Callback(Arc<CallbackInner>);

impl Callback {
    /// Build a callback from a fallible handler.
    pub fn new(handler: impl Fn(&Invocation<'_>) -> Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(CallbackInner {
            handler: Box::new(handler),
            original: None,
        }))
    }

    /// Build a callback from a handler that cannot fail.
    pub fn from_fn(handler: impl Fn(&Invocation<'_>) + Send + Sync + 'static) -> Self {
        Self::new(move |invocation| {
            handler(invocation);
            Ok(())
        })
    }

    /// Build a wrapper around `original`. `make` receives a weak handle to the
    /// wrapper being built so the handler can refer to its own identity.
    pub(crate) fn wrapping(
        original: &Callback,
        make: impl FnOnce(WeakCallback) -> Box<HandlerFn>,
    ) -> Self {
        Self(Arc::new_cyclic(|weak| CallbackInner {
            handler: make(WeakCallback(weak.clone())),
            original: Some(original.clone()),
        }))
    }

    /// The wrapped callback, when this is a self-removing wrapper.
    pub fn original(&self) -> Option<&Callback> {
        self.0.original.as_ref()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True if `filter` is this callback or the callback this one wraps.
    pub(crate) fn matches(&self, filter: &Callback) -> bool {
        self.ptr_eq(filter) || self.original().is_some_and(|original| original.ptr_eq(filter))
    }

    pub(crate) fn call(&self, invocation: &Invocation<'_>) -> Result<()> {
        (self.0.handler)(invocation)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &Arc::as_ptr(&self.0))
            .field("wrapper", &self.0.original.is_some())
            .finish()
    }
}

/// Non-owning handle a wrapper keeps to itself.
#[derive(Clone)]
pub(crate) struct WeakCallback(Weak<CallbackInner>);

impl WeakCallback {
    pub(crate) fn upgrade(&self) -> Option<Callback> {
        self.0.upgrade().map(Callback)
    }
}
