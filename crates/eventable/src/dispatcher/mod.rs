//! Dispatcher — priority-ordered, reentrant publish/subscribe.
//!
//! A [`Dispatcher`] is a cheap handle (`Arc` over shared state); clones refer
//! to the same registry. It is both a *source* (`on`, `off`, `trigger`) and a
//! *listener* (`listen_to`, `listen_to_once`, `stop_listening`).
//!
//! # Delivery
//!
//! `trigger(name, args)` snapshots the registrations for `name` and for
//! [`ALL_EVENTS`] before calling anything, then:
//!   - calls every `name` callback in priority order with `args`;
//!   - calls every `"all"` callback with the event name prepended to `args`.
//!
//! Snapshot semantics mean a callback added during delivery is not called
//! until the next trigger, and one removed during delivery still runs in the
//! current round.
//!
//! The state lock (`parking_lot::Mutex`) is never held while a callback runs,
//! so callbacks may call back into any dispatcher, this one included.
//!
//! A callback returning `Err` (or panicking) stops the delivery and the error
//! reaches the caller of `trigger` unchanged. There is no isolation between
//! callbacks at this level.

mod listening;
mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use serde_json::Value;

use crate::callback::{Callback, Invocation};
use crate::context::Context;
use crate::error::Result;
use crate::id::{next_listen_id, next_object_id};
use crate::names::{events_api, expand, Names, Normalized, ALL_EVENTS};

use self::registry::{Bound, Registration, Registry};

struct Shared {
    id: u64,
    listen_id: OnceLock<String>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    /// `None` until the first registration, and again after a bulk `off`.
    events: Option<Registry>,
    /// Sources this dispatcher listens to, keyed by their listen id.
    listening_to: Option<HashMap<String, WeakDispatcher>>,
}

#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

/// Non-owning handle to a [`Dispatcher`].
#[derive(Clone, Default)]
pub struct WeakDispatcher(Weak<Shared>);

impl WeakDispatcher {
    pub fn upgrade(&self) -> Option<Dispatcher> {
        self.0.upgrade().map(|shared| Dispatcher { shared })
    }
}

impl fmt::Debug for WeakDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakDispatcher")
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                id: next_object_id(),
                listen_id: OnceLock::new(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register `callback` for `names`.
    ///
    /// `context` is handed to the callback as its receiver and is what `off`
    /// matches against; without one the callback receives this dispatcher.
    /// Lower `priority` fires first; equal priorities fire in registration
    /// order. With a [`Names::Map`], each entry's callback is registered and
    /// `callback` is ignored. A missing name or callback makes this a no-op.
    pub fn on(
        &self,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        context: Option<&Context>,
        priority: i32,
    ) -> &Self {
        let names = names.into();
        let outcome = expand(&names, callback, |name, callback| {
            self.on(name, callback, context, priority);
        });
        let (Normalized::Single(name), Some(callback)) = (outcome, callback) else {
            return self;
        };

        let registration = Registration::new(callback.clone(), context.cloned(), priority);
        self.shared
            .state
            .lock()
            .events
            .get_or_insert_with(Registry::default)
            .insert(name, registration);
        self
    }

    /// Like [`on`](Self::on), but the callback removes itself the first time
    /// it fires, before it runs. `off` with the original callback still finds
    /// the registration.
    pub fn once(
        &self,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        context: Option<&Context>,
        priority: i32,
    ) -> &Self {
        let names = names.into();
        let outcome = expand(&names, callback, |name, callback| {
            self.once(name, callback, context, priority);
        });
        let (Normalized::Single(name), Some(callback)) = (outcome, callback) else {
            return self;
        };

        let owner = self.downgrade();
        let event = name.to_string();
        let original = callback.clone();
        let fired = AtomicBool::new(false);
        let wrapper = Callback::wrapping(callback, move |me| {
            Box::new(move |invocation: &Invocation<'_>| -> Result<()> {
                if fired.swap(true, Ordering::SeqCst) {
                    return Ok(());
                }
                if let (Some(owner), Some(me)) = (owner.upgrade(), me.upgrade()) {
                    owner.off(event.as_str(), Some(&me), None);
                }
                original.call(invocation)
            })
        });
        self.on(name, Some(&wrapper), context, priority)
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    /// Remove registrations.
    ///
    /// Every given filter must match: `names` narrows the event names
    /// ([`Names::Any`] means all of them), `callback` matches the registered
    /// callback or the original behind a `once` wrapper, and `context`
    /// matches the declared context by identity. With no filter at all the
    /// whole registry is discarded.
    pub fn off(
        &self,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> &Self {
        if self.shared.state.lock().events.is_none() {
            return self;
        }

        let names = names.into();
        let outcome = expand(&names, callback, |name, callback| {
            self.off(name, callback, context);
        });
        let name = match outcome {
            Normalized::Single(name) => Some(name),
            Normalized::Absent => None,
            Normalized::Expanded => return self,
        };

        let mut state = self.shared.state.lock();
        if name.is_none() && callback.is_none() && context.is_none() {
            state.events = None;
            tracing::debug!(dispatcher = self.shared.id, "cleared every registration");
            return self;
        }
        if let Some(registry) = state.events.as_mut() {
            registry.remove(name, callback, context);
        }
        self
    }

    /// Alias of [`on`](Self::on).
    pub fn bind(
        &self,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        context: Option<&Context>,
        priority: i32,
    ) -> &Self {
        self.on(names, callback, context, priority)
    }

    /// Alias of [`off`](Self::off).
    pub fn unbind(
        &self,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> &Self {
        self.off(names, callback, context)
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Fire `names` (one name, or several separated by whitespace) with
    /// `args`. An empty or blank `names` fires the `"all"` channel with `""`
    /// as the event name. See the module docs for ordering.
    pub fn trigger(&self, names: &str, args: &[Value]) -> Result<&Self> {
        if self.shared.state.lock().events.is_none() {
            return Ok(self);
        }

        let names = Names::from(names);
        let outcome = events_api(&names, None, |name, _| self.trigger(name, args).map(|_| ()))?;
        match outcome {
            Normalized::Single(name) => self.fire(name, args)?,
            // Nothing can be registered under an empty name, but "all" still
            // hears it.
            Normalized::Absent => self.fire("", args)?,
            Normalized::Expanded => {}
        }
        Ok(self)
    }

    fn fire(&self, name: &str, args: &[Value]) -> Result<()> {
        let (specific, wildcard) = {
            let state = self.shared.state.lock();
            let Some(registry) = state.events.as_ref() else {
                return Ok(());
            };
            (registry.snapshot(name), registry.snapshot(ALL_EVENTS))
        };
        tracing::trace!(
            dispatcher = self.shared.id,
            event = name,
            specific = specific.len(),
            wildcard = wildcard.len(),
            "trigger"
        );
        if specific.is_empty() && wildcard.is_empty() {
            return Ok(());
        }

        let owner = Context::from(self);
        deliver(name, &specific, &owner, args)?;

        if !wildcard.is_empty() {
            let mut with_name = Vec::with_capacity(args.len() + 1);
            with_name.push(Value::String(name.to_string()));
            with_name.extend_from_slice(args);
            deliver(name, &wildcard, &owner, &with_name)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Number of registrations stored for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.shared
            .state
            .lock()
            .events
            .as_ref()
            .map_or(0, |registry| registry.count(name))
    }

    /// Every event name with at least one registration, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.shared
            .state
            .lock()
            .events
            .as_ref()
            .map(Registry::names)
            .unwrap_or_default()
    }

    pub fn has_events(&self) -> bool {
        self.shared
            .state
            .lock()
            .events
            .as_ref()
            .is_some_and(|registry| !registry.is_empty())
    }

    /// This dispatcher's listen id, if something has listened to it yet.
    pub fn listen_id(&self) -> Option<String> {
        self.shared.listen_id.get().cloned()
    }

    pub(crate) fn ensure_listen_id(&self) -> String {
        self.shared.listen_id.get_or_init(next_listen_id).clone()
    }

    pub(crate) fn instance_id(&self) -> u64 {
        self.shared.id
    }

    pub fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher(Arc::downgrade(&self.shared))
    }

    /// True if both handles refer to the same dispatcher.
    pub fn ptr_eq(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

fn deliver(event: &str, registrations: &[Registration], owner: &Context, args: &[Value]) -> Result<()> {
    for registration in registrations {
        let context = match &registration.bound {
            Bound::Owner => owner,
            Bound::Context(context) => context,
        };
        if let Err(err) = registration.callback.call(&Invocation::new(context, args)) {
            tracing::debug!(event = %event, error = %err, "handler failed, delivery aborted");
            return Err(err);
        }
    }
    Ok(())
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("id", &self.shared.id)
            .field("listen_id", &self.listen_id())
            .field("events", &self.event_names())
            .finish()
    }
}
