//! Inverse subscriptions: a dispatcher acting as a listener.
//!
//! `listen_to` registers on the source with the listener itself as the
//! declared context and remembers the source under its listen id, so a later
//! `stop_listening` can find every registration the listener made, on every
//! source, by context identity.
//!
//! Both directions are weak: the source holds the listener through a
//! dispatcher context, and the listener remembers sources by `WeakDispatcher`.
//! Listeners and sources therefore never keep each other alive, even when a
//! dispatcher listens to itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::callback::{Callback, Invocation};
use crate::context::Context;
use crate::error::Result;
use crate::names::{expand, Names, Normalized};

use super::Dispatcher;

impl Dispatcher {
    /// Listen to `names` on `source`.
    ///
    /// Equivalent to `source.on(names, callback, Some(self), priority)` plus
    /// bookkeeping on this dispatcher. With a [`Names::Map`] every entry is
    /// registered with this dispatcher as context.
    pub fn listen_to(
        &self,
        source: &Dispatcher,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        priority: i32,
    ) -> &Self {
        let listen_id = source.ensure_listen_id();
        self.shared
            .state
            .lock()
            .listening_to
            .get_or_insert_with(HashMap::new)
            .insert(listen_id, source.downgrade());

        source.on(names, callback, Some(&Context::from(self)), priority);
        self
    }

    /// Like [`listen_to`](Self::listen_to), but the subscription is dropped
    /// through `stop_listening` the first time it fires, before the callback
    /// runs.
    pub fn listen_to_once(
        &self,
        source: &Dispatcher,
        names: impl Into<Names>,
        callback: Option<&Callback>,
        priority: i32,
    ) -> &Self {
        let names = names.into();
        let outcome = expand(&names, callback, |name, callback| {
            self.listen_to_once(source, name, callback, priority);
        });
        let (Normalized::Single(name), Some(callback)) = (outcome, callback) else {
            return self;
        };

        let listener = self.downgrade();
        let target = source.downgrade();
        let event = name.to_string();
        let original = callback.clone();
        let fired = AtomicBool::new(false);
        let wrapper = Callback::wrapping(callback, move |me| {
            Box::new(move |invocation: &Invocation<'_>| -> Result<()> {
                if fired.swap(true, Ordering::SeqCst) {
                    return Ok(());
                }
                if let (Some(listener), Some(source), Some(me)) =
                    (listener.upgrade(), target.upgrade(), me.upgrade())
                {
                    listener.stop_listening(Some(&source), event.as_str(), Some(&me));
                }
                original.call(invocation)
            })
        });
        self.listen_to(source, name, Some(&wrapper), priority)
    }

    /// Remove registrations this dispatcher made with `listen_to`.
    ///
    /// Narrowed to `source` when given, else every source listened to. `names`
    /// and `callback` filter as in [`off`](Self::off); a [`Names::Map`]
    /// supplies its own callbacks. A source is forgotten when no filter was
    /// given or when it has no registrations left at all.
    pub fn stop_listening(
        &self,
        source: Option<&Dispatcher>,
        names: impl Into<Names>,
        callback: Option<&Callback>,
    ) -> &Self {
        let targets: Vec<(Option<String>, Option<Dispatcher>)> = {
            let state = self.shared.state.lock();
            let Some(listening_to) = state.listening_to.as_ref() else {
                return self;
            };
            match source {
                Some(source) => vec![(source.listen_id(), Some(source.clone()))],
                None => listening_to
                    .iter()
                    .map(|(id, weak)| (Some(id.clone()), weak.upgrade()))
                    .collect(),
            }
        };

        let names = names.into();
        let stop_all = names.is_any() && callback.is_none();
        let me = Context::from(self);

        for (listen_id, target) in targets {
            let Some(target) = target else {
                tracing::debug!(listen_id = ?listen_id, "source dropped, forgetting it");
                self.forget(listen_id.as_deref());
                continue;
            };
            target.off(&names, callback, Some(&me));
            if stop_all || !target.has_events() {
                self.forget(listen_id.as_deref());
            }
        }
        self
    }

    /// True if this dispatcher tracks `source` as something it listens to.
    pub fn is_listening_to(&self, source: &Dispatcher) -> bool {
        let Some(listen_id) = source.listen_id() else {
            return false;
        };
        self.shared
            .state
            .lock()
            .listening_to
            .as_ref()
            .and_then(|listening_to| listening_to.get(&listen_id))
            .and_then(|weak| weak.upgrade())
            .is_some_and(|tracked| tracked.ptr_eq(source))
    }

    /// Number of sources currently tracked.
    pub fn listening_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .listening_to
            .as_ref()
            .map_or(0, HashMap::len)
    }

    fn forget(&self, listen_id: Option<&str>) {
        let Some(listen_id) = listen_id else {
            return;
        };
        let mut state = self.shared.state.lock();
        if let Some(listening_to) = state.listening_to.as_mut() {
            if listening_to.remove(listen_id).is_some() {
                tracing::debug!(
                    listener = self.shared.id,
                    listen_id = %listen_id,
                    "stopped listening to source"
                );
            }
        }
    }
}
