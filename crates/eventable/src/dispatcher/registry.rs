//! Per-dispatcher registration storage.
//!
//! Each event name owns a `Vec<Registration>` kept sorted by priority, with
//! equal priorities in insertion order. A name never maps to an empty vector.

use std::collections::HashMap;

use crate::callback::Callback;
use crate::context::Context;

/// The receiver a registration was bound to when it was inserted.
#[derive(Debug, Clone)]
pub(crate) enum Bound {
    /// The dispatcher that owns the registry. Not stored as a handle, since
    /// the registry lives inside that dispatcher.
    Owner,
    Context(Context),
}

#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub(crate) callback: Callback,
    /// The declared context; `off` matches against this, never the bound one.
    pub(crate) context: Option<Context>,
    pub(crate) bound: Bound,
    pub(crate) priority: i32,
}

impl Registration {
    pub(crate) fn new(callback: Callback, context: Option<Context>, priority: i32) -> Self {
        let bound = match &context {
            Some(context) => Bound::Context(context.clone()),
            None => Bound::Owner,
        };
        Self {
            callback,
            context,
            bound,
            priority,
        }
    }

    fn matches(&self, callback: Option<&Callback>, context: Option<&Context>) -> bool {
        callback.map_or(true, |callback| self.callback.matches(callback))
            && context.map_or(true, |context| self.context.as_ref() == Some(context))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    events: HashMap<String, Vec<Registration>>,
}

impl Registry {
    /// Insert after every existing entry whose priority is <= the new one.
    pub(crate) fn insert(&mut self, name: &str, registration: Registration) {
        let entries = self.events.entry(name.to_string()).or_default();
        let at = entries.partition_point(|existing| existing.priority <= registration.priority);
        entries.insert(at, registration);
    }

    /// Remove registrations under `name` (every name when `None`) matching
    /// the filters. With neither filter, whole names are dropped.
    pub(crate) fn remove(
        &mut self,
        name: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> usize {
        let names: Vec<String> = match name {
            Some(name) => vec![name.to_string()],
            None => self.events.keys().cloned().collect(),
        };

        let mut removed = 0;
        for name in names {
            let Some(entries) = self.events.get_mut(&name) else {
                continue;
            };

            if callback.is_none() && context.is_none() {
                removed += entries.len();
                self.events.remove(&name);
                tracing::debug!(event = %name, "dropped every registration for event");
                continue;
            }

            let before = entries.len();
            entries.retain(|registration| !registration.matches(callback, context));
            removed += before - entries.len();

            if entries.is_empty() {
                self.events.remove(&name);
                tracing::debug!(event = %name, "last registration removed");
            }
        }
        removed
    }

    /// Copy of the current sequence for `name`; empty if none.
    pub(crate) fn snapshot(&self, name: &str) -> Vec<Registration> {
        self.events.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.events.get(name).map_or(0, Vec::len)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
