//! Event-name normalization.
//!
//! Every public operation accepts [`Names`]: nothing, a single name, several
//! whitespace-separated names (`"change blur"`), or a [`HandlerMap`]
//! (`{change: on_change, blur: on_blur}`). [`events_api`] turns the
//! compound forms into repeated single-name calls of the operation that
//! received them.

use crate::callback::Callback;

/// Name of the wildcard channel. Its callbacks see every event, with the
/// event name prepended to the arguments.
pub const ALL_EVENTS: &str = "all";

/// An insertion-ordered mapping from event name to callback.
#[derive(Debug, Clone, Default)]
pub struct HandlerMap {
    entries: Vec<(String, Callback)>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style. A repeated name replaces the earlier
    /// callback in place.
    pub fn with(mut self, name: impl Into<String>, callback: &Callback) -> Self {
        self.insert(name, callback);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, callback: &Callback) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = callback.clone(),
            None => self.entries.push((name, callback.clone())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Callback)> {
        self.entries.iter().map(|(name, callback)| (name.as_str(), callback))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The event-name argument of every dispatcher operation.
#[derive(Debug, Clone, Default)]
pub enum Names {
    /// No name given.
    #[default]
    Any,
    /// One name, or several separated by whitespace.
    List(String),
    /// Name → callback pairs; the map's callbacks replace the call's own.
    Map(HandlerMap),
}

impl Names {
    pub fn is_any(&self) -> bool {
        matches!(self, Names::Any)
    }
}

impl From<&str> for Names {
    fn from(names: &str) -> Self {
        if names.trim().is_empty() {
            Names::Any
        } else {
            Names::List(names.to_string())
        }
    }
}

impl From<String> for Names {
    fn from(names: String) -> Self {
        if names.trim().is_empty() {
            Names::Any
        } else {
            Names::List(names)
        }
    }
}

impl From<&String> for Names {
    fn from(names: &String) -> Self {
        Names::from(names.as_str())
    }
}

impl From<Option<&str>> for Names {
    fn from(names: Option<&str>) -> Self {
        names.map(Names::from).unwrap_or_default()
    }
}

impl From<HandlerMap> for Names {
    fn from(map: HandlerMap) -> Self {
        Names::Map(map)
    }
}

impl From<&HandlerMap> for Names {
    fn from(map: &HandlerMap) -> Self {
        Names::Map(map.clone())
    }
}

impl From<&Names> for Names {
    fn from(names: &Names) -> Self {
        names.clone()
    }
}

/// Outcome of [`events_api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Normalized<'a> {
    /// No name: the caller proceeds with its name-less behaviour.
    Absent,
    /// Already a single name: the caller proceeds with it.
    Single(&'a str),
    /// The work was fanned out through `apply`; the caller must stop.
    Expanded,
}

/// Expand `names`, calling `apply` once per single name for compound forms.
///
/// `apply` receives the callback to use for that name: the map value for
/// map entries, `callback` otherwise. It is expected to re-enter the public
/// operation, so map keys may themselves hold several names. The first error
/// stops the expansion.
pub(crate) fn events_api<'a, E>(
    names: &'a Names,
    callback: Option<&Callback>,
    mut apply: impl FnMut(&str, Option<&Callback>) -> Result<(), E>,
) -> Result<Normalized<'a>, E> {
    match names {
        Names::Any => Ok(Normalized::Absent),
        Names::Map(map) => {
            for (name, handler) in map.iter() {
                apply(name, Some(handler))?;
            }
            Ok(Normalized::Expanded)
        }
        Names::List(list) => {
            let mut split = split_names(list);
            match (split.next(), split.next()) {
                (None, _) => Ok(Normalized::Absent),
                (Some(single), None) => Ok(Normalized::Single(single)),
                (Some(first), Some(second)) => {
                    apply(first, callback)?;
                    apply(second, callback)?;
                    for name in split {
                        apply(name, callback)?;
                    }
                    Ok(Normalized::Expanded)
                }
            }
        }
    }
}

/// Split on runs of whitespace. Leading/trailing whitespace yields no empty
/// names.
pub(crate) fn split_names(list: &str) -> impl Iterator<Item = &str> {
    list.split_whitespace()
}

/// [`events_api`] for operations that cannot fail.
pub(crate) fn expand<'a>(
    names: &'a Names,
    callback: Option<&Callback>,
    mut apply: impl FnMut(&str, Option<&Callback>),
) -> Normalized<'a> {
    let outcome = events_api(names, callback, |name, callback| {
        apply(name, callback);
        Ok::<(), std::convert::Infallible>(())
    });
    match outcome {
        Ok(normalized) => normalized,
        Err(never) => match never {},
    }
}
