//! Priority-ordered, reentrant publish/subscribe.
//!
//! # Overview
//!
//! A [`Dispatcher`] keeps, per event name, a list of callbacks sorted by
//! priority. [`Dispatcher::trigger`] calls them synchronously, followed by
//! every callback registered on the [`ALL_EVENTS`] channel. A dispatcher can
//! also listen to other dispatchers ([`Dispatcher::listen_to`]) and later drop
//! all of those subscriptions in one call ([`Dispatcher::stop_listening`]).
//!
//! # Modules
//!
//! - [`dispatcher`] — [`Dispatcher`]: registration, removal, delivery and
//!   inverse subscriptions.
//! - [`names`] — [`Names`] and [`HandlerMap`]: single, space-separated and
//!   map-form event names.
//! - [`callback`] — [`Callback`] handles and the [`Invocation`] they receive.
//! - [`context`] — [`Context`], the identity a registration is bound to.
//! - [`error`] — [`HandlerError`].

pub mod callback;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod id;
pub mod names;

pub use callback::{Callback, HandlerFn, Invocation};
pub use context::Context;
pub use dispatcher::{Dispatcher, WeakDispatcher};
pub use error::{HandlerError, Result};
pub use names::{HandlerMap, Names, ALL_EVENTS};
