//! Event listeners
//!
//! A listener is either a callback or an object implementing
//! [`EventHandler`]. Identity is pointer identity of the shared value, which
//! is what `remove_event_listener` compares.

use std::fmt;
use std::rc::Rc;

use crate::{AbortSignal, Event, NodeId};

/// Object-style listener (`{ handleEvent(event) }`)
pub trait EventHandler {
    /// Handle an event; `this` is the receiver node
    fn handle_event(&self, this: NodeId, event: &Event);
}

/// Event listener
#[derive(Clone)]
pub enum Listener {
    Callback(Rc<dyn Fn(NodeId, &Event)>),
    Handler(Rc<dyn EventHandler>),
}

impl Listener {
    /// Wrap a closure
    pub fn new(callback: impl Fn(NodeId, &Event) + 'static) -> Self {
        Self::Callback(Rc::new(callback))
    }

    /// Wrap a handler object
    pub fn handler(handler: impl EventHandler + 'static) -> Self {
        Self::Handler(Rc::new(handler))
    }

    /// Call the listener with `this` as receiver
    pub fn invoke(&self, this: NodeId, event: &Event) {
        match self {
            Self::Callback(callback) => callback(this, event),
            Self::Handler(handler) => handler.handle_event(this, event),
        }
    }

    /// Same underlying listener?
    pub fn same(&self, other: &Listener) -> bool {
        match (self, other) {
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            (Self::Handler(a), Self::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<H: EventHandler + 'static> From<Rc<H>> for Listener {
    fn from(handler: Rc<H>) -> Self {
        Self::Handler(handler)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(callback) => write!(f, "Listener::Callback({:p})", Rc::as_ptr(callback)),
            Self::Handler(handler) => write!(f, "Listener::Handler({:p})", Rc::as_ptr(handler)),
        }
    }
}

/// Options accepted by `Dom::add_event_listener`
#[derive(Debug, Clone, Default)]
pub struct AddEventListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
    pub signal: Option<AbortSignal>,
}
