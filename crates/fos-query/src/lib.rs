//! fOS Query - event binding convenience layer
//!
//! Binds listeners on nodes and node collections, with:
//! - Delegation: `register(root, "click", ".item", listener)` fires for the
//!   nearest `.item` between the event target and `root`
//! - Deterministic bookkeeping keyed by type + selector + capture flag
//! - Cancellation through an owned `AbortController`
//! - Event construction from a static type → interface table
//!
//! Matching, traversal and dispatch are left to the [`Host`]; `fos_dom::Dom`
//! implements it out of the box.

mod class_table;
mod config;
mod delegate;
mod host;
mod key;
mod options;
mod registration;
mod registry;

pub use class_table::resolve_event_class;
pub use config::{BatchPolicy, RegistryConfig};
pub use host::{Capabilities, Host};
pub use key::IdentityKey;
pub use options::{Arg, ListenerOptions, Normalized, Target, normalize};
pub use registration::Registration;
pub use registry::{EventRegistry, EventSource, TriggerOptions};

pub use fos_dom::{AbortController, AbortSignal, Event, EventClass, EventHandler, EventInit, Listener, NodeId};

use fos_dom::DomError;

/// Registry error
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Invalid target: expected a node or a collection of nodes")]
    InvalidTarget,

    #[error("Invalid listener: neither argument is a listener")]
    InvalidListener,

    #[error("Duplicate registration of '{key}' on node {node}")]
    DuplicateRegistration { node: NodeId, key: IdentityKey },

    #[error("Unknown event class: {0}")]
    UnknownEventClass(EventClass),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Host error: {0}")]
    Host(#[from] DomError),
}

pub type Result<T> = std::result::Result<T, EventError>;
