//! Host environment boundary
//!
//! The registry never walks or matches the tree itself; it asks the host.

use std::rc::Rc;

use fos_dom::{AddEventListenerOptions, Dom, DomError, Event, EventClass, EventFactory, Listener, NodeId};

use crate::ListenerOptions;

/// Node type tests used to validate targets
pub trait Capabilities {
    /// Can `node` be addressed as a single event target?
    fn is_single_target(&self, node: NodeId) -> bool;

    /// Is `nodes` a homogeneous collection of targets?
    fn is_target_container(&self, nodes: &[NodeId]) -> bool {
        nodes.iter().all(|&node| self.is_single_target(node))
    }

    fn is_element(&self, node: NodeId) -> bool;
}

/// Native DOM primitives the registry forwards to
pub trait Host: Capabilities {
    fn add_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: &Listener,
        options: &ListenerOptions,
    ) -> Result<(), DomError>;

    /// Never fails; a miss is ignored
    fn remove_listener(&self, node: NodeId, event_type: &str, listener: &Listener, options: &ListenerOptions);

    /// Returns false if the event's default was prevented
    fn dispatch(&self, node: NodeId, event: &Rc<Event>) -> Result<bool, DomError>;

    fn matches(&self, element: NodeId, selector: &str) -> bool;

    fn parent_node(&self, node: NodeId) -> Option<NodeId>;

    fn event_constructor(&self, class: EventClass) -> Option<EventFactory>;
}

impl Capabilities for Dom {
    fn is_single_target(&self, node: NodeId) -> bool {
        self.contains(node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        Dom::is_element(self, node)
    }
}

impl Host for Dom {
    fn add_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: &Listener,
        options: &ListenerOptions,
    ) -> Result<(), DomError> {
        self.add_event_listener(
            node,
            event_type,
            listener.clone(),
            AddEventListenerOptions {
                capture: options.capture,
                once: options.once,
                passive: options.passive,
                signal: options.signal.clone(),
            },
        )
    }

    fn remove_listener(&self, node: NodeId, event_type: &str, listener: &Listener, options: &ListenerOptions) {
        self.remove_event_listener(node, event_type, listener, options.capture);
    }

    fn dispatch(&self, node: NodeId, event: &Rc<Event>) -> Result<bool, DomError> {
        self.dispatch_event(node, event)
    }

    fn matches(&self, element: NodeId, selector: &str) -> bool {
        match Dom::matches(self, element, selector) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(%element, selector, "selector match failed: {err}");
                false
            }
        }
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn event_constructor(&self, class: EventClass) -> Option<EventFactory> {
        Dom::event_constructor(self, class)
    }
}
