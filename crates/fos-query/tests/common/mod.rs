//! Shared fixtures for fos-query integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::{Dom, DomError, EventFactory};
use fos_query::{Capabilities, Event, EventClass, Host, Listener, ListenerOptions, NodeId};

/// A host call as seen by `RecordingHost`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add { node: NodeId, event_type: String, capture: bool },
    Remove { node: NodeId, event_type: String, capture: bool },
    Dispatch { node: NodeId, event_type: String },
}

/// `Dom` host that records every add/remove/dispatch it forwards
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub dom: Dom,
    calls: RefCell<Vec<Call>>,
    /// Every dispatched event, kept alive so identities can be compared
    events: RefCell<Vec<Rc<Event>>>,
    /// `add_listener` fails for this node
    rejected: RefCell<Option<NodeId>>,
}

impl RecordingHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Make every later `add_listener` on `node` fail
    pub fn reject(&self, node: NodeId) {
        *self.rejected.borrow_mut() = Some(node);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn removals(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Remove { .. }))
            .cloned()
            .collect()
    }

    /// Dispatched events, in order
    pub fn dispatched_events(&self) -> Vec<Rc<Event>> {
        self.events.borrow().clone()
    }
}

impl Capabilities for RecordingHost {
    fn is_single_target(&self, node: NodeId) -> bool {
        self.dom.is_single_target(node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        Capabilities::is_element(&self.dom, node)
    }
}

impl Host for RecordingHost {
    fn add_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: &Listener,
        options: &ListenerOptions,
    ) -> Result<(), DomError> {
        if *self.rejected.borrow() == Some(node) {
            return Err(DomError::InvalidState(format!("{node} rejects listeners")));
        }
        self.calls.borrow_mut().push(Call::Add {
            node,
            event_type: event_type.to_string(),
            capture: options.capture,
        });
        self.dom.add_listener(node, event_type, listener, options)
    }

    fn remove_listener(&self, node: NodeId, event_type: &str, listener: &Listener, options: &ListenerOptions) {
        self.calls.borrow_mut().push(Call::Remove {
            node,
            event_type: event_type.to_string(),
            capture: options.capture,
        });
        self.dom.remove_listener(node, event_type, listener, options);
    }

    fn dispatch(&self, node: NodeId, event: &Rc<Event>) -> Result<bool, DomError> {
        self.calls.borrow_mut().push(Call::Dispatch {
            node,
            event_type: event.event_type().to_string(),
        });
        self.events.borrow_mut().push(event.clone());
        self.dom.dispatch(node, event)
    }

    fn matches(&self, element: NodeId, selector: &str) -> bool {
        Host::matches(&self.dom, element, selector)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.dom.parent_node(node)
    }

    fn event_constructor(&self, class: EventClass) -> Option<EventFactory> {
        Host::event_constructor(&self.dom, class)
    }
}

/// Listener that appends `label` and its receiver to `log`
pub fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> Listener {
    let log = log.clone();
    Listener::new(move |this, _event| log.borrow_mut().push(format!("{label}@{this}")))
}

pub fn counter(hits: &Rc<RefCell<u32>>) -> Listener {
    let hits = hits.clone();
    Listener::new(move |_, _| *hits.borrow_mut() += 1)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
