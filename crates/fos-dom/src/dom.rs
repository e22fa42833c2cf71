//! Dom - the event host
//!
//! Owns the tree, per-node listener lists and the event constructor table.
//! Every method takes `&self` so listeners can reach back into the DOM while
//! an event is being dispatched; no `RefCell` borrow is held across a
//! listener call.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::selector::{SelectorList, parse_selector_list};
use crate::{
    AddEventListenerOptions, DomError, DomTree, Event, EventClass, EventInit, EventPhase,
    Listener, NodeId,
};

/// Constructor for one event interface
pub type EventFactory = Rc<dyn Fn(&str, &EventInit) -> Event>;

#[derive(Clone)]
struct ListenerEntry {
    event_type: String,
    listener: Listener,
    capture: bool,
    once: bool,
    passive: bool,
    /// Set on removal or abort; swept after each dispatch step
    removed: Rc<Cell<bool>>,
}

/// In-memory DOM host
pub struct Dom {
    tree: RefCell<DomTree>,
    listeners: RefCell<HashMap<NodeId, Vec<ListenerEntry>>>,
    constructors: RefCell<HashMap<EventClass, EventFactory>>,
    selector_cache: RefCell<HashMap<String, Rc<SelectorList>>>,
}

impl Dom {
    /// Create a DOM with an empty document and every event class defined
    pub fn new() -> Self {
        let dom = Self {
            tree: RefCell::new(DomTree::new()),
            listeners: RefCell::new(HashMap::new()),
            constructors: RefCell::new(HashMap::new()),
            selector_cache: RefCell::new(HashMap::new()),
        };
        for class in EventClass::ALL {
            dom.define_event_class(
                class,
                Rc::new(move |ty: &str, init: &EventInit| Event::with_class(class, ty, init)),
            );
        }
        dom
    }

    // === Tree ===

    /// Document node
    pub fn document(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text(&self, content: &str) -> NodeId {
        self.tree.borrow_mut().create_text(content)
    }

    /// Create a detached comment node
    pub fn create_comment(&self, content: &str) -> NodeId {
        self.tree.borrow_mut().create_comment(content)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.borrow_mut().append_child(parent, child)
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let node = self.create_element(tag);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Detach a node from its parent
    pub fn remove(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.borrow().contains(node)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.tree.borrow().is_element(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().children(node).collect()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?.as_element().map(|e| e.tag.clone())
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?.as_text().map(str::to_string)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        tree.get(node)?
            .as_element()?
            .get_attr(name)
            .map(str::to_string)
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let elem = tree
            .get_mut(node)
            .and_then(|n| n.as_element_mut())
            .ok_or(DomError::UnknownNode(node))?;
        elem.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> bool {
        let mut tree = self.tree.borrow_mut();
        tree.get_mut(node)
            .and_then(|n| n.as_element_mut())
            .is_some_and(|e| e.remove_attr(name))
    }

    /// Get element by ID (attached elements only)
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(tree.root()).into_iter().find(|&node| {
            tree.get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|e| e.id.as_deref() == Some(id))
        })
    }

    // === Selectors ===

    fn selector(&self, selector: &str) -> Result<Rc<SelectorList>, DomError> {
        if let Some(parsed) = self.selector_cache.borrow().get(selector) {
            return Ok(parsed.clone());
        }
        let parsed = Rc::new(parse_selector_list(selector)?);
        self.selector_cache
            .borrow_mut()
            .insert(selector.to_string(), parsed.clone());
        Ok(parsed)
    }

    /// `Element.matches`
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        let parsed = self.selector(selector)?;
        Ok(parsed.matches(&self.tree.borrow(), node))
    }

    /// `Element.closest`: nearest inclusive ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let parsed = self.selector(selector)?;
        let tree = self.tree.borrow();
        Ok(std::iter::once(node)
            .chain(tree.ancestors(node))
            .find(|&n| parsed.matches(&tree, n)))
    }

    /// First descendant of `root` matching `selector`, in document order
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(root, selector)?.into_iter().next())
    }

    /// All descendants of `root` matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let parsed = self.selector(selector)?;
        let tree = self.tree.borrow();
        Ok(tree
            .descendants(root)
            .into_iter()
            .filter(|&n| parsed.matches(&tree, n))
            .collect())
    }

    // === Event constructors ===

    /// Install (or replace) the constructor for an event class
    pub fn define_event_class(&self, class: EventClass, factory: EventFactory) {
        self.constructors.borrow_mut().insert(class, factory);
    }

    /// Remove an event class, as on platforms without e.g. `TouchEvent`
    pub fn undefine_event_class(&self, class: EventClass) -> bool {
        self.constructors.borrow_mut().remove(&class).is_some()
    }

    pub fn event_constructor(&self, class: EventClass) -> Option<EventFactory> {
        self.constructors.borrow().get(&class).cloned()
    }

    // === Listeners ===

    /// `EventTarget.addEventListener`
    ///
    /// A listener already present with the same type and capture flag is not
    /// added twice. A listener whose signal has already aborted is not added.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        listener: Listener,
        options: AddEventListenerOptions,
    ) -> Result<(), DomError> {
        if !self.contains(node) {
            return Err(DomError::UnknownNode(node));
        }
        if options.signal.as_ref().is_some_and(|s| s.is_aborted()) {
            return Ok(());
        }

        let mut listeners = self.listeners.borrow_mut();
        let entries = listeners.entry(node).or_default();
        if entries.iter().any(|e| {
            !e.removed.get()
                && e.event_type == event_type
                && e.capture == options.capture
                && e.listener.same(&listener)
        }) {
            return Ok(());
        }

        let removed = Rc::new(Cell::new(false));
        if let Some(signal) = &options.signal {
            let flag = removed.clone();
            signal.on_abort(move || flag.set(true));
        }
        entries.push(ListenerEntry {
            event_type: event_type.to_string(),
            listener,
            capture: options.capture,
            once: options.once,
            passive: options.passive,
            removed,
        });
        tracing::trace!(%node, event_type, capture = options.capture, "listener added");
        Ok(())
    }

    /// `EventTarget.removeEventListener`; a miss is silently ignored
    pub fn remove_event_listener(&self, node: NodeId, event_type: &str, listener: &Listener, capture: bool) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(&node) else {
            return;
        };
        if let Some(pos) = entries.iter().position(|e| {
            !e.removed.get()
                && e.event_type == event_type
                && e.capture == capture
                && e.listener.same(listener)
        }) {
            entries.remove(pos).removed.set(true);
            tracing::trace!(%node, event_type, capture, "listener removed");
        }
        if entries.is_empty() {
            listeners.remove(&node);
        }
    }

    /// Live listeners for a node and type
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.listeners.borrow().get(&node).map_or(0, |entries| {
            entries
                .iter()
                .filter(|e| !e.removed.get() && e.event_type == event_type)
                .count()
        })
    }

    // === Dispatch ===

    /// `EventTarget.dispatchEvent`: capture → target → bubble.
    ///
    /// Returns false if a listener called `prevent_default`.
    pub fn dispatch_event(&self, target: NodeId, event: &Rc<Event>) -> Result<bool, DomError> {
        if !self.contains(target) {
            return Err(DomError::UnknownNode(target));
        }
        if event.is_dispatching() {
            return Err(DomError::InvalidState(format!(
                "'{}' event is already being dispatched",
                event.event_type()
            )));
        }

        let path: Vec<NodeId> = self.tree.borrow().ancestors(target).collect();
        tracing::debug!(%target, event_type = event.event_type(), depth = path.len(), "dispatching");

        event.begin_dispatch(target);
        for &node in path.iter().rev() {
            self.invoke(node, event, EventPhase::Capturing, true);
        }
        self.invoke(target, event, EventPhase::AtTarget, true);
        self.invoke(target, event, EventPhase::AtTarget, false);
        if event.bubbles() {
            for &node in &path {
                self.invoke(node, event, EventPhase::Bubbling, false);
            }
        }
        event.end_dispatch();

        Ok(!event.default_prevented())
    }

    fn invoke(&self, node: NodeId, event: &Event, phase: EventPhase, capture: bool) {
        if event.propagation_stopped() {
            return;
        }

        let snapshot: Vec<ListenerEntry> = match self.listeners.borrow().get(&node) {
            Some(entries) => entries
                .iter()
                .filter(|e| e.capture == capture && e.event_type == event.event_type())
                .cloned()
                .collect(),
            None => return,
        };
        if snapshot.is_empty() {
            return;
        }

        event.enter(node, phase);
        for entry in snapshot {
            if entry.removed.get() {
                continue;
            }
            if entry.once {
                entry.removed.set(true);
            }
            event.set_in_passive_listener(entry.passive);
            entry.listener.invoke(node, event);
            event.set_in_passive_listener(false);
            if event.immediate_propagation_stopped() {
                break;
            }
        }
        self.sweep(node);
    }

    fn sweep(&self, node: NodeId) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(entries) = listeners.get_mut(&node) {
            entries.retain(|e| !e.removed.get());
            if entries.is_empty() {
                listeners.remove(&node);
            }
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dom")
            .field("nodes", &self.tree.borrow().len())
            .field("listening_nodes", &self.listeners.borrow().len())
            .field("event_classes", &self.constructors.borrow().len())
            .finish()
    }
}
