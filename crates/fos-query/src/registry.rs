//! Event registry
//!
//! Owns the side table from node to that node's registrations. Nodes are
//! referenced by `NodeId` only, so the registry never keeps a node alive.
//! All state sits behind `RefCell`s and no borrow is held while the host can
//! run listener code, so listeners may call back into the registry.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use fos_dom::{AbortController, Event, EventInit, Listener, NodeId};

use crate::delegate::{delegating_listener, once_listener};
use crate::options::{normalize_lenient, normalize_target};
use crate::{
    Arg, BatchPolicy, EventError, Host, IdentityKey, ListenerOptions, Normalized, Registration,
    RegistryConfig, Result, Target, normalize, resolve_event_class,
};

type NodeTable = HashMap<IdentityKey, Rc<Registration>>;

/// Options for `trigger`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerOptions {
    pub init: EventInit,
    /// Build a fresh event per target instead of sharing one
    pub new_event_for_each: bool,
}

impl TriggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.init.bubbles = bubbles;
        self
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.init.cancelable = cancelable;
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.init.detail = Some(detail);
        self
    }

    pub fn new_event_for_each(mut self, enabled: bool) -> Self {
        self.new_event_for_each = enabled;
        self
    }
}

impl From<EventInit> for TriggerOptions {
    fn from(init: EventInit) -> Self {
        Self {
            init,
            new_event_for_each: false,
        }
    }
}

/// What `trigger` dispatches
#[derive(Debug, Clone)]
pub enum EventSource {
    /// Build an event of this type
    Type(String),
    /// Dispatch an already built event
    Event(Rc<Event>),
}

impl From<&str> for EventSource {
    fn from(event_type: &str) -> Self {
        Self::Type(event_type.to_string())
    }
}

impl From<String> for EventSource {
    fn from(event_type: String) -> Self {
        Self::Type(event_type)
    }
}

impl From<Event> for EventSource {
    fn from(event: Event) -> Self {
        Self::Event(Rc::new(event))
    }
}

impl From<Rc<Event>> for EventSource {
    fn from(event: Rc<Event>) -> Self {
        Self::Event(event)
    }
}

impl From<&Rc<Event>> for EventSource {
    fn from(event: &Rc<Event>) -> Self {
        Self::Event(event.clone())
    }
}

/// Listener registry over a host
pub struct EventRegistry<H: Host + 'static> {
    host: Rc<H>,
    config: RegistryConfig,
    tables: RefCell<HashMap<NodeId, NodeTable>>,
    audit: RefCell<Vec<Rc<Registration>>>,
}

impl<H: Host + 'static> EventRegistry<H> {
    pub fn new(host: Rc<H>) -> Self {
        Self::with_config(host, RegistryConfig::default())
    }

    pub fn with_config(host: Rc<H>, config: RegistryConfig) -> Self {
        Self {
            host,
            config,
            tables: RefCell::new(HashMap::new()),
            audit: RefCell::new(Vec::new()),
        }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Normalize call arguments against this registry's host
    pub fn normalize(
        &self,
        target: impl Into<Target>,
        types: &str,
        a: impl Into<Arg>,
        b: impl Into<Arg>,
    ) -> Result<Normalized> {
        normalize(&*self.host, target, types, a, b)
    }

    /// Bind a listener for every (node, type) pair.
    ///
    /// `a` and `b` are the options and the listener, in either order. A
    /// binding whose identity key is already taken on its node fails with
    /// `DuplicateRegistration`; see [`BatchPolicy`] for what the rest of the
    /// call does in that case.
    pub fn register(
        &self,
        target: impl Into<Target>,
        types: &str,
        a: impl Into<Arg>,
        b: impl Into<Arg>,
    ) -> Result<&Self> {
        let call = self.normalize(target, types, a, b)?;
        let atomic = self.config.batch_policy == BatchPolicy::Atomic;
        if atomic {
            self.check_batch(&call)?;
        }

        let mut bound = Vec::new();
        for &node in &call.targets {
            for event_type in &call.types {
                match self.bind(node, event_type, &call.options, &call.listener) {
                    Ok(registration) => bound.push(registration),
                    Err(err) => {
                        if atomic {
                            self.roll_back(&bound);
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(self)
    }

    /// Reject the call up front if any of its bindings would collide, with
    /// a live entry in the table or with another binding of the same call
    fn check_batch(&self, call: &Normalized) -> Result<()> {
        let tables = self.tables.borrow();
        let mut seen = HashSet::new();
        for &node in &call.targets {
            for event_type in &call.types {
                let key = call.options.key(event_type);
                let taken = tables
                    .get(&node)
                    .and_then(|table| table.get(&key))
                    .is_some_and(|existing| !existing.is_spent());
                if taken || !seen.insert((node, key.clone())) {
                    tracing::warn!(%node, %key, "duplicate registration rejected");
                    return Err(EventError::DuplicateRegistration { node, key });
                }
            }
        }
        Ok(())
    }

    /// Undo the bindings made so far by a failed call
    fn roll_back(&self, bound: &[Rc<Registration>]) {
        for registration in bound {
            self.take(registration.node, &registration.key);
            registration.unbind(&*self.host);
        }
        self.audit
            .borrow_mut()
            .retain(|r| !bound.iter().any(|b| Rc::ptr_eq(r, b)));
        if !bound.is_empty() {
            tracing::warn!(count = bound.len(), "rolled back partial registration");
        }
    }

    fn bind(
        &self,
        node: NodeId,
        event_type: &str,
        options: &ListenerOptions,
        listener: &Listener,
    ) -> Result<Rc<Registration>> {
        let key = options.key(event_type);
        if let Some(existing) = self.lookup_key(node, &key) {
            if !existing.is_spent() {
                tracing::warn!(%node, %key, "duplicate registration rejected");
                return Err(EventError::DuplicateRegistration { node, key });
            }
            self.take(node, &key);
            existing.unbind(&*self.host);
            tracing::debug!(%node, %key, "replacing spent once binding");
        }

        let spent = Rc::new(Cell::new(false));
        let guarded = if options.once {
            once_listener(listener.clone(), spent.clone())
        } else {
            listener.clone()
        };
        let effective = match options.selector.as_deref() {
            Some(selector) => delegating_listener(&self.host, node, selector, guarded),
            None => guarded,
        };

        let mut options = options.clone();
        let controller = if options.cancel && options.signal.is_none() {
            let controller = AbortController::new();
            options.signal = Some(controller.signal().clone());
            Some(controller)
        } else {
            None
        };

        let registration = Rc::new(Registration {
            node,
            event_type: event_type.to_string(),
            key: key.clone(),
            listener: effective,
            source: listener.clone(),
            options,
            controller,
            plugin: self.config.plugin.clone(),
            spent,
        });
        registration.bind(&*self.host)?;
        tracing::debug!(%node, %key, delegated = registration.is_delegated(), "bound");

        self.tables
            .borrow_mut()
            .entry(node)
            .or_default()
            .insert(key, registration.clone());
        if self.config.audit_log {
            self.audit.borrow_mut().push(registration.clone());
        }
        Ok(registration)
    }

    /// Remove bindings by identity key.
    ///
    /// The key is recomputed from the options given here, so they must carry
    /// the same selector and capture flag used at registration. A miss is not
    /// an error; if a listener was supplied it is still passed to the host's
    /// native removal, which covers listeners bound outside this registry.
    pub fn unregister(
        &self,
        target: impl Into<Target>,
        types: &str,
        a: impl Into<Arg>,
        b: impl Into<Arg>,
    ) -> Result<&Self> {
        let call = normalize_lenient(&*self.host, target.into(), types, a.into(), b.into())?;

        for &node in &call.targets {
            for event_type in &call.types {
                let key = call.options.key(event_type);
                if let Some(registration) = self.take(node, &key) {
                    registration.unbind(&*self.host);
                    tracing::debug!(%node, %key, "unbound");
                    continue;
                }

                if let Some(listener) = call.listener.as_ref().filter(|_| self.config.native_removal_fallback) {
                    tracing::debug!(%node, %key, "not registered here, trying native removal");
                    self.host.remove_listener(node, event_type, listener, &call.options);
                }
            }
        }
        Ok(self)
    }

    fn take(&self, node: NodeId, key: &IdentityKey) -> Option<Rc<Registration>> {
        let mut tables = self.tables.borrow_mut();
        let table = tables.get_mut(&node)?;
        let registration = table.remove(key);
        if table.is_empty() {
            tables.remove(&node);
        }
        registration
    }

    /// Build an event object for `event_type` through the host's constructor
    /// for the resolved interface
    pub fn build_event(&self, event_type: &str, init: &EventInit) -> Result<Event> {
        let class = resolve_event_class(event_type, init.detail.is_some());
        let factory = self
            .host
            .event_constructor(class)
            .ok_or(EventError::UnknownEventClass(class))?;
        Ok(factory(event_type, init))
    }

    /// Dispatch an event on every target, in order.
    ///
    /// A type name builds one event shared by all targets, or one per target
    /// with `new_event_for_each`. A prebuilt event is dispatched as is.
    pub fn trigger(
        &self,
        target: impl Into<Target>,
        source: impl Into<EventSource>,
        options: &TriggerOptions,
    ) -> Result<&Self> {
        let targets = normalize_target(&*self.host, target.into())?;

        match source.into() {
            EventSource::Type(event_type) => {
                if event_type.is_empty() || event_type.contains(char::is_whitespace) {
                    return Err(EventError::InvalidEvent(format!(
                        "'{event_type}' is not an event type"
                    )));
                }

                let shared = if options.new_event_for_each {
                    None
                } else {
                    Some(Rc::new(self.build_event(&event_type, &options.init)?))
                };
                for node in targets {
                    let event = match &shared {
                        Some(event) => event.clone(),
                        None => Rc::new(self.build_event(&event_type, &options.init)?),
                    };
                    self.host.dispatch(node, &event)?;
                }
            }
            EventSource::Event(event) => {
                if event.event_type().is_empty() {
                    return Err(EventError::InvalidEvent("event has no type".to_string()));
                }
                if event.is_dispatching() {
                    return Err(EventError::InvalidEvent(format!(
                        "'{}' event is already being dispatched",
                        event.event_type()
                    )));
                }
                for node in targets {
                    self.host.dispatch(node, &event)?;
                }
            }
        }
        Ok(self)
    }

    // === Inspection ===

    pub fn lookup(
        &self,
        node: NodeId,
        event_type: &str,
        selector: Option<&str>,
        capture: bool,
    ) -> Option<Rc<Registration>> {
        self.lookup_key(node, &IdentityKey::new(event_type, selector, capture))
    }

    pub fn lookup_key(&self, node: NodeId, key: &IdentityKey) -> Option<Rc<Registration>> {
        self.tables.borrow().get(&node)?.get(key).cloned()
    }

    /// Live registrations on `node`, ordered by key
    pub fn registrations_for(&self, node: NodeId) -> Vec<Rc<Registration>> {
        let mut out: Vec<_> = self
            .tables
            .borrow()
            .get(&node)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Every registration this registry has made, in order (empty when the
    /// audit log is disabled)
    pub fn registrations(&self) -> Vec<Rc<Registration>> {
        self.audit.borrow().clone()
    }

    /// Number of live table entries across all nodes
    pub fn len(&self) -> usize {
        self.tables.borrow().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.borrow().is_empty()
    }

    /// Drop entries whose cancellation signal has fired, and `once` entries
    /// that have already run. Returns how many.
    pub fn purge_cancelled(&self) -> usize {
        let purged: Vec<Rc<Registration>> = {
            let mut tables = self.tables.borrow_mut();
            let mut purged = Vec::new();
            tables.retain(|_, table| {
                table.retain(|_, registration| {
                    if registration.is_cancelled() || registration.is_spent() {
                        purged.push(registration.clone());
                        false
                    } else {
                        true
                    }
                });
                !table.is_empty()
            });
            purged
        };

        for registration in &purged {
            registration.unbind(&*self.host);
        }
        if !purged.is_empty() {
            tracing::debug!(count = purged.len(), "purged cancelled registrations");
        }
        purged.len()
    }

    /// Unbind everything on `node` and drop its table, for nodes being
    /// discarded. Returns how many registrations were removed.
    pub fn forget_node(&self, node: NodeId) -> usize {
        let Some(table) = self.tables.borrow_mut().remove(&node) else {
            return 0;
        };
        for registration in table.values() {
            registration.unbind(&*self.host);
        }
        tracing::debug!(%node, count = table.len(), "forgot node");
        table.len()
    }
}

impl<H: Host + 'static> fmt::Debug for EventRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("config", &self.config)
            .field("nodes", &self.tables.borrow().len())
            .field("bindings", &self.len())
            .field("audit", &self.audit.borrow().len())
            .finish()
    }
}
