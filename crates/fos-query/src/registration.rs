//! Registration records

use std::cell::Cell;
use std::rc::Rc;

use fos_dom::{AbortController, DomError, Listener, NodeId};

use crate::{Host, IdentityKey, ListenerOptions};

/// One active binding of a listener to a (node, type, options) tuple.
///
/// Immutable once created. Cancelling it stops host delivery but leaves the
/// registry entry in place until `unregister` or `purge_cancelled`. A `once`
/// binding that has fired is spent and no longer blocks its key.
#[derive(Debug)]
pub struct Registration {
    pub(crate) node: NodeId,
    pub(crate) event_type: String,
    pub(crate) key: IdentityKey,
    /// What the host holds: the caller's listener or its delegation wrapper
    pub(crate) listener: Listener,
    /// The listener as the caller supplied it
    pub(crate) source: Listener,
    pub(crate) options: ListenerOptions,
    pub(crate) controller: Option<AbortController>,
    pub(crate) plugin: Option<String>,
    /// Set by the once guard when the listener has run
    pub(crate) spent: Rc<Cell<bool>>,
}

impl Registration {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn source_listener(&self) -> &Listener {
        &self.source
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    pub fn is_delegated(&self) -> bool {
        self.options.selector.is_some()
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// Cancellation handle owned by this registration (`cancel: true`)
    pub fn controller(&self) -> Option<&AbortController> {
        self.controller.as_ref()
    }

    /// Abort the owned handle. Returns false if the registration has none.
    pub fn cancel(&self) -> bool {
        match &self.controller {
            Some(controller) => {
                tracing::debug!(node = %self.node, key = %self.key, "registration cancelled");
                controller.abort(Some("registration cancelled"));
                true
            }
            None => false,
        }
    }

    /// Has the binding's signal fired (owned or caller-supplied)?
    pub fn is_cancelled(&self) -> bool {
        self.options.signal.as_ref().is_some_and(|s| s.is_aborted())
    }

    /// Has a `once` binding already run?
    pub fn is_spent(&self) -> bool {
        self.spent.get()
    }

    /// Options handed to the host. `once` is enforced by the registry's guard
    /// so the host keeps the listener until it is unbound.
    pub(crate) fn host_options(&self) -> ListenerOptions {
        ListenerOptions {
            once: false,
            ..self.options.clone()
        }
    }

    pub(crate) fn bind<H: Host + ?Sized>(&self, host: &H) -> Result<(), DomError> {
        host.add_listener(self.node, &self.event_type, &self.listener, &self.host_options())
    }

    /// Remove the host listener exactly as it was bound
    pub(crate) fn unbind<H: Host + ?Sized>(&self, host: &H) {
        host.remove_listener(self.node, &self.event_type, &self.listener, &self.host_options());
    }
}
