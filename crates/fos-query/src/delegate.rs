//! Listener adapters
//!
//! Delegation wraps a listener bound on `origin` so it only runs when the
//! event's target, or an ancestor of it below `origin`, matches a selector.
//! The nearest match becomes the listener's receiver.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use fos_dom::{Listener, NodeId};

use crate::Host;

/// Nearest node from `target` upwards that matches `selector`, stopping
/// before `origin`. `origin` itself never matches.
pub(crate) fn find_delegate<H: Host + ?Sized>(
    host: &H,
    origin: NodeId,
    target: NodeId,
    selector: &str,
) -> Option<NodeId> {
    let mut current = Some(target);
    while let Some(node) = current {
        if node == origin {
            return None;
        }
        if host.is_element(node) && host.matches(node, selector) {
            return Some(node);
        }
        current = host.parent_node(node);
    }
    None
}

/// Build the listener actually handed to the host for a delegated binding
pub(crate) fn delegating_listener<H: Host + 'static>(
    host: &Rc<H>,
    origin: NodeId,
    selector: &str,
    listener: Listener,
) -> Listener {
    let host: Weak<H> = Rc::downgrade(host);
    let selector = selector.to_string();

    Listener::new(move |_current, event| {
        let (Some(host), Some(target)) = (host.upgrade(), event.target()) else {
            return;
        };
        let Some(delegate) = find_delegate(&*host, origin, target, &selector) else {
            tracing::trace!(%origin, %target, selector = %selector, "no delegate on path");
            return;
        };

        tracing::trace!(%origin, %delegate, selector = %selector, "delegating");
        event.set_capture_target(origin);
        listener.invoke(delegate, event)
    })
}

/// Run `listener` on the first call only, then mark `spent`. Placed inside
/// the delegation adapter, so a call that found no delegate does not count.
pub(crate) fn once_listener(listener: Listener, spent: Rc<Cell<bool>>) -> Listener {
    Listener::new(move |this, event| {
        if spent.replace(true) {
            return;
        }
        listener.invoke(this, event)
    })
}
