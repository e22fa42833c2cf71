//! AbortController and AbortSignal
//!
//! Listener cancellation mechanism.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// AbortController - cancellation controller
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

/// AbortSignal - shared cancellation state
#[derive(Clone, Default)]
pub struct AbortSignal {
    inner: Rc<RefCell<AbortSignalInner>>,
}

#[derive(Default)]
struct AbortSignalInner {
    aborted: bool,
    reason: Option<String>,
    callbacks: Vec<Box<dyn FnOnce()>>,
}

impl AbortController {
    /// Create a new abort controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the associated signal
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Abort with optional reason
    pub fn abort(&self, reason: Option<&str>) {
        self.signal.abort(reason);
    }
}

impl AbortSignal {
    /// Create an already-aborted signal
    pub fn aborted(reason: Option<&str>) -> Self {
        let signal = Self::default();
        signal.abort(reason);
        signal
    }

    /// Check if aborted
    pub fn is_aborted(&self) -> bool {
        self.inner.borrow().aborted
    }

    /// Get abort reason
    pub fn reason(&self) -> Option<String> {
        self.inner.borrow().reason.clone()
    }

    /// Run `callback` once when the signal aborts; immediately if it already has
    pub fn on_abort(&self, callback: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.aborted {
            drop(inner);
            callback();
        } else {
            inner.callbacks.push(Box::new(callback));
        }
    }

    /// Two handles to the same signal?
    pub fn same(&self, other: &AbortSignal) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn abort(&self, reason: Option<&str>) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.aborted {
                return;
            }
            inner.aborted = true;
            inner.reason = Some(reason.unwrap_or("AbortError").to_string());
            std::mem::take(&mut inner.callbacks)
        };
        tracing::debug!(callbacks = callbacks.len(), "abort signal fired");
        for callback in callbacks {
            callback();
        }
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AbortSignal")
            .field("aborted", &inner.aborted)
            .field("reason", &inner.reason)
            .field("callbacks", &inner.callbacks.len())
            .finish()
    }
}
