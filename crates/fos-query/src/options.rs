//! Argument normalization
//!
//! The public calls accept loosely shaped arguments (options and listener in
//! either order, string/bool shorthands, one node or many). Everything is
//! turned into a [`Normalized`] value here; the rest of the crate only sees
//! the typed form.

use fos_dom::{AbortSignal, Listener, NodeId};

use crate::{Capabilities, EventError, IdentityKey, Result};

/// Listener options
#[derive(Debug, Clone, Default)]
pub struct ListenerOptions {
    /// Part of the identity key
    pub capture: bool,
    /// Delegation selector; part of the identity key
    pub selector: Option<String>,
    /// Run at most once. A delegated binding is used up only by an event
    /// that found a delegate.
    pub once: bool,
    pub passive: bool,
    /// Ask the registry for an owned cancellation handle
    pub cancel: bool,
    pub signal: Option<AbortSignal>,
}

impl ListenerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    pub fn selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_string());
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    pub fn cancel(mut self, cancel: bool) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Identity key these options produce for `event_type`
    pub fn key(&self, event_type: &str) -> IdentityKey {
        IdentityKey::new(event_type, self.selector.as_deref(), self.capture)
    }
}

/// One loosely typed argument in the options/listener positions
#[derive(Debug, Clone, Default)]
pub enum Arg {
    Listener(Listener),
    /// Shorthand for `{ selector }`
    Selector(String),
    /// Shorthand for `{ capture }`
    Capture(bool),
    Options(ListenerOptions),
    #[default]
    Empty,
}

impl Arg {
    fn is_listener(&self) -> bool {
        matches!(self, Self::Listener(_))
    }

    fn into_listener(self) -> Option<Listener> {
        match self {
            Self::Listener(listener) => Some(listener),
            _ => None,
        }
    }

    fn into_options(self) -> ListenerOptions {
        match self {
            Self::Selector(selector) => ListenerOptions {
                selector: Some(selector),
                ..Default::default()
            },
            Self::Capture(capture) => ListenerOptions {
                capture,
                ..Default::default()
            },
            Self::Options(options) => options,
            Self::Listener(_) | Self::Empty => ListenerOptions::default(),
        }
    }
}

impl From<Listener> for Arg {
    fn from(listener: Listener) -> Self {
        Self::Listener(listener)
    }
}

impl From<&Listener> for Arg {
    fn from(listener: &Listener) -> Self {
        Self::Listener(listener.clone())
    }
}

impl From<&str> for Arg {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Arg {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<bool> for Arg {
    fn from(capture: bool) -> Self {
        Self::Capture(capture)
    }
}

impl From<ListenerOptions> for Arg {
    fn from(options: ListenerOptions) -> Self {
        Self::Options(options)
    }
}

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// A single node or a collection of nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    One(NodeId),
    Many(Vec<NodeId>),
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::One(node)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Many(nodes)
    }
}

impl From<&[NodeId]> for Target {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Many(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeId; N]> for Target {
    fn from(nodes: [NodeId; N]) -> Self {
        Self::Many(nodes.to_vec())
    }
}

/// Fully typed call arguments
#[derive(Debug, Clone)]
pub struct Normalized<L = Listener> {
    pub targets: Vec<NodeId>,
    pub types: Vec<String>,
    pub options: ListenerOptions,
    pub listener: L,
}

/// Validate a target against the host's capabilities
pub(crate) fn normalize_target<C: Capabilities + ?Sized>(caps: &C, target: Target) -> Result<Vec<NodeId>> {
    match target {
        Target::One(node) if caps.is_single_target(node) => Ok(vec![node]),
        Target::Many(nodes) if caps.is_target_container(&nodes) => Ok(nodes),
        _ => Err(EventError::InvalidTarget),
    }
}

/// Split a whitespace-separated type list; blank input yields no types
pub(crate) fn split_types(types: &str) -> Vec<String> {
    types.split_whitespace().map(str::to_string).collect()
}

/// Normalize without requiring a listener (used for removal)
pub(crate) fn normalize_lenient<C: Capabilities + ?Sized>(
    caps: &C,
    target: Target,
    types: &str,
    a: Arg,
    b: Arg,
) -> Result<Normalized<Option<Listener>>> {
    let targets = normalize_target(caps, target)?;
    let (options, listener) = if a.is_listener() { (b, a) } else { (a, b) };

    let mut options = options.into_options();
    options.selector = options.selector.filter(|s| !s.trim().is_empty());

    Ok(Normalized {
        targets,
        types: split_types(types),
        options,
        listener: listener.into_listener(),
    })
}

/// Normalize call arguments.
///
/// `a` and `b` are the options and the listener in either order: if `a` is a
/// listener it is used as such and `b` as options, otherwise the roles swap.
pub fn normalize<C: Capabilities + ?Sized>(
    caps: &C,
    target: impl Into<Target>,
    types: &str,
    a: impl Into<Arg>,
    b: impl Into<Arg>,
) -> Result<Normalized> {
    let Normalized {
        targets,
        types,
        options,
        listener,
    } = normalize_lenient(caps, target.into(), types, a.into(), b.into())?;

    Ok(Normalized {
        targets,
        types,
        options,
        listener: listener.ok_or(EventError::InvalidListener)?,
    })
}
