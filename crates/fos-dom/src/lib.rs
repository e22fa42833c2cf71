//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree with the pieces an event layer needs from its host:
//! - Node tree with parent/sibling links
//! - Selector matching (`matches`, `query_selector`)
//! - Event objects and capture → target → bubble dispatch
//! - `AbortController` / `AbortSignal` for listener cancellation

mod abort;
mod dom;
mod event;
mod listener;
mod node;
mod selector;
mod tree;

pub use abort::{AbortController, AbortSignal};
pub use dom::{Dom, EventFactory};
pub use event::{Event, EventClass, EventInit, EventPhase};
pub use listener::{AddEventListenerOptions, EventHandler, Listener};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use selector::{SelectorList, parse_selector_list};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID refers to a node slot at all
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
