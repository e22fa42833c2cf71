//! DOM Events
//!
//! Event objects shared between dispatch sites. Dispatch state lives in
//! `Cell`s so one `Rc<Event>` can be observed by every listener it reaches.

use std::cell::Cell;
use std::fmt;

use crate::NodeId;

/// Event interface an event object was constructed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    Event,
    CustomEvent,
    UIEvent,
    MouseEvent,
    PointerEvent,
    WheelEvent,
    DragEvent,
    KeyboardEvent,
    InputEvent,
    CompositionEvent,
    FocusEvent,
    TouchEvent,
    ClipboardEvent,
    AnimationEvent,
    TransitionEvent,
    SubmitEvent,
}

impl EventClass {
    /// Every class, in declaration order
    pub const ALL: [EventClass; 16] = [
        Self::Event,
        Self::CustomEvent,
        Self::UIEvent,
        Self::MouseEvent,
        Self::PointerEvent,
        Self::WheelEvent,
        Self::DragEvent,
        Self::KeyboardEvent,
        Self::InputEvent,
        Self::CompositionEvent,
        Self::FocusEvent,
        Self::TouchEvent,
        Self::ClipboardEvent,
        Self::AnimationEvent,
        Self::TransitionEvent,
        Self::SubmitEvent,
    ];

    /// Interface name as exposed to scripts
    pub fn name(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::CustomEvent => "CustomEvent",
            Self::UIEvent => "UIEvent",
            Self::MouseEvent => "MouseEvent",
            Self::PointerEvent => "PointerEvent",
            Self::WheelEvent => "WheelEvent",
            Self::DragEvent => "DragEvent",
            Self::KeyboardEvent => "KeyboardEvent",
            Self::InputEvent => "InputEvent",
            Self::CompositionEvent => "CompositionEvent",
            Self::FocusEvent => "FocusEvent",
            Self::TouchEvent => "TouchEvent",
            Self::ClipboardEvent => "ClipboardEvent",
            Self::AnimationEvent => "AnimationEvent",
            Self::TransitionEvent => "TransitionEvent",
            Self::SubmitEvent => "SubmitEvent",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Event construction options
#[derive(Debug, Clone, PartialEq)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
    /// Payload carried by `CustomEvent`
    pub detail: Option<serde_json::Value>,
}

impl Default for EventInit {
    fn default() -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            composed: false,
            detail: None,
        }
    }
}

impl EventInit {
    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// DOM event
#[derive(Debug)]
pub struct Event {
    event_type: String,
    class: EventClass,
    bubbles: bool,
    cancelable: bool,
    composed: bool,
    detail: Option<serde_json::Value>,

    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
    /// Node a delegated listener was bound on
    capture_target: Cell<Option<NodeId>>,
    phase: Cell<EventPhase>,
    dispatching: Cell<bool>,
    in_passive_listener: Cell<bool>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create a plain `Event`
    pub fn new(event_type: &str, init: &EventInit) -> Self {
        Self::with_class(EventClass::Event, event_type, init)
    }

    /// Create an event of a specific interface
    pub fn with_class(class: EventClass, event_type: &str, init: &EventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            class,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            composed: init.composed,
            detail: init.detail.clone(),
            target: Cell::new(None),
            current_target: Cell::new(None),
            capture_target: Cell::new(None),
            phase: Cell::new(EventPhase::None),
            dispatching: Cell::new(false),
            in_passive_listener: Cell::new(false),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            immediate_propagation_stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn class(&self) -> EventClass {
        self.class
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn composed(&self) -> bool {
        self.composed
    }

    pub fn detail(&self) -> Option<&serde_json::Value> {
        self.detail.as_ref()
    }

    /// Node the event was dispatched to
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    /// Node whose listeners are currently running
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    /// Node a delegated listener was bound on, set by the delegation adapter
    pub fn capture_target(&self) -> Option<NodeId> {
        self.capture_target.get()
    }

    pub fn set_capture_target(&self, node: NodeId) {
        self.capture_target.set(Some(node));
    }

    pub fn phase(&self) -> EventPhase {
        self.phase.get()
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped.get()
    }

    /// Ignored for non-cancelable events and inside passive listeners
    pub fn prevent_default(&self) {
        if self.cancelable && !self.in_passive_listener.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_propagation_stopped.set(true);
    }

    pub(crate) fn begin_dispatch(&self, target: NodeId) {
        self.target.set(Some(target));
        self.capture_target.set(None);
        self.dispatching.set(true);
        self.propagation_stopped.set(false);
        self.immediate_propagation_stopped.set(false);
    }

    pub(crate) fn enter(&self, node: NodeId, phase: EventPhase) {
        self.current_target.set(Some(node));
        self.phase.set(phase);
    }

    pub(crate) fn set_in_passive_listener(&self, passive: bool) {
        self.in_passive_listener.set(passive);
    }

    pub(crate) fn end_dispatch(&self) {
        self.current_target.set(None);
        self.phase.set(EventPhase::None);
        self.dispatching.set(false);
        self.in_passive_listener.set(false);
    }
}
