//! Event type → interface table

use fos_dom::EventClass;

/// Interface used to construct an event of `event_type`.
///
/// Types missing from the table become `CustomEvent` when a `detail`
/// payload is present and plain `Event` otherwise.
pub fn resolve_event_class(event_type: &str, has_detail: bool) -> EventClass {
    match event_type {
        "click" | "auxclick" | "contextmenu" | "pointerdown" | "pointerup" | "pointermove"
        | "pointerover" | "pointerout" | "pointerenter" | "pointerleave" | "pointercancel"
        | "gotpointercapture" | "lostpointercapture" => EventClass::PointerEvent,

        "dblclick" | "mousedown" | "mouseup" | "mousemove" | "mouseover" | "mouseout"
        | "mouseenter" | "mouseleave" => EventClass::MouseEvent,

        "wheel" => EventClass::WheelEvent,

        "drag" | "dragstart" | "dragend" | "dragenter" | "dragleave" | "dragover" | "drop" => {
            EventClass::DragEvent
        }

        "keydown" | "keyup" | "keypress" => EventClass::KeyboardEvent,

        "beforeinput" | "input" => EventClass::InputEvent,

        "compositionstart" | "compositionupdate" | "compositionend" => EventClass::CompositionEvent,

        "focus" | "blur" | "focusin" | "focusout" => EventClass::FocusEvent,

        "touchstart" | "touchend" | "touchmove" | "touchcancel" => EventClass::TouchEvent,

        "copy" | "cut" | "paste" => EventClass::ClipboardEvent,

        "animationstart" | "animationend" | "animationiteration" | "animationcancel" => {
            EventClass::AnimationEvent
        }

        "transitionrun" | "transitionstart" | "transitionend" | "transitioncancel" => {
            EventClass::TransitionEvent
        }

        "submit" => EventClass::SubmitEvent,

        "resize" | "scroll" | "select" | "abort" => EventClass::UIEvent,

        _ if has_detail => EventClass::CustomEvent,
        _ => EventClass::Event,
    }
}
