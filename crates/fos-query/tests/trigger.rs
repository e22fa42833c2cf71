//! Event construction and triggering

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{RecordingHost, counter};
use fos_dom::Dom;
use fos_query::{
    Event, EventClass, EventError, EventInit, EventRegistry, EventSource, Listener, NodeId,
    TriggerOptions,
};
use serde_json::json;

#[test]
fn test_build_event_resolves_interface() {
    let registry = EventRegistry::new(Rc::new(Dom::new()));

    let click = registry.build_event("click", &EventInit::default()).unwrap();
    assert_eq!(click.class(), EventClass::PointerEvent);
    assert_eq!(click.event_type(), "click");

    let key = registry.build_event("keydown", &EventInit::default()).unwrap();
    assert_eq!(key.class(), EventClass::KeyboardEvent);

    let custom = registry
        .build_event("tab:open", &EventInit::default().detail(json!({ "index": 2 })))
        .unwrap();
    assert_eq!(custom.class(), EventClass::CustomEvent);
    assert_eq!(custom.detail(), Some(&json!({ "index": 2 })));

    let plain = registry.build_event("tab:open", &EventInit::default()).unwrap();
    assert_eq!(plain.class(), EventClass::Event);
}

#[test]
fn test_build_event_applies_init() {
    let registry = EventRegistry::new(Rc::new(Dom::new()));

    let event = registry
        .build_event("ping", &EventInit::default().bubbles(false).cancelable(false))
        .unwrap();
    assert!(!event.bubbles());
    assert!(!event.cancelable());
    assert!(!event.is_dispatching());
}

#[test]
fn test_missing_constructor() {
    let dom = Rc::new(Dom::new());
    assert!(dom.undefine_event_class(EventClass::TouchEvent));
    let registry = EventRegistry::new(dom);

    let err = registry
        .build_event("touchstart", &EventInit::default())
        .unwrap_err();
    assert!(matches!(err, EventError::UnknownEventClass(EventClass::TouchEvent)));
    assert_eq!(err.to_string(), "Unknown event class: TouchEvent");

    // Other classes are unaffected
    assert!(registry.build_event("click", &EventInit::default()).is_ok());
}

#[test]
fn test_trigger_missing_constructor_dispatches_nothing() {
    let host = RecordingHost::new();
    let node = host.dom.append_element(host.dom.document(), "div").unwrap();
    host.dom.undefine_event_class(EventClass::TouchEvent);
    let registry = EventRegistry::new(host.clone());

    assert!(matches!(
        registry.trigger(node, "touchend", &TriggerOptions::default()),
        Err(EventError::UnknownEventClass(_))
    ));
    assert!(host.dispatched_events().is_empty());
}

#[test]
fn test_shared_event_across_targets() {
    let host = RecordingHost::new();
    let body = host.dom.append_element(host.dom.document(), "body").unwrap();
    let nodes: Vec<NodeId> = (0..3)
        .map(|_| host.dom.append_element(body, "p").unwrap())
        .collect();
    let registry = EventRegistry::new(host.clone());

    registry
        .trigger(nodes.clone(), "refresh", &TriggerOptions::default())
        .unwrap();

    let events = host.dispatched_events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| Rc::ptr_eq(e, &events[0])));
}

#[test]
fn test_shared_event_resets_capture_target() {
    let host = RecordingHost::new();
    let body = host.dom.append_element(host.dom.document(), "body").unwrap();
    let list = host.dom.append_element(body, "ul").unwrap();
    let item = host.dom.append_element(list, "li").unwrap();
    let plain = host.dom.append_element(body, "p").unwrap();
    let registry = EventRegistry::new(host.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));

    for (node, selector) in [(list, "li"), (plain, "")] {
        let seen = seen.clone();
        registry
            .register(
                node,
                "refresh",
                selector,
                Listener::new(move |this, event| {
                    seen.borrow_mut().push((this, event.capture_target()));
                }),
            )
            .unwrap();
    }

    registry
        .trigger(vec![item, plain], "refresh", &TriggerOptions::default())
        .unwrap();

    let events = host.dispatched_events();
    assert!(Rc::ptr_eq(&events[0], &events[1]));
    assert_eq!(*seen.borrow(), vec![(item, Some(list)), (plain, None)]);
}

#[test]
fn test_new_event_for_each_target() {
    let host = RecordingHost::new();
    let body = host.dom.append_element(host.dom.document(), "body").unwrap();
    let nodes: Vec<NodeId> = (0..3)
        .map(|_| host.dom.append_element(body, "p").unwrap())
        .collect();
    let registry = EventRegistry::new(host.clone());

    let receivers = Rc::new(RefCell::new(Vec::new()));
    for &node in &nodes {
        let receivers = receivers.clone();
        registry
            .register(
                node,
                "refresh",
                (),
                Listener::new(move |this, event| {
                    assert_eq!(event.target(), Some(this));
                    receivers.borrow_mut().push(this);
                }),
            )
            .unwrap();
    }

    let options = TriggerOptions::new().new_event_for_each(true);
    registry.trigger(nodes.clone(), "refresh", &options).unwrap();

    let events = host.dispatched_events();
    assert_eq!(events.len(), 3);
    assert!(!Rc::ptr_eq(&events[0], &events[1]));
    assert!(!Rc::ptr_eq(&events[1], &events[2]));
    assert!(!Rc::ptr_eq(&events[0], &events[2]));
    assert_eq!(*receivers.borrow(), nodes);
    for (event, &node) in events.iter().zip(&nodes) {
        assert_eq!(event.target(), Some(node));
        assert_eq!(event.class(), EventClass::Event);
    }
}

#[test]
fn test_prebuilt_event_dispatched_as_is() {
    let host = RecordingHost::new();
    let node = host.dom.append_element(host.dom.document(), "div").unwrap();
    let registry = EventRegistry::new(host.clone());
    let seen = Rc::new(RefCell::new(None));

    {
        let seen = seen.clone();
        registry
            .register(
                node,
                "custom",
                (),
                Listener::new(move |_, event| {
                    *seen.borrow_mut() = event.detail().cloned();
                }),
            )
            .unwrap();
    }

    let event = Rc::new(Event::with_class(
        EventClass::CustomEvent,
        "custom",
        &EventInit::default().detail(json!("payload")),
    ));
    registry
        .trigger(node, &event, &TriggerOptions::new().new_event_for_each(true))
        .unwrap();

    let dispatched = host.dispatched_events();
    assert_eq!(dispatched.len(), 1);
    assert!(Rc::ptr_eq(&dispatched[0], &event));
    assert_eq!(*seen.borrow(), Some(json!("payload")));
    assert_eq!(event.target(), Some(node));
}

#[test]
fn test_detail_reaches_listener() {
    let dom = Rc::new(Dom::new());
    let node = dom.append_element(dom.document(), "div").unwrap();
    let registry = EventRegistry::new(dom);
    let seen = Rc::new(RefCell::new(None));

    {
        let seen = seen.clone();
        registry
            .register(
                node,
                "select:item",
                (),
                Listener::new(move |_, event| {
                    *seen.borrow_mut() = Some((event.class(), event.detail().cloned()));
                }),
            )
            .unwrap();
    }

    registry
        .trigger(node, "select:item", &TriggerOptions::new().detail(json!([1, 2])))
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        Some((EventClass::CustomEvent, Some(json!([1, 2]))))
    );
}

#[test]
fn test_invalid_event_type() {
    let dom = Rc::new(Dom::new());
    let node = dom.append_element(dom.document(), "div").unwrap();
    let registry = EventRegistry::new(dom);

    for bad in ["", "   ", "click keydown"] {
        assert!(
            matches!(
                registry.trigger(node, bad, &TriggerOptions::default()),
                Err(EventError::InvalidEvent(_))
            ),
            "{bad:?} should be rejected"
        );
    }

    let untyped = Event::new("", &EventInit::default());
    assert!(matches!(
        registry.trigger(node, untyped, &TriggerOptions::default()),
        Err(EventError::InvalidEvent(_))
    ));
}

#[test]
fn test_redispatch_from_listener_is_rejected() {
    let dom = Rc::new(Dom::new());
    let node = dom.append_element(dom.document(), "div").unwrap();
    let other = dom.append_element(dom.document(), "div").unwrap();
    let registry = Rc::new(EventRegistry::new(dom));
    let outcome = Rc::new(RefCell::new(None));

    let event = Rc::new(Event::new("ping", &EventInit::default()));
    {
        let registry_ref = Rc::downgrade(&registry);
        let event = Rc::downgrade(&event);
        let outcome = outcome.clone();
        registry
            .register(
                node,
                "ping",
                (),
                Listener::new(move |_, _| {
                    let (Some(registry), Some(event)) = (registry_ref.upgrade(), event.upgrade()) else {
                        return;
                    };
                    let result = registry.trigger(other, EventSource::Event(event), &TriggerOptions::default());
                    *outcome.borrow_mut() = Some(matches!(result, Err(EventError::InvalidEvent(_))));
                }),
            )
            .unwrap();
    }

    registry.trigger(node, &event, &TriggerOptions::default()).unwrap();
    assert_eq!(*outcome.borrow(), Some(true));
}

#[test]
fn test_non_bubbling_trigger() {
    let dom = Rc::new(Dom::new());
    let parent = dom.append_element(dom.document(), "div").unwrap();
    let child = dom.append_element(parent, "span").unwrap();
    let registry = EventRegistry::new(dom);
    let hits = Rc::new(RefCell::new(0));

    registry.register(parent, "ping", (), counter(&hits)).unwrap();
    registry
        .trigger(child, "ping", &TriggerOptions::new().bubbles(false))
        .unwrap()
        .trigger(child, "ping", &TriggerOptions::default())
        .unwrap();

    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_trigger_invalid_target() {
    let registry = EventRegistry::new(Rc::new(Dom::new()));
    assert!(matches!(
        registry.trigger(NodeId::NONE, "click", &TriggerOptions::default()),
        Err(EventError::InvalidTarget)
    ));
}

#[test]
fn test_trigger_options_from_config() {
    let init: EventInit = EventInit::default().cancelable(false);
    let options = TriggerOptions::from(init.clone());
    assert_eq!(options.init, init);
    assert!(!options.new_event_for_each);
}
