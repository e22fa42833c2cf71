//! Delegated bindings

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{counter, recorder};
use fos_dom::Dom;
use fos_query::{Event, EventHandler, EventRegistry, Listener, ListenerOptions, NodeId, TriggerOptions};

/// document > section#root > div.mid > span.leaf
fn tree() -> (Rc<Dom>, NodeId, NodeId, NodeId) {
    let dom = Rc::new(Dom::new());
    let root = dom.append_element(dom.document(), "section").unwrap();
    dom.set_attribute(root, "id", "root").unwrap();
    let mid = dom.append_element(root, "div").unwrap();
    dom.set_attribute(mid, "class", "mid").unwrap();
    let leaf = dom.append_element(mid, "span").unwrap();
    dom.set_attribute(leaf, "class", "leaf").unwrap();
    (dom, root, mid, leaf)
}

#[test]
fn test_receiver_is_matching_ancestor() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let listener = {
        let seen = seen.clone();
        Listener::new(move |this, event: &Event| {
            seen.borrow_mut()
                .push((this, event.target(), event.capture_target(), event.current_target()));
        })
    };
    registry.register(root, "click", ".mid", listener).unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*seen.borrow(), vec![(mid, Some(leaf), Some(root), Some(root))]);
}

#[test]
fn test_no_match_no_call() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let hits = Rc::new(RefCell::new(0));

    registry.register(root, "click", ".missing", counter(&hits)).unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();
    registry.trigger(mid, "click", &TriggerOptions::default()).unwrap();
    registry.trigger(root, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_binding_node_never_matches_itself() {
    let (dom, root, _mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let hits = Rc::new(RefCell::new(0));

    registry.register(root, "click", "#root", counter(&hits)).unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();
    registry.trigger(root, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_nearest_match_wins() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let log = Rc::new(RefCell::new(Vec::new()));

    registry.register(root, "click", "div, span", recorder(&log, "hit")).unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();
    registry.trigger(mid, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*log.borrow(), vec![format!("hit@{leaf}"), format!("hit@{mid}")]);
}

#[test]
fn test_combinator_selectors() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let log = Rc::new(RefCell::new(Vec::new()));

    registry
        .register(root, "click", "section > div", recorder(&log, "child"))
        .unwrap()
        .register(root, "click", "#root .leaf", recorder(&log, "descendant"))
        .unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert!(log.contains(&format!("child@{mid}")));
    assert!(log.contains(&format!("descendant@{leaf}")));
}

#[test]
fn test_text_target_delegates_to_parent() {
    let (dom, root, _mid, leaf) = tree();
    let text = dom.create_text("label");
    dom.append_child(leaf, text).unwrap();
    let registry = EventRegistry::new(dom);
    let log = Rc::new(RefCell::new(Vec::new()));

    registry.register(root, "click", "span", recorder(&log, "span")).unwrap();
    registry.trigger(text, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*log.borrow(), vec![format!("span@{leaf}")]);
}

#[test]
fn test_delegated_capture() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let log = Rc::new(RefCell::new(Vec::new()));

    registry
        .register(
            root,
            "focus",
            ListenerOptions::new().selector(".mid").capture(true),
            recorder(&log, "capture"),
        )
        .unwrap();
    registry.register(leaf, "focus", (), recorder(&log, "target")).unwrap();

    // focus does not bubble, but capture listeners still see it
    registry
        .trigger(leaf, "focus", &TriggerOptions::new().bubbles(false))
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![format!("capture@{mid}"), format!("target@{leaf}")]
    );
}

#[test]
fn test_handler_object_receives_delegate() {
    struct Tabs {
        activated: RefCell<Vec<NodeId>>,
    }

    impl EventHandler for Tabs {
        fn handle_event(&self, this: NodeId, _event: &Event) {
            self.activated.borrow_mut().push(this);
        }
    }

    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let tabs = Rc::new(Tabs {
        activated: RefCell::new(Vec::new()),
    });

    registry
        .register(root, "click", Listener::from(tabs.clone()), ".mid")
        .unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*tabs.activated.borrow(), vec![mid]);
}

#[test]
fn test_invalid_selector_never_fires() {
    let (dom, root, _mid, leaf) = tree();
    let registry = EventRegistry::new(dom);
    let hits = Rc::new(RefCell::new(0));

    registry.register(root, "click", "div:hover", counter(&hits)).unwrap();
    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();

    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_stop_propagation_in_delegated_listener() {
    let (dom, root, _mid, leaf) = tree();
    let body_hits = Rc::new(RefCell::new(0));
    let registry = EventRegistry::new(dom.clone());

    registry
        .register(
            root,
            "click",
            ".leaf",
            Listener::new(|_, event| event.stop_propagation()),
        )
        .unwrap();
    registry
        .register(dom.document(), "click", (), counter(&body_hits))
        .unwrap();

    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();
    assert_eq!(*body_hits.borrow(), 0);
}

#[test]
fn test_registration_records_both_listeners() {
    let (dom, root, _mid, _leaf) = tree();
    let registry = EventRegistry::new(dom);
    let listener = Listener::new(|_, _| {});

    registry.register(root, "click", ".mid", &listener).unwrap();
    let registration = registry.lookup(root, "click", Some(".mid"), false).unwrap();

    assert!(registration.is_delegated());
    assert!(registration.source_listener().same(&listener));
    assert!(!registration.listener().same(&listener));
    assert_eq!(registration.key().as_str(), "click(.mid)");
}

#[test]
fn test_delegated_once_survives_a_miss() {
    let (dom, root, mid, leaf) = tree();
    let registry = EventRegistry::new(dom.clone());
    let hits = Rc::new(RefCell::new(0));

    let options = ListenerOptions::new().selector(".mid").once(true);
    registry.register(root, "click", options, counter(&hits)).unwrap();

    // No delegate on the path, so the binding is not used up
    registry.trigger(root, "click", &TriggerOptions::default()).unwrap();
    assert_eq!(*hits.borrow(), 0);
    assert!(!registry.lookup(root, "click", Some(".mid"), false).unwrap().is_spent());

    registry.trigger(leaf, "click", &TriggerOptions::default()).unwrap();
    registry.trigger(mid, "click", &TriggerOptions::default()).unwrap();
    assert_eq!(*hits.borrow(), 1);
    assert!(registry.lookup(root, "click", Some(".mid"), false).unwrap().is_spent());
}
