mod common;

use {
    common::*,
    prism::prelude::*,
    serde_json::json,
    std::sync::Arc,
};

#[test]
fn create_view() {
    init_tracing();
    let state = State::new(Attributes::new());
    let view = state.create_view(ViewOptions::new().name("custom")).unwrap();

    assert_eq!(view.name(), "custom");
    assert_eq!(state.view_count(), 1);
    assert!(state.get_view("custom").is_some());

    view.destroy().unwrap();
    assert_eq!(state.view_count(), 0);
    assert!(state.get_view("default").is_none());

    let view = state.create_view(ViewOptions::new()).unwrap();
    assert!(view.name().starts_with("view"));
    let other = state.get_view(view.name()).unwrap();
    assert!(Arc::ptr_eq(&view, &other));
    view.destroy().unwrap();
}

#[test]
fn create_default_view() {
    let state = State::new(Attributes::new());

    let default_view = state.get_default_view().unwrap();
    assert_eq!(default_view.name(), "default");
    assert_eq!(state.view_count(), 1);

    let view = state.get_default_view().unwrap();
    assert!(Arc::ptr_eq(&view, &default_view));

    view.destroy().unwrap();
    assert_eq!(state.view_count(), 0);
    assert!(state.get_view("default").is_none());
}

#[test]
fn trigger_publish() {
    let state = State::new(Attributes::new());
    let view = state.create_view(ViewOptions::new()).unwrap();
    assert!(!state.is_initialized());
    assert!(!view.is_initialized());

    let published = spy(state.events(), EventKind::Publish);
    state.publish().unwrap();

    assert_eq!(calls(&published), 1);
    assert!(state.is_initialized());
    assert!(view.is_initialized());
}

#[test]
fn non_objects_are_rejected() {
    assert!(matches!(State::from_json(json!(3)), Err(PrismError::NotAnObject(_))));
}
