//! Unit tests for the ViewHost: one controller per tab, lazy rendering of
//! background tabs, and capability snapshots on tab switches.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use support::*;
use ytdesktop::managers::tab_store::{StoreHandle, TabStoreTrait};
use ytdesktop::types::navigation::NavigationAction;
use ytdesktop::types::settings::NavigationSettings;
use ytdesktop::types::tab::ActiveTabState;
use ytdesktop::view::content_surface::{ContentSurface, SurfaceEvent};
use ytdesktop::view::view_host::ViewHost;

fn host(store: &StoreHandle, factory: &Arc<MockFactory>) -> ViewHost<MockFactory, MockLookup> {
    ViewHost::new(
        store.clone(),
        Arc::clone(factory),
        MockLookup::new(),
        NavigationSettings::default(),
    )
}

#[tokio::test]
async fn test_only_active_tab_is_rendered() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let second = store.write(|s| s.add_tab(Some(VIDEO_URL), false, None, None));

    let host = host(&store, &factory);

    assert_eq!(host.len(), 2);
    assert_eq!(host.rendered(), vec![first.clone()]);
    assert!(host.controller(&first).unwrap().is_active());
    assert!(!host.controller(&second).unwrap().is_active());
    assert_eq!(factory.created(), 1);
}

#[tokio::test]
async fn test_switching_renders_and_keeps_background_views() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);

    let second = store.write(|s| s.add_tab(Some(VIDEO_URL), true, None, None));
    host.sync();

    assert!(!host.controller(&first).unwrap().is_active());
    assert!(host.controller(&second).unwrap().is_active());
    let mut rendered = vec![first.clone(), second.clone()];
    rendered.sort();
    assert_eq!(host.rendered(), rendered);
    assert_eq!(factory.surface(&second).url(), VIDEO_URL);

    store.write(|s| s.set_active_tab(&first));
    host.sync();
    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn test_closed_tab_view_is_released() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let second = store.write(|s| s.add_tab(None, true, None, None));
    let mut host = host(&store, &factory);
    let surface = factory.surface(&second);
    assert_eq!(surface.subscriber_count(), 1);

    store.write(|s| s.close_tab(&second));
    host.sync();

    assert_eq!(host.len(), 1);
    assert!(host.controller(&second).is_none());
    assert_eq!(surface.subscriber_count(), 0);
    assert!(host.controller(&first).unwrap().is_active());
}

#[tokio::test]
async fn test_switching_back_pushes_fresh_snapshot() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);

    factory.surface(&first).set_history(true, false);
    factory.surface(&first).emit(SurfaceEvent::DomReady);
    host.pump_events().await;
    assert!(store.snapshot().active_tab_state.can_go_back);

    let second = store.write(|s| s.add_tab(None, true, None, None));
    host.sync();
    factory.surface(&second).emit(SurfaceEvent::DomReady);
    host.pump_events().await;
    assert!(!store.snapshot().active_tab_state.can_go_back);

    store.write(|s| s.set_active_tab(&first));
    host.sync();
    let state = store.snapshot().active_tab_state;
    assert!(state.can_go_back);
    assert!(!state.can_go_forward);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_background_view_reports_do_not_touch_active_state() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);
    factory.surface(&first).emit(SurfaceEvent::DomReady);
    host.pump_events().await;

    let second = store.write(|s| s.add_tab(None, true, None, None));
    host.sync();
    factory.surface(&second).emit(SurfaceEvent::DomReady);
    host.pump_events().await;
    let before = store.snapshot().active_tab_state;

    factory.surface(&first).set_history(true, true);
    factory.surface(&first).emit(SurfaceEvent::DidStartLoading);
    factory.surface(&first).emit(SurfaceEvent::DidStopLoading);
    host.pump_events().await;

    assert_eq!(store.snapshot().active_tab_state, before);
    assert!(!store.read(|s| s.get_tab(&first).unwrap().is_loading));
}

#[tokio::test]
async fn test_navigation_reaches_only_the_active_view() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);
    factory.surface(&first).emit(SurfaceEvent::DomReady);
    host.pump_events().await;

    let second = store.write(|s| s.add_tab(None, true, None, None));
    host.sync();
    factory.surface(&second).emit(SurfaceEvent::DomReady);
    host.pump_events().await;

    store.write(|s| s.trigger_navigation(Some(NavigationAction::Reload)));
    assert_eq!(host.dispatch_navigation(), 1);
    assert_eq!(factory.surface(&second).reload_calls(), 1);
    assert_eq!(factory.surface(&first).reload_calls(), 0);

    store.write(|s| s.set_active_tab(&first));
    host.sync();
    assert_eq!(host.dispatch_navigation(), 0);
}

#[tokio::test]
async fn test_switching_to_unready_tab_clears_previous_capabilities() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);
    factory.surface(&first).set_history(true, true);
    factory.surface(&first).emit(SurfaceEvent::DomReady);
    host.pump_events().await;
    assert!(store.snapshot().active_tab_state.can_go_forward);

    let second = store.write(|s| s.add_tab(Some(VIDEO_URL), false, None, None));
    host.sync();
    store.write(|s| s.set_active_tab(&second));
    host.sync();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.active_tab_id.as_deref(), Some(second.as_str()));
    assert_eq!(snapshot.active_tab_state, ActiveTabState::fresh_loading());
}

#[tokio::test]
async fn test_changed_zoom_bounds_reach_existing_views() {
    let (store, first) = store_with_one_tab();
    let factory = MockFactory::new();
    let mut host = host(&store, &factory);
    factory.surface(&first).emit(SurfaceEvent::DomReady);
    host.pump_events().await;

    host.set_navigation_settings(NavigationSettings {
        zoom_max: 1.05,
        ..NavigationSettings::default()
    });
    store.write(|s| s.trigger_navigation(Some(NavigationAction::ZoomIn)));
    host.dispatch_navigation();

    assert_eq!(factory.surface(&first).zoom_factor(), 1.05);
}
