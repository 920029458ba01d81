//! Architectural Contract Test: Initial Load
//!
//! Constraints verified:
//! - A load decodes every persisted field, defaulting missing keys
//! - `loaded` flips only after a successful load, and never back
//! - The derived week is computed at the end of a load, degrading to 1
//! - The theme is applied exactly once per load, whatever changed
//! - A failed load leaves the store untouched
//!
//! If this test fails, the mirror can diverge from the backend on startup.

mod common;

use cfgsync_core::{Backend, ControlMode, DEFAULT_THEME_COLOR, Error, SyncEvent, ThemeMode};
use common::*;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn load_populates_store_and_week() {
    let backend = MockBackend::new()
        .with_setting("show_clock", "true")
        .with_setting("show_schedule", "false")
        .with_setting("semester_start_date", "2024-02-26")
        .with_week(3);
    let harness = Harness::new(backend);

    assert_ok!(harness.engine.load().await);

    let settings = harness.engine.store().snapshot();
    assert!(settings.show_clock);
    assert!(!settings.show_schedule);
    assert_eq!(settings.semester_start_date, "2024-02-26");
    assert_eq!(settings.current_week, 3);
    assert!(settings.loaded);
    assert_eq!(harness.backend.get_all_calls(), 1);
    assert_eq!(harness.backend.week_calls(), 1);
}

#[tokio::test]
async fn missing_keys_take_field_defaults() {
    let harness = Harness::new(MockBackend::new());

    assert_ok!(harness.engine.load().await);

    let settings = harness.engine.store().snapshot();
    assert_eq!(settings.theme_mode, ThemeMode::Auto);
    assert_eq!(settings.control_mode, ControlMode::Touch);
    assert_eq!(settings.theme_color, DEFAULT_THEME_COLOR);
    assert_eq!(settings.topbar_height, "3");
    assert!(!settings.show_clock, "absent booleans decode to false");
    assert!(!settings.camera_enabled);
    assert_eq!(settings.current_week, 1, "no week answer means week 1");
}

#[tokio::test]
async fn invalid_wire_values_decode_to_defaults() {
    let backend = MockBackend::new()
        .with_setting("theme_mode", "sepia")
        .with_setting("control_mode", "stylus")
        .with_setting("show_clock", "True")
        .with_setting("camera_enabled", "1");
    let harness = Harness::new(backend);

    assert_ok!(harness.engine.load().await);

    let settings = harness.engine.store().snapshot();
    assert_eq!(settings.theme_mode, ThemeMode::Auto);
    assert_eq!(settings.control_mode, ControlMode::Touch);
    assert!(!settings.show_clock, "only the exact string \"true\" is true");
    assert!(!settings.camera_enabled);
}

#[tokio::test]
async fn failed_load_leaves_store_untouched() {
    let backend = MockBackend::new().with_setting("theme_mode", "dark");
    backend.set_failing(true);
    let mut harness = Harness::new(backend);
    let before = harness.engine.store().snapshot();

    let err = assert_err!(harness.engine.load().await);

    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(harness.engine.store().snapshot(), before);
    assert!(!harness.engine.store().is_loaded());
    assert!(harness.host.calls().is_empty(), "no theme on failed load");
    assert!(matches!(
        harness.drain_events().as_slice(),
        [SyncEvent::LoadFailed { .. }]
    ));
}

#[tokio::test]
async fn failed_reload_keeps_loaded_flag() {
    let backend = MockBackend::new().with_setting("show_clock", "true");
    let harness = Harness::loaded(backend).await;

    harness.backend.set_failing(true);
    assert_err!(harness.engine.load().await);

    assert!(harness.engine.store().is_loaded());
    assert!(harness.engine.store().snapshot().show_clock);
}

#[tokio::test]
async fn week_failure_degrades_to_week_one() {
    let backend = MockBackend::new()
        .with_setting("semester_start_date", "2024-02-26")
        .with_week(7);
    backend.set_week_failing(true);
    let harness = Harness::new(backend);

    assert_ok!(harness.engine.load().await);

    assert_eq!(harness.engine.store().current_week(), 1);
    assert!(harness.engine.store().is_loaded());
}

#[tokio::test]
async fn load_applies_theme_once() {
    let backend = MockBackend::new()
        .with_setting("theme_mode", "dark")
        .with_setting("theme_color", "#FF5722");
    let harness = Harness::new(backend);

    assert_ok!(harness.engine.load().await);

    assert_eq!(
        harness.host.calls(),
        vec![
            ThemeCall::Mode(ThemeMode::Dark),
            ThemeCall::Color("#FF5722".to_string())
        ]
    );
}

#[tokio::test]
async fn load_with_default_color_skips_color_scheme() {
    let harness = Harness::new(MockBackend::new().with_setting("theme_mode", "light"));

    assert_ok!(harness.engine.load().await);

    assert_eq!(harness.host.mode_calls(), vec![ThemeMode::Light]);
    assert!(harness.host.color_calls().is_empty());
}

#[tokio::test]
async fn reload_applies_theme_even_without_changes() {
    let backend = MockBackend::new().with_setting("theme_mode", "dark");
    let harness = Harness::loaded(backend).await;

    assert_ok!(harness.engine.load().await);

    assert_eq!(harness.host.mode_calls(), vec![ThemeMode::Dark]);
}

#[tokio::test]
async fn reload_with_changed_theme_does_not_double_apply() {
    let harness = Harness::loaded(MockBackend::new().with_setting("theme_mode", "dark")).await;

    assert_ok!(harness.backend.set_config("theme_mode", "light").await);
    assert_ok!(harness.engine.load().await);

    assert_eq!(harness.host.mode_calls(), vec![ThemeMode::Light]);
}

#[tokio::test]
async fn theme_host_failure_does_not_fail_load() {
    let harness = Harness::new(MockBackend::new().with_setting("theme_mode", "dark"));
    harness.host.set_failing(true);

    assert_ok!(harness.engine.load().await);
    assert!(harness.engine.store().is_loaded());
}

#[tokio::test]
async fn load_emits_loaded_event() {
    let mut harness = Harness::new(MockBackend::new().with_week(4));

    assert_ok!(harness.engine.load().await);

    let events = harness.drain_events();
    assert!(events.contains(&SyncEvent::WeekRecomputed { week: 4 }));
    assert!(matches!(
        events.last(),
        Some(SyncEvent::Loaded {
            current_week: 4,
            ..
        })
    ));
}
