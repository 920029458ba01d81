//! Architectural Contract Test: Identifier Regeneration & Reset
//!
//! Constraints verified:
//! - A regenerated identifier is mirrored only when the backend succeeded
//! - A reset is never simulated locally: it is followed by a full reload
//! - Excluded keys survive a reset
//!
//! If this test fails, a client can lose or fake its identity.

mod common;

use cfgsync_core::{Error, SyncEvent, ThemeMode};
use common::*;
use tokio_test::{assert_err, assert_ok};

const UUID: &str = "3f2b8c1e-9d4a-4e7b-8a61-0c5d2e9f7b10";

#[tokio::test]
async fn regenerate_identifier_updates_store() {
    let mut harness = Harness::loaded(MockBackend::new().with_setting("client_uuid", UUID)).await;

    let uuid = harness
        .engine
        .regenerate_identifier()
        .await
        .expect("backend succeeded");

    assert_ne!(uuid, UUID);
    assert_eq!(harness.engine.store().snapshot().client_uuid, uuid);
    assert_eq!(harness.backend.stored("client_uuid"), Some(uuid.clone()));
    assert_eq!(
        harness.drain_events(),
        vec![SyncEvent::IdentifierRegenerated { uuid }]
    );
}

#[tokio::test]
async fn regenerate_identifier_failure_returns_none() {
    let harness = Harness::loaded(MockBackend::new().with_setting("client_uuid", UUID)).await;
    harness.backend.set_failing(true);

    assert_eq!(harness.engine.regenerate_identifier().await, None);
    assert_eq!(harness.engine.store().snapshot().client_uuid, UUID);
}

#[tokio::test]
async fn regenerate_identifier_refusal_returns_none() {
    let mut harness = Harness::loaded(MockBackend::new().with_setting("client_uuid", UUID)).await;
    harness.backend.set_refusing(true);

    assert_eq!(harness.engine.regenerate_identifier().await, None);
    assert_eq!(harness.engine.store().snapshot().client_uuid, UUID);
    assert!(matches!(
        harness.drain_events().as_slice(),
        [SyncEvent::IdentifierRegenerationFailed { .. }]
    ));
}

#[tokio::test]
async fn reset_reloads_and_keeps_excluded_uuid() {
    let backend = MockBackend::new()
        .with_setting("client_uuid", UUID)
        .with_setting("theme_mode", "dark")
        .with_setting("show_clock", "false")
        .with_setting("topbar_height", "5");
    let mut harness = Harness::loaded(backend).await;
    let get_all_before = harness.backend.get_all_calls();

    assert_ok!(
        harness
            .engine
            .reset_to_defaults(&["client_uuid".to_string()])
            .await
    );

    assert_eq!(harness.backend.get_all_calls(), get_all_before + 1);
    assert_eq!(
        harness.backend.last_reset_exclude(),
        Some(vec!["client_uuid".to_string()])
    );

    let settings = harness.engine.store().snapshot();
    assert_eq!(settings.client_uuid, UUID);
    assert_eq!(settings.theme_mode, ThemeMode::Auto);
    assert!(settings.show_clock);
    assert_eq!(settings.topbar_height, "3");

    assert_eq!(harness.host.mode_calls(), vec![ThemeMode::Auto]);
    assert!(matches!(
        harness.drain_events().last(),
        Some(SyncEvent::ResetCompleted { .. })
    ));
}

#[tokio::test]
async fn reset_without_exclusions_replaces_uuid() {
    let harness = Harness::loaded(MockBackend::new().with_setting("client_uuid", UUID)).await;

    assert_ok!(harness.engine.reset_to_defaults(&[]).await);

    assert_ne!(harness.engine.store().snapshot().client_uuid, UUID);
}

#[tokio::test]
async fn reset_with_default_exclude_keeps_uuid() {
    let harness = Harness::loaded(MockBackend::new().with_setting("client_uuid", UUID)).await;

    assert_ok!(harness.engine.reset_with_default_exclude().await);

    assert_eq!(
        harness.backend.last_reset_exclude(),
        Some(vec!["client_uuid".to_string()])
    );
    assert_eq!(harness.engine.store().snapshot().client_uuid, UUID);
}

#[tokio::test]
async fn reset_failure_leaves_store_untouched() {
    let mut harness = Harness::loaded(MockBackend::new().with_setting("theme_mode", "dark")).await;
    harness.backend.set_failing(true);
    let before = harness.engine.store().snapshot();
    let get_all_before = harness.backend.get_all_calls();

    assert_err!(harness.engine.reset_to_defaults(&[]).await);

    assert_eq!(harness.engine.store().snapshot(), before);
    assert_eq!(harness.backend.get_all_calls(), get_all_before, "no reload");
    assert!(matches!(
        harness.drain_events().as_slice(),
        [SyncEvent::ResetFailed { .. }]
    ));
}

#[tokio::test]
async fn reset_refusal_is_rejected_error() {
    let harness = Harness::loaded(MockBackend::new()).await;
    harness.backend.set_refusing(true);

    let err = assert_err!(harness.engine.reset_to_defaults(&[]).await);

    assert!(matches!(err, Error::Rejected { .. }));
    assert_eq!(harness.backend.get_all_calls(), 1);
}
