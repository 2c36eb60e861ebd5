//! Debounced autosave, explicit save and publish behaviour of the editor
//! session, driven on a paused tokio clock.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{draft_with, open_editor, open_editor_with, props, FORM_ID};
use formdesk_core::error::CoreError;
use formdesk_core::form::FormStatus;
use formdesk_core::settings::FormSettings;
use formdesk_editor::{EditorConfig, EditorEvent};
use serde_json::json;
use tokio::time::{sleep, Instant};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_autosave() {
    let mut form = draft_with(1);
    form.settings = FormSettings::with_defaults(&json!({"advanced": {"autoSaveInterval": 10}}));
    let (editor, store) = open_editor_with(form, EditorConfig::default()).await;
    let first = editor.elements()[0].id();
    let start = Instant::now();

    for i in 0..5 {
        editor.update_element(first, &props(json!({"label": format!("Label {i}")})));
        sleep(secs(1)).await;
    }
    // Last edit happened at t=4s and the loop ends at t=5s; nothing may
    // fire before t=14s.
    sleep(Duration::from_millis(8_500)).await;
    assert!(store.auto_saves().is_empty());

    sleep(secs(1)).await;
    let calls = store.auto_saves();
    assert_eq!(calls.len(), 1);

    let elapsed = calls[0].at - start;
    assert!(elapsed >= secs(14), "fired too early: {elapsed:?}");
    assert!(elapsed < secs(14) + Duration::from_millis(100), "fired too late: {elapsed:?}");
    assert_eq!(calls[0].elements, editor.elements());
    assert_eq!(calls[0].elements[0].props["label"], json!("Label 4"));
}

#[tokio::test(start_paused = true)]
async fn autosave_clears_dirty_and_records_timestamp() {
    let (editor, store) = open_editor(0).await;
    editor.add_element("email");
    assert!(editor.is_dirty());
    assert!(editor.last_saved_at().is_none());

    sleep(secs(31)).await;

    assert!(!editor.is_dirty());
    assert!(editor.last_saved_at().is_some());
    assert_eq!(store.stored().await.elements, editor.elements());
}

#[tokio::test(start_paused = true)]
async fn unusable_interval_falls_back_to_config() {
    let mut form = draft_with(0);
    form.settings = FormSettings::with_defaults(&json!({"advanced": {"autoSaveInterval": "soon"}}));
    let config = EditorConfig {
        autosave_fallback: secs(7),
        ..EditorConfig::default()
    };
    let (editor, store) = open_editor_with(form, config).await;

    editor.add_element("text");
    sleep(Duration::from_millis(6_900)).await;
    assert!(store.auto_saves().is_empty());

    sleep(Duration::from_millis(200)).await;
    assert_eq!(store.auto_saves().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn settings_update_rearms_with_new_interval() {
    let (editor, store) = open_editor(1).await;

    assert!(editor.update_settings(&props(json!({"advanced": {"autoSaveInterval": 2}}))));
    sleep(secs(3)).await;

    // Settings are not part of the element payload, so the whole form is saved.
    assert!(store.auto_saves().is_empty());
    assert_eq!(store.save_calls(), 1);
    assert_eq!(
        store.stored().await.settings.advanced["autoSaveInterval"],
        json!(2)
    );
    assert!(!editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn autosave_persists_settings_and_details() {
    let (editor, store) = open_editor(0).await;

    assert!(editor.update_settings(&props(json!({"layout": "two-column"}))));
    assert!(editor.update_details("Renamed", Some("Quarterly")).unwrap());
    sleep(secs(31)).await;

    let stored = store.stored().await;
    assert_eq!(stored.settings.general["layout"], json!("two-column"));
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.description.as_deref(), Some("Quarterly"));
    assert!(!editor.is_dirty());
    assert!(editor.last_saved_at().is_some());
}

#[tokio::test(start_paused = true)]
async fn autosave_returns_to_elements_only_after_full_save() {
    let (editor, store) = open_editor(0).await;

    editor.add_element("text");
    assert!(editor.update_details("Renamed", None).unwrap());
    sleep(secs(31)).await;
    assert_eq!(store.save_calls(), 1);
    assert!(store.auto_saves().is_empty());
    assert_eq!(store.stored().await.elements.len(), 1);

    editor.add_element("email");
    sleep(secs(31)).await;
    assert_eq!(store.save_calls(), 1);
    assert_eq!(store.auto_saves().len(), 1);
    assert_eq!(store.stored().await.elements.len(), 2);
    assert!(!editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn details_edit_during_full_autosave_is_saved_next_time() {
    let (editor, store) = open_editor(0).await;
    store.set_latency(secs(5));

    assert!(editor.update_details("Renamed", None).unwrap());
    // Full autosave runs from t=30s to t=35s.
    sleep(secs(32)).await;
    assert!(editor.update_settings(&props(json!({"layout": "two-column"}))));

    sleep(secs(4)).await;
    let stored = store.stored().await;
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.settings.general["layout"], json!("single-column"));
    assert!(editor.is_dirty());

    // Re-armed at t=32s: t=62s start, t=67s done.
    sleep(secs(32)).await;
    assert_eq!(store.save_calls(), 2);
    assert!(store.auto_saves().is_empty());
    assert_eq!(
        store.stored().await.settings.general["layout"],
        json!("two-column")
    );
    assert!(!editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn failed_full_autosave_keeps_details_pending() {
    let (editor, store) = open_editor(0).await;
    store.set_failing(true);

    assert!(editor.update_details("Renamed", None).unwrap());
    sleep(secs(31)).await;
    assert!(editor.is_dirty());

    // An element edit alone must still carry the unsaved title.
    store.set_failing(false);
    editor.add_element("text");
    sleep(secs(31)).await;

    assert_eq!(store.save_calls(), 2);
    assert!(store.auto_saves().is_empty());
    assert_eq!(store.stored().await.title, "Renamed");
    assert!(!editor.is_dirty());
}

// ---------------------------------------------------------------------------
// Dirty tracking under concurrency
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slow_autosave_does_not_clear_newer_edits() {
    let (editor, store) = open_editor(0).await;
    store.set_latency(secs(5));

    editor.add_element("text");
    // Autosave starts at t=30s and resolves at t=35s.
    sleep(secs(32)).await;
    assert!(editor.is_saving());
    editor.add_element("email");

    sleep(secs(4)).await;
    let calls = store.auto_saves();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].elements.len(), 1);
    assert!(!editor.is_saving());
    assert!(editor.is_dirty(), "newer edit must keep the form dirty");
    assert!(editor.last_saved_at().is_some());

    // The second edit re-armed the timer: t=62s start, t=67s done.
    sleep(secs(32)).await;
    let calls = store.auto_saves();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].elements.len(), 2);
    assert!(!editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn autosave_failure_keeps_dirty_and_reports() {
    let (editor, store) = open_editor(0).await;
    let mut events = editor.subscribe();
    store.set_failing(true);

    editor.add_element("text");
    sleep(secs(31)).await;

    assert_eq!(store.auto_saves().len(), 1);
    assert!(editor.is_dirty());
    assert!(editor.last_saved_at().is_none());
    assert_matches!(
        events.try_recv(),
        Ok(EditorEvent::AutoSaveFailed { form_id: FORM_ID, .. })
    );

    // No automatic retry.
    sleep(secs(120)).await;
    assert_eq!(store.auto_saves().len(), 1);

    // The next edit arms a fresh attempt.
    store.set_failing(false);
    editor.add_element("text");
    sleep(secs(31)).await;
    assert_eq!(store.auto_saves().len(), 2);
    assert!(!editor.is_dirty());
    assert_matches!(
        events.try_recv(),
        Ok(EditorEvent::AutoSaved { clean: true, .. })
    );
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_autosave() {
    let (editor, store) = open_editor(0).await;
    editor.add_element("text");

    editor.shutdown();
    sleep(secs(120)).await;

    assert!(store.auto_saves().is_empty());
    assert!(editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn dropping_editor_cancels_pending_autosave() {
    let (editor, store) = open_editor(0).await;
    editor.add_element("text");

    drop(editor);
    sleep(secs(120)).await;

    assert!(store.auto_saves().is_empty());
}

// ---------------------------------------------------------------------------
// Explicit save
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn explicit_save_bypasses_debounce() {
    let (editor, store) = open_editor(0).await;
    let mut events = editor.subscribe();
    editor.add_element("text");
    assert!(editor.update_details("Renamed", None).unwrap());

    let saved = editor.save().await.unwrap();

    assert_eq!(store.save_calls(), 1);
    assert_eq!(saved.title, "Renamed");
    assert!(!editor.is_dirty());
    assert!(editor.last_saved_at().is_some());
    assert_matches!(events.try_recv(), Ok(EditorEvent::Saved { version: 1, .. }));

    // The pending autosave timer was cancelled.
    sleep(secs(60)).await;
    assert!(store.auto_saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn explicit_save_failure_is_returned() {
    let (editor, store) = open_editor(0).await;
    store.set_failing(true);
    editor.add_element("text");

    let result = editor.save().await;

    assert_matches!(result, Err(CoreError::Internal(_)));
    assert!(editor.is_dirty());
    assert!(!editor.is_saving());
}

#[tokio::test(start_paused = true)]
async fn edits_during_explicit_save_keep_dirty_and_rearm() {
    let (editor, store) = open_editor(0).await;
    store.set_latency(secs(5));
    editor.add_element("text");

    let (result, _) = tokio::join!(editor.save(), async {
        sleep(secs(1)).await;
        editor.add_element("email");
    });

    assert!(result.is_ok());
    assert!(editor.is_dirty());

    // The finished save re-armed the timer at t=5s for t=35s, replacing the
    // one armed by the edit at t=1s.
    sleep(secs(45)).await;
    let calls = store.auto_saves();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].elements.len(), 2);
    assert!(!editor.is_dirty());
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn publish_adopts_status_and_version() {
    let (editor, _store) = open_editor(1).await;
    let mut events = editor.subscribe();

    let published = editor.publish().await.unwrap();

    assert_eq!(published.status, FormStatus::Published);
    assert_eq!(published.version, 2);
    let form = editor.form();
    assert_eq!(form.status, FormStatus::Published);
    assert_eq!(form.version, 2);
    assert!(!editor.is_dirty());
    assert_matches!(
        events.try_recv(),
        Ok(EditorEvent::Published { version: 2, .. })
    );
}

#[tokio::test(start_paused = true)]
async fn publish_failure_is_returned() {
    let (editor, store) = open_editor(1).await;
    store.set_failing(true);

    assert!(editor.publish().await.is_err());
    assert_eq!(editor.form().status, FormStatus::Draft);
    assert_eq!(editor.form().version, 1);
}
