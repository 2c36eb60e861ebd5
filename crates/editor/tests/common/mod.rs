#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use formdesk_core::error::CoreError;
use formdesk_core::form::{Form, FormElement};
use formdesk_core::persistence::{FormPersistence, InMemoryFormStore};
use formdesk_core::settings::SettingsMap;
use formdesk_core::types::DbId;
use formdesk_editor::{EditorConfig, FormEditor};
use tokio::time::Instant;

/// Id of the form every helper seeds.
pub const FORM_ID: DbId = 1;

/// One recorded `auto_save_form` call.
#[derive(Debug, Clone)]
pub struct AutoSaveCall {
    pub at: Instant,
    pub elements: Vec<FormElement>,
}

/// Test double around [`InMemoryFormStore`] that records autosave calls and
/// can slow down or fail persistence on demand.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryFormStore,
    auto_saves: Mutex<Vec<AutoSaveCall>>,
    save_calls: Mutex<usize>,
    latency: Mutex<Duration>,
    failing: AtomicBool,
}

impl RecordingStore {
    pub async fn with_form(form: Form) -> Arc<Self> {
        let store = Self::default();
        store.inner.insert(form).await;
        Arc::new(store)
    }

    /// Delay every persistence call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Make every subsequent persistence call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn auto_saves(&self) -> Vec<AutoSaveCall> {
        self.auto_saves.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }

    pub async fn stored(&self) -> Form {
        self.inner.get(FORM_ID).await.unwrap()
    }

    async fn simulate_io(&self) -> Result<(), CoreError> {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Internal("connection reset by peer".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FormPersistence for RecordingStore {
    async fn load_form(&self, id: DbId) -> Result<Form, CoreError> {
        self.inner.load_form(id).await
    }

    async fn save_form(&self, id: DbId, form: &Form) -> Result<Form, CoreError> {
        *self.save_calls.lock().unwrap() += 1;
        self.simulate_io().await?;
        self.inner.save_form(id, form).await
    }

    async fn auto_save_form(&self, id: DbId, elements: &[FormElement]) -> Result<(), CoreError> {
        self.auto_saves.lock().unwrap().push(AutoSaveCall {
            at: Instant::now(),
            elements: elements.to_vec(),
        });
        self.simulate_io().await?;
        self.inner.auto_save_form(id, elements).await
    }

    async fn publish_form(&self, id: DbId) -> Result<Form, CoreError> {
        self.simulate_io().await?;
        self.inner.publish_form(id).await
    }
}

/// A draft form with `elements` text fields.
pub fn draft_with(elements: usize) -> Form {
    let mut form = Form::new_draft(FORM_ID, "Contact us");
    form.elements = (0..elements)
        .map(|_| FormElement::from_template("text"))
        .collect();
    form
}

/// Start an editor over a fresh recording store.
pub async fn open_editor(elements: usize) -> (FormEditor, Arc<RecordingStore>) {
    open_editor_with(draft_with(elements), EditorConfig::default()).await
}

pub async fn open_editor_with(
    form: Form,
    config: EditorConfig,
) -> (FormEditor, Arc<RecordingStore>) {
    let store = RecordingStore::with_form(form).await;
    let editor = FormEditor::load(FORM_ID, store.clone(), config)
        .await
        .unwrap();
    (editor, store)
}

pub fn props(value: serde_json::Value) -> SettingsMap {
    value.as_object().cloned().unwrap()
}
