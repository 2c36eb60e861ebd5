//! Persistence contract consumed by the editor session.
//!
//! The session never talks to a database or HTTP client directly; it is
//! handed a [`FormPersistence`] implementation at construction. The
//! in-process [`InMemoryFormStore`] backs local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::form::{Form, FormElement, FormStatus};
use crate::types::DbId;

/// Storage backend for forms.
#[async_trait]
pub trait FormPersistence: Send + Sync {
    /// Fetch the current form, elements and settings included.
    async fn load_form(&self, id: DbId) -> Result<Form, CoreError>;

    /// Persist the whole form and return the canonical stored copy.
    async fn save_form(&self, id: DbId, form: &Form) -> Result<Form, CoreError>;

    /// Lightweight periodic save of just the element sequence.
    async fn auto_save_form(&self, id: DbId, elements: &[FormElement]) -> Result<(), CoreError>;

    /// Mark the form published and bump its version.
    async fn publish_form(&self, id: DbId) -> Result<Form, CoreError>;
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "form", id }
}

// ---------------------------------------------------------------------------
// InMemoryFormStore
// ---------------------------------------------------------------------------

/// Process-local form store.
///
/// Thread-safe via interior `RwLock`; share it behind an `Arc`.
#[derive(Default)]
pub struct InMemoryFormStore {
    forms: RwLock<HashMap<DbId, Form>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a form.
    pub async fn insert(&self, form: Form) {
        self.forms.write().await.insert(form.id, form);
    }

    /// Read back a stored form.
    pub async fn get(&self, id: DbId) -> Option<Form> {
        self.forms.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl FormPersistence for InMemoryFormStore {
    async fn load_form(&self, id: DbId) -> Result<Form, CoreError> {
        self.get(id).await.ok_or_else(|| not_found(id))
    }

    async fn save_form(&self, id: DbId, form: &Form) -> Result<Form, CoreError> {
        let mut forms = self.forms.write().await;
        let stored = forms.get_mut(&id).ok_or_else(|| not_found(id))?;
        let now = Utc::now();

        stored.title = form.title.clone();
        stored.description = form.description.clone();
        stored.elements = form.elements.clone();
        stored.settings = form.settings.clone();
        stored.updated_at = now;
        stored.last_saved_at = Some(now);

        Ok(stored.clone())
    }

    async fn auto_save_form(&self, id: DbId, elements: &[FormElement]) -> Result<(), CoreError> {
        let mut forms = self.forms.write().await;
        let stored = forms.get_mut(&id).ok_or_else(|| not_found(id))?;
        let now = Utc::now();

        stored.elements = elements.to_vec();
        stored.updated_at = now;
        stored.last_saved_at = Some(now);
        Ok(())
    }

    async fn publish_form(&self, id: DbId) -> Result<Form, CoreError> {
        let mut forms = self.forms.write().await;
        let stored = forms.get_mut(&id).ok_or_else(|| not_found(id))?;

        if stored.status == FormStatus::Archived {
            return Err(CoreError::Conflict(format!(
                "Form {id} is archived and cannot be published"
            )));
        }

        stored.status = FormStatus::Published;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
