//! Single-form editor session.
//!
//! [`FormEditor`] owns one form for the lifetime of an editing session. All
//! mutations are synchronous: they lock the session state, apply a pure
//! mutation from [`formdesk_core::elements`] or [`formdesk_core::settings`],
//! and release the lock before returning. Persistence runs out-of-band on the
//! tokio runtime, either through the debounced autosave or an explicit
//! [`save`](FormEditor::save).
//!
//! Each dirty-making mutation bumps a revision counter. A save captures the
//! revision it started from and only clears the dirty flag if no mutation has
//! happened since, so a slow response can never wipe out newer edits.
//!
//! Autosave normally persists only the element sequence. Settings and
//! title/description changes are tracked by a second counter; while any of
//! them is unsaved, autosave writes the whole form through `save_form`
//! instead.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use formdesk_core::element_types;
use formdesk_core::elements::{self, Direction};
use formdesk_core::error::CoreError;
use formdesk_core::form::{validate_title, Form, FormElement, Position};
use formdesk_core::history::History;
use formdesk_core::persistence::FormPersistence;
use formdesk_core::settings::{update_settings, FormSettings, SettingsMap};
use formdesk_core::types::{DbId, ElementId, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use crate::autosave::AutosaveScheduler;
use crate::config::EditorConfig;
use crate::events::{EditorEvent, EVENT_CHANNEL_CAPACITY};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Mutable session state, guarded by one mutex that is never held across an
/// await point.
struct EditorState {
    form: Form,
    history: History<Vec<FormElement>>,
    active: Option<ElementId>,
    dirty: bool,
    /// Incremented by every dirty-making mutation.
    revision: u64,
    /// Incremented by every settings or details change.
    details_revision: u64,
    /// `details_revision` covered by the last successful full save.
    saved_details_revision: u64,
    saves_in_flight: usize,
}

impl EditorState {
    /// Replace the element sequence and record it as a new history entry.
    fn commit_elements(&mut self, next: Vec<FormElement>) {
        self.history.push(next.clone());
        self.form.elements = next;
    }

    /// Swap in a snapshot restored from history.
    fn restore_elements(&mut self, snapshot: Vec<FormElement>) {
        self.form.elements = snapshot;
        if let Some(active) = self.active {
            if self.form.element(active).is_none() {
                self.active = None;
            }
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn mark_details_changed(&mut self) {
        self.details_revision += 1;
    }

    /// Settings or details changed since the last full save.
    fn details_unsaved(&self) -> bool {
        self.details_revision != self.saved_details_revision
    }

    /// Take over the server-owned fields of a fully saved form. The save
    /// covered every details change up to `details_revision`.
    fn adopt_saved(&mut self, saved: &Form, details_revision: u64) {
        self.form.version = saved.version;
        self.form.status = saved.status;
        self.form.created_at = saved.created_at;
        self.form.updated_at = saved.updated_at;
        self.form.last_saved_at = Some(saved.last_saved_at.unwrap_or_else(Utc::now));
        self.saved_details_revision = self.saved_details_revision.max(details_revision);
    }
}

/// State shared between the session handle and its autosave tasks.
struct Shared {
    state: Mutex<EditorState>,
    persistence: Arc<dyn FormPersistence>,
    events: broadcast::Sender<EditorEvent>,
    config: EditorConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EditorEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.events.send(event);
    }

    /// Persist the form if it is still dirty: the elements alone, or the
    /// whole form when settings or details are unsaved.
    async fn run_autosave(&self) {
        let (form, revision, details_revision, full) = {
            let mut state = self.lock();
            if !state.dirty {
                tracing::debug!(form_id = state.form.id, "Autosave skipped, form is clean");
                return;
            }
            state.saves_in_flight += 1;
            (
                state.form.clone(),
                state.revision,
                state.details_revision,
                state.details_unsaved(),
            )
        };
        let form_id = form.id;

        tracing::debug!(
            form_id,
            revision,
            full,
            elements = form.elements.len(),
            "Autosaving form"
        );
        let result = if full {
            self.persistence.save_form(form_id, &form).await.map(Some)
        } else {
            self.persistence
                .auto_save_form(form_id, &form.elements)
                .await
                .map(|()| None)
        };

        let mut state = self.lock();
        state.saves_in_flight -= 1;
        match result {
            Ok(saved) => {
                let now = Utc::now();
                match &saved {
                    Some(saved) => state.adopt_saved(saved, details_revision),
                    None => state.form.last_saved_at = Some(now),
                }
                let clean = state.revision == revision;
                if clean {
                    state.dirty = false;
                }
                drop(state);

                tracing::info!(form_id, revision, full, clean, "Form autosaved");
                self.emit(EditorEvent::AutoSaved {
                    form_id,
                    at: now,
                    clean,
                });
            }
            Err(e) => {
                drop(state);
                tracing::error!(form_id, error = %e, "Autosave failed, changes remain unsaved");
                self.emit(EditorEvent::AutoSaveFailed {
                    form_id,
                    error: e.to_string(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EditorView
// ---------------------------------------------------------------------------

/// Consistent read-only snapshot of the session for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub form: Form,
    pub active_element: Option<ElementId>,
    pub is_dirty: bool,
    pub is_saving: bool,
    pub last_saved_at: Option<Timestamp>,
    pub can_undo: bool,
    pub can_redo: bool,
}

// ---------------------------------------------------------------------------
// FormEditor
// ---------------------------------------------------------------------------

/// Editing session for one form.
///
/// Mutation methods report whether anything changed: `false`/`None` means the
/// call was a no-op (unknown id, boundary move, unchanged value) and neither
/// history nor the dirty flag was touched.
pub struct FormEditor {
    shared: Arc<Shared>,
    autosave: AutosaveScheduler,
}

impl FormEditor {
    /// Load `form_id` through `persistence` and start a session on the
    /// current tokio runtime.
    pub async fn load(
        form_id: DbId,
        persistence: Arc<dyn FormPersistence>,
        config: EditorConfig,
    ) -> Result<Self, CoreError> {
        let form = persistence.load_form(form_id).await?;
        tracing::info!(
            form_id,
            version = form.version,
            elements = form.elements.len(),
            "Editor session started"
        );

        let history = History::new(form.elements.clone(), config.history_limit);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = EditorState {
            form,
            history,
            active: None,
            dirty: false,
            revision: 0,
            details_revision: 0,
            saved_details_revision: 0,
            saves_in_flight: 0,
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                persistence,
                events,
                config,
            }),
            autosave: AutosaveScheduler::new(Handle::current()),
        })
    }

    /// Subscribe to save/publish notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.shared.events.subscribe()
    }

    // ---- queries ----

    pub fn view(&self) -> EditorView {
        let state = self.shared.lock();
        EditorView {
            form: state.form.clone(),
            active_element: state.active,
            is_dirty: state.dirty,
            is_saving: state.saves_in_flight > 0,
            last_saved_at: state.form.last_saved_at,
            can_undo: state.history.can_undo(),
            can_redo: state.history.can_redo(),
        }
    }

    pub fn form(&self) -> Form {
        self.shared.lock().form.clone()
    }

    pub fn elements(&self) -> Vec<FormElement> {
        self.shared.lock().form.elements.clone()
    }

    pub fn settings(&self) -> FormSettings {
        self.shared.lock().form.settings.clone()
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.shared.lock().active
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    pub fn is_saving(&self) -> bool {
        self.shared.lock().saves_in_flight > 0
    }

    pub fn last_saved_at(&self) -> Option<Timestamp> {
        self.shared.lock().form.last_saved_at
    }

    pub fn can_undo(&self) -> bool {
        self.shared.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.shared.lock().history.can_redo()
    }

    /// Number of snapshots currently held by the undo history.
    pub fn history_len(&self) -> usize {
        self.shared.lock().history.len()
    }

    // ---- element mutations ----

    /// Append a new element built from the type's template and select it.
    pub fn add_element(&self, element_type: &str) -> ElementId {
        self.insert_element(element_type, None)
    }

    /// Insert a new element at `index` (drop onto a slot) and select it.
    pub fn add_element_at(&self, element_type: &str, index: usize) -> ElementId {
        self.insert_element(element_type, Some(index))
    }

    fn insert_element(&self, element_type: &str, index: Option<usize>) -> ElementId {
        if !element_types::is_known_type(element_type) {
            tracing::warn!(element_type, "Adding element of unknown type with generic props");
        }
        let (id, delay) = {
            let mut state = self.shared.lock();
            let (next, id) = elements::add(&state.form.elements, element_type, index);
            state.commit_elements(next);
            state.active = Some(id);
            state.mark_dirty();
            (id, self.shared.config.autosave_delay(&state.form.settings))
        };
        self.arm_autosave(delay);
        tracing::debug!(element_id = %id, element_type, "Element added");
        id
    }

    /// Shallow-merge `patch` into the props of element `id`.
    pub fn update_element(&self, id: ElementId, patch: &Map<String, Value>) -> bool {
        self.mutate(|state| {
            let next = elements::update(&state.form.elements, id, patch)?;
            state.commit_elements(next);
            Some(())
        })
        .is_some()
    }

    /// Remove element `id`, clearing the selection if it pointed there.
    pub fn delete_element(&self, id: ElementId) -> bool {
        self.mutate(|state| {
            let next = elements::delete(&state.form.elements, id)?;
            state.commit_elements(next);
            if state.active == Some(id) {
                state.active = None;
            }
            Some(())
        })
        .is_some()
    }

    /// Copy element `id` directly after itself and select the copy.
    pub fn duplicate_element(&self, id: ElementId) -> Option<ElementId> {
        let offset = self.shared.config.duplicate_offset;
        self.mutate(|state| {
            let (next, copy_id) = elements::duplicate(&state.form.elements, id, offset)?;
            state.commit_elements(next);
            state.active = Some(copy_id);
            Some(copy_id)
        })
    }

    /// Move element `id` one slot in `direction`.
    pub fn move_element(&self, id: ElementId, direction: Direction) -> bool {
        self.mutate(|state| {
            let next = elements::move_element(&state.form.elements, id, direction)?;
            state.commit_elements(next);
            Some(())
        })
        .is_some()
    }

    /// Move element `id` up to `steps` slots as repeated single-step moves,
    /// clamped to the room available. Returns the number of steps taken.
    pub fn jump_element(&self, id: ElementId, direction: Direction, steps: usize) -> usize {
        let room = {
            let state = self.shared.lock();
            elements::room(&state.form.elements, id, direction).unwrap_or(0)
        };
        let mut moved = 0;
        for _ in 0..steps.min(room) {
            if !self.move_element(id, direction) {
                break;
            }
            moved += 1;
        }
        moved
    }

    /// Move the element at `from` to `to` in a single rebuild.
    pub fn reorder_elements(&self, from: usize, to: usize) -> bool {
        self.mutate(|state| {
            let next = elements::reorder(&state.form.elements, from, to)?;
            state.commit_elements(next);
            Some(())
        })
        .is_some()
    }

    /// Drag-and-drop path: move element `id` to slot `index`.
    pub fn drop_element(&self, id: ElementId, index: usize) -> bool {
        self.mutate(|state| {
            let next = elements::move_to_index(&state.form.elements, id, index)?;
            state.commit_elements(next);
            Some(())
        })
        .is_some()
    }

    /// Set the canvas position hint of element `id`.
    pub fn reposition_element(&self, id: ElementId, position: Position) -> bool {
        self.mutate(|state| {
            let next = elements::reposition(&state.form.elements, id, position)?;
            state.commit_elements(next);
            Some(())
        })
        .is_some()
    }

    /// Change the active selection. Selecting an unknown id is a no-op.
    ///
    /// Selection is view state: it never marks the form dirty.
    pub fn select_element(&self, id: Option<ElementId>) -> bool {
        let mut state = self.shared.lock();
        if let Some(id) = id {
            if state.form.element(id).is_none() {
                return false;
            }
        }
        if state.active == id {
            return false;
        }
        state.active = id;
        true
    }

    // ---- settings and details ----

    /// Merge a partial settings update. Not recorded in undo history.
    pub fn update_settings(&self, patch: &SettingsMap) -> bool {
        self.mutate(|state| {
            let next = update_settings(&state.form.settings, patch);
            if next == state.form.settings {
                return None;
            }
            state.form.settings = next;
            state.mark_details_changed();
            Some(())
        })
        .is_some()
    }

    /// Change the title and description. Not recorded in undo history.
    pub fn update_details(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<bool, CoreError> {
        validate_title(title)?;
        let changed = self
            .mutate(|state| {
                if state.form.title == title && state.form.description.as_deref() == description {
                    return None;
                }
                state.form.title = title.to_string();
                state.form.description = description.map(str::to_string);
                state.mark_details_changed();
                Some(())
            })
            .is_some();
        Ok(changed)
    }

    // ---- history ----

    /// Restore the previous element snapshot.
    pub fn undo(&self) -> bool {
        self.mutate(|state| {
            let snapshot = state.history.undo()?;
            state.restore_elements(snapshot);
            Some(())
        })
        .is_some()
    }

    /// Re-apply the next element snapshot.
    pub fn redo(&self) -> bool {
        self.mutate(|state| {
            let snapshot = state.history.redo()?;
            state.restore_elements(snapshot);
            Some(())
        })
        .is_some()
    }

    // ---- persistence ----

    /// Save the whole form now, bypassing the debounce.
    ///
    /// Adopts the server's version, status and timestamps. Clears the dirty
    /// flag unless edits landed while the save was in flight, in which case
    /// autosave is re-armed. Errors are returned to the caller and leave the
    /// form dirty.
    pub async fn save(&self) -> Result<Form, CoreError> {
        self.autosave.cancel_pending();

        let (form, revision, details_revision) = {
            let mut state = self.shared.lock();
            state.saves_in_flight += 1;
            (state.form.clone(), state.revision, state.details_revision)
        };
        let form_id = form.id;

        let result = self.shared.persistence.save_form(form_id, &form).await;

        let rearm = {
            let mut state = self.shared.lock();
            state.saves_in_flight -= 1;
            match &result {
                Ok(saved) => {
                    state.adopt_saved(saved, details_revision);
                    if state.revision == revision {
                        state.dirty = false;
                        None
                    } else {
                        Some(self.shared.config.autosave_delay(&state.form.settings))
                    }
                }
                Err(_) => None,
            }
        };

        match result {
            Ok(saved) => {
                tracing::info!(form_id, version = saved.version, "Form saved");
                if let Some(delay) = rearm {
                    tracing::debug!(form_id, "Edits landed during save, re-arming autosave");
                    self.arm_autosave(delay);
                }
                self.shared.emit(EditorEvent::Saved {
                    form_id,
                    version: saved.version,
                });
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(form_id, error = %e, "Failed to save form");
                Err(e)
            }
        }
    }

    /// Publish the form. Pending edits are not saved implicitly.
    pub async fn publish(&self) -> Result<Form, CoreError> {
        let form_id = self.shared.lock().form.id;

        let published = self
            .shared
            .persistence
            .publish_form(form_id)
            .await
            .map_err(|e| {
                tracing::error!(form_id, error = %e, "Failed to publish form");
                e
            })?;

        {
            let mut state = self.shared.lock();
            state.form.status = published.status;
            state.form.version = published.version;
            state.form.updated_at = published.updated_at;
        }

        tracing::info!(form_id, version = published.version, "Form published");
        self.shared.emit(EditorEvent::Published {
            form_id,
            version: published.version,
        });
        Ok(published)
    }

    /// Discard local state and load the persisted form again. Unsaved edits
    /// and the undo history are dropped.
    pub async fn reload(&self) -> Result<Form, CoreError> {
        self.autosave.cancel_pending();
        let form_id = self.shared.lock().form.id;
        let form = self.shared.persistence.load_form(form_id).await?;

        let mut state = self.shared.lock();
        if state.dirty {
            tracing::warn!(form_id, "Discarding unsaved changes on reload");
        }
        state.history.reset(form.elements.clone());
        state.form = form.clone();
        state.active = None;
        state.dirty = false;
        state.revision += 1;
        state.saved_details_revision = state.details_revision;
        drop(state);

        tracing::info!(form_id, version = form.version, "Form reloaded");
        Ok(form)
    }

    /// End the session: cancel any pending autosave timer. A save already in
    /// flight still completes.
    pub fn shutdown(&self) {
        let state = self.shared.lock();
        if state.dirty {
            tracing::warn!(form_id = state.form.id, "Editor closed with unsaved changes");
        }
        drop(state);
        self.autosave.shutdown();
    }

    // ---- private helpers ----

    /// Run `f` under the state lock. When it reports a change, mark the form
    /// dirty and re-arm the autosave timer.
    fn mutate<R>(&self, f: impl FnOnce(&mut EditorState) -> Option<R>) -> Option<R> {
        let (result, delay) = {
            let mut state = self.shared.lock();
            let result = f(&mut state)?;
            state.mark_dirty();
            (result, self.shared.config.autosave_delay(&state.form.settings))
        };
        self.arm_autosave(delay);
        Some(result)
    }

    fn arm_autosave(&self, delay: std::time::Duration) {
        let shared = Arc::clone(&self.shared);
        self.autosave
            .schedule(delay, move || async move { shared.run_autosave().await });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
