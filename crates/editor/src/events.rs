//! Editor notifications for the rendering layer.
//!
//! Persistence happens out-of-band, so its outcome is reported through a
//! `tokio::sync::broadcast` channel rather than a return value. Sending with
//! no subscribers is silently ignored.

use formdesk_core::types::{DbId, Timestamp};
use serde::Serialize;

/// Default buffer capacity for the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outcome of a background or explicit persistence call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A debounced autosave completed. `clean` is false when edits landed
    /// while the save was in flight and the form is still dirty.
    AutoSaved {
        form_id: DbId,
        at: Timestamp,
        clean: bool,
    },
    /// A debounced autosave failed; the form stays dirty.
    AutoSaveFailed { form_id: DbId, error: String },
    /// An explicit save completed.
    Saved { form_id: DbId, version: i32 },
    /// The form was published.
    Published { form_id: DbId, version: i32 },
}
