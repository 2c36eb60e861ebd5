//! Form editor session.
//!
//! Exposes the building blocks the rendering layer drives (session, commands,
//! events, config) so integration tests and the replay binary can both use
//! them.
//!
//! - [`FormEditor`]: owns one form, its undo/redo history and dirty state.
//! - [`AutosaveScheduler`]: trailing-debounce timer that persists edits.
//! - [`EditorCommand`]: serializable intents applied via [`FormEditor::apply`].
//! - [`EditorEvent`]: save/publish notifications broadcast to subscribers.

pub mod autosave;
pub mod commands;
pub mod config;
pub mod events;
pub mod session;

pub use autosave::AutosaveScheduler;
pub use commands::{CommandOutcome, EditorCommand};
pub use config::EditorConfig;
pub use events::EditorEvent;
pub use session::{EditorView, FormEditor};
