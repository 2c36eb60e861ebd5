//! Serializable editor intents.
//!
//! The rendering layer (or a replay script) describes what the user did as an
//! [`EditorCommand`]; [`FormEditor::apply`] dispatches it to the matching
//! session method.

use formdesk_core::elements::Direction;
use formdesk_core::error::CoreError;
use formdesk_core::form::Position;
use formdesk_core::types::ElementId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::FormEditor;

/// One user intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorCommand {
    AddElement {
        element_type: String,
        #[serde(default)]
        index: Option<usize>,
    },
    UpdateElement {
        id: ElementId,
        props: Map<String, Value>,
    },
    DeleteElement {
        id: ElementId,
    },
    DuplicateElement {
        id: ElementId,
    },
    MoveElement {
        id: ElementId,
        direction: Direction,
    },
    JumpElement {
        id: ElementId,
        direction: Direction,
        steps: usize,
    },
    ReorderElements {
        from: usize,
        to: usize,
    },
    DropElement {
        id: ElementId,
        index: usize,
    },
    RepositionElement {
        id: ElementId,
        position: Position,
    },
    SelectElement {
        #[serde(default)]
        id: Option<ElementId>,
    },
    UpdateSettings {
        patch: Map<String, Value>,
    },
    UpdateDetails {
        title: String,
        #[serde(default)]
        description: Option<String>,
    },
    Undo,
    Redo,
}

/// What applying a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The form changed.
    Applied,
    /// A new element was created (add or duplicate).
    Created { id: ElementId },
    /// A jump moved the element this many slots.
    Moved { steps: usize },
    /// Nothing changed.
    NoOp,
}

impl CommandOutcome {
    fn from_changed(changed: bool) -> Self {
        if changed {
            CommandOutcome::Applied
        } else {
            CommandOutcome::NoOp
        }
    }
}

impl FormEditor {
    /// Dispatch a command to the matching mutation.
    ///
    /// Only [`EditorCommand::UpdateDetails`] can fail (title validation);
    /// everything else degrades to [`CommandOutcome::NoOp`].
    pub fn apply(&self, command: EditorCommand) -> Result<CommandOutcome, CoreError> {
        let outcome = match command {
            EditorCommand::AddElement {
                element_type,
                index,
            } => {
                let id = match index {
                    Some(index) => self.add_element_at(&element_type, index),
                    None => self.add_element(&element_type),
                };
                CommandOutcome::Created { id }
            }
            EditorCommand::UpdateElement { id, props } => {
                CommandOutcome::from_changed(self.update_element(id, &props))
            }
            EditorCommand::DeleteElement { id } => {
                CommandOutcome::from_changed(self.delete_element(id))
            }
            EditorCommand::DuplicateElement { id } => match self.duplicate_element(id) {
                Some(id) => CommandOutcome::Created { id },
                None => CommandOutcome::NoOp,
            },
            EditorCommand::MoveElement { id, direction } => {
                CommandOutcome::from_changed(self.move_element(id, direction))
            }
            EditorCommand::JumpElement {
                id,
                direction,
                steps,
            } => match self.jump_element(id, direction, steps) {
                0 => CommandOutcome::NoOp,
                steps => CommandOutcome::Moved { steps },
            },
            EditorCommand::ReorderElements { from, to } => {
                CommandOutcome::from_changed(self.reorder_elements(from, to))
            }
            EditorCommand::DropElement { id, index } => {
                CommandOutcome::from_changed(self.drop_element(id, index))
            }
            EditorCommand::RepositionElement { id, position } => {
                CommandOutcome::from_changed(self.reposition_element(id, position))
            }
            EditorCommand::SelectElement { id } => {
                CommandOutcome::from_changed(self.select_element(id))
            }
            EditorCommand::UpdateSettings { patch } => {
                CommandOutcome::from_changed(self.update_settings(&patch))
            }
            EditorCommand::UpdateDetails { title, description } => {
                CommandOutcome::from_changed(self.update_details(&title, description.as_deref())?)
            }
            EditorCommand::Undo => CommandOutcome::from_changed(self.undo()),
            EditorCommand::Redo => CommandOutcome::from_changed(self.redo()),
        };
        Ok(outcome)
    }
}
