//! Form-authoring domain core.
//!
//! Zero internal dependencies: the entity model, settings merge rules,
//! undo/redo history, element mutations and the persistence contract all
//! live here so both the editor session and the database adapter can share
//! them.

pub mod element_types;
pub mod elements;
pub mod error;
pub mod form;
pub mod history;
pub mod persistence;
pub mod settings;
pub mod types;
