//! Form aggregate and element entity models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::element_types;
use crate::error::CoreError;
use crate::settings::FormSettings;
use crate::types::{DbId, ElementId, Timestamp};

/// Maximum length of a form title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// FormStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl FormStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Published => "published",
            FormStatus::Archived => "archived",
        }
    }

    /// Parse the database representation of a status.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(FormStatus::Draft),
            "published" => Ok(FormStatus::Published),
            "archived" => Ok(FormStatus::Archived),
            other => Err(CoreError::Validation(format!(
                "Invalid form status '{other}'. Must be one of: draft, published, archived"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// 2D placement hint for the designer canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift by the same delta on both axes.
    pub fn offset(self, delta: f64) -> Self {
        Self {
            x: self.x + delta,
            y: self.y + delta,
        }
    }
}

// ---------------------------------------------------------------------------
// FormElement
// ---------------------------------------------------------------------------

/// One field or widget instance on a form.
///
/// `id` and `element_type` are fixed at construction; changing the type of
/// a field means deleting it and adding a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    id: ElementId,
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl FormElement {
    /// Create an element with explicit props.
    pub fn new(
        id: ElementId,
        element_type: impl Into<String>,
        props: Map<String, Value>,
        position: Position,
    ) -> Self {
        Self {
            id,
            element_type: element_type.into(),
            props,
            position,
        }
    }

    /// Create an element with a fresh id and the type's default props.
    pub fn from_template(element_type: &str) -> Self {
        let id = ElementId::new_v4();
        let props = element_types::default_props(element_type, &id);
        Self::new(id, element_type, props, Position::default())
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Copy this element under a new identity, shifted by `offset`.
    pub fn duplicate(&self, offset: f64) -> Self {
        Self {
            id: ElementId::new_v4(),
            element_type: self.element_type.clone(),
            props: self.props.clone(),
            position: self.position.offset(offset),
        }
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// The form aggregate: metadata, the ordered element sequence and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub version: i32,
    pub elements: Vec<FormElement>,
    pub settings: FormSettings,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_saved_at: Option<Timestamp>,
}

impl Form {
    /// A brand-new draft with default settings and no elements.
    pub fn new_draft(id: DbId, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            status: FormStatus::Draft,
            version: 1,
            elements: Vec::new(),
            settings: FormSettings::default(),
            created_at: now,
            updated_at: now,
            last_saved_at: None,
        }
    }

    /// Find an element by id.
    pub fn element(&self, id: ElementId) -> Option<&FormElement> {
        self.elements.iter().find(|el| el.id() == id)
    }
}

/// Validate a form title: non-blank and at most [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Form title must not be empty".to_string()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Form title is {len} characters, exceeding the maximum of {MAX_TITLE_LEN}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
