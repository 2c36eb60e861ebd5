//! Form entity model and DTOs.

use formdesk_core::error::CoreError;
use formdesk_core::form::{Form, FormElement, FormStatus};
use formdesk_core::settings::FormSettings;
use formdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub version: i32,
    pub elements: serde_json::Value,
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_saved_at: Option<Timestamp>,
}

impl FormRow {
    /// Convert into the domain aggregate.
    ///
    /// Settings are merged onto the defaults, so partial or malformed stored
    /// settings never fail the load. Elements must deserialize.
    pub fn into_form(self) -> Result<Form, CoreError> {
        let status = FormStatus::parse(&self.status)
            .map_err(|e| CoreError::Internal(format!("Form {}: {e}", self.id)))?;
        let elements: Vec<FormElement> = serde_json::from_value(self.elements).map_err(|e| {
            CoreError::Internal(format!("Form {} has malformed elements: {e}", self.id))
        })?;

        Ok(Form {
            id: self.id,
            title: self.title,
            description: self.description,
            status,
            version: self.version,
            elements,
            settings: FormSettings::with_defaults(&self.settings),
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_saved_at: self.last_saved_at,
        })
    }
}

/// DTO for creating a new form.
#[derive(Debug, Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    /// Partial settings; merged onto the defaults before insert.
    pub settings: Option<serde_json::Value>,
}
