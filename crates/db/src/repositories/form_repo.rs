//! Repository for the `forms` table.

use formdesk_core::form::{FormElement, FormStatus};
use formdesk_core::settings::FormSettings;
use formdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::form::{CreateForm, FormRow};

/// Column list for `forms` queries.
const COLUMNS: &str = "id, title, description, status, version, elements, settings, \
                       created_at, updated_at, last_saved_at";

/// Provides CRUD operations for forms.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new draft form with default settings merged under `input.settings`.
    pub async fn create(pool: &PgPool, input: &CreateForm) -> Result<FormRow, sqlx::Error> {
        let settings = match &input.settings {
            Some(partial) => FormSettings::with_defaults(partial),
            None => FormSettings::default(),
        };
        let query = format!(
            "INSERT INTO forms (title, description, settings) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(settings.to_value())
            .fetch_one(pool)
            .await
    }

    /// Find a form by id. Returns `None` if absent.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the editable content of a form (explicit save).
    ///
    /// Status and version are untouched; they only change on publish.
    pub async fn save(
        pool: &PgPool,
        id: DbId,
        title: &str,
        description: Option<&str>,
        elements: &[FormElement],
        settings: &FormSettings,
    ) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET \
                 title = $2, description = $3, elements = $4, settings = $5, \
                 updated_at = NOW(), last_saved_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(Json(elements))
            .bind(settings.to_value())
            .fetch_optional(pool)
            .await
    }

    /// Overwrite only the element sequence (autosave). Returns `false` if the
    /// form does not exist.
    pub async fn save_elements(
        pool: &PgPool,
        id: DbId,
        elements: &[FormElement],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE forms SET elements = $2, updated_at = NOW(), last_saved_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(Json(elements))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a non-archived form as published and bump its version.
    ///
    /// Returns `None` when the form is absent or archived.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET status = $2, version = version + 1, updated_at = NOW() \
             WHERE id = $1 AND status <> $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .bind(FormStatus::Published.as_str())
            .bind(FormStatus::Archived.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move a form to the archived status.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .bind(FormStatus::Archived.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a form. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
