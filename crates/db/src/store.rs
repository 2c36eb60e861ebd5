//! [`FormPersistence`] backed by the `forms` table.

use async_trait::async_trait;
use formdesk_core::error::CoreError;
use formdesk_core::form::{Form, FormElement};
use formdesk_core::persistence::FormPersistence;
use formdesk_core::types::DbId;

use crate::models::form::FormRow;
use crate::repositories::FormRepo;
use crate::DbPool;

/// Postgres-backed form store handed to editor sessions.
#[derive(Clone)]
pub struct PgFormStore {
    pool: DbPool,
}

impl PgFormStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "form", id }
}

/// Map a sqlx error onto the domain error, logging anything unexpected.
fn db_error(id: DbId, err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::RowNotFound => not_found(id),
        other => {
            tracing::error!(form_id = id, error = %other, "Database error");
            CoreError::Internal(format!("Database error: {other}"))
        }
    }
}

fn into_form(id: DbId, row: Option<FormRow>) -> Result<Form, CoreError> {
    row.ok_or_else(|| not_found(id))?.into_form()
}

#[async_trait]
impl FormPersistence for PgFormStore {
    async fn load_form(&self, id: DbId) -> Result<Form, CoreError> {
        let row = FormRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| db_error(id, e))?;
        into_form(id, row)
    }

    async fn save_form(&self, id: DbId, form: &Form) -> Result<Form, CoreError> {
        let row = FormRepo::save(
            &self.pool,
            id,
            &form.title,
            form.description.as_deref(),
            &form.elements,
            &form.settings,
        )
        .await
        .map_err(|e| db_error(id, e))?;
        into_form(id, row)
    }

    async fn auto_save_form(&self, id: DbId, elements: &[FormElement]) -> Result<(), CoreError> {
        let updated = FormRepo::save_elements(&self.pool, id, elements)
            .await
            .map_err(|e| db_error(id, e))?;
        if updated {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    async fn publish_form(&self, id: DbId) -> Result<Form, CoreError> {
        let row = FormRepo::publish(&self.pool, id)
            .await
            .map_err(|e| db_error(id, e))?;
        match row {
            Some(row) => row.into_form(),
            None => {
                // Either absent or archived; tell the two apart.
                let existing = FormRepo::find_by_id(&self.pool, id)
                    .await
                    .map_err(|e| db_error(id, e))?;
                match existing {
                    Some(_) => Err(CoreError::Conflict(format!(
                        "Form {id} is archived and cannot be published"
                    ))),
                    None => Err(not_found(id)),
                }
            }
        }
    }
}
