//! Headless editor runner.
//!
//! Opens one form from Postgres, replays a JSON array of [`EditorCommand`]s
//! against it, then performs an explicit save.
//!
//! | Env Var        | Required | Meaning                                   |
//! |----------------|----------|-------------------------------------------|
//! | `DATABASE_URL` | yes      | Postgres connection string                |
//! | `FORM_ID`      | yes      | Id of the form to edit                    |
//! | `FORM_SCRIPT`  | yes      | Path to a JSON file of editor commands    |

use std::sync::Arc;

use anyhow::Context;
use formdesk_core::types::DbId;
use formdesk_db::PgFormStore;
use formdesk_editor::{EditorCommand, EditorConfig, FormEditor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formdesk_editor=debug,formdesk_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let form_id: DbId = std::env::var("FORM_ID")
        .context("FORM_ID must be set")?
        .parse()
        .context("FORM_ID must be an integer")?;
    let script_path = std::env::var("FORM_SCRIPT").context("FORM_SCRIPT must be set")?;

    let pool = formdesk_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    formdesk_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    formdesk_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let raw = tokio::fs::read_to_string(&script_path)
        .await
        .with_context(|| format!("Failed to read command script {script_path}"))?;
    let script: Vec<EditorCommand> =
        serde_json::from_str(&raw).context("Command script is not a JSON array of commands")?;

    let store = Arc::new(PgFormStore::new(pool));
    let editor = FormEditor::load(form_id, store, EditorConfig::from_env())
        .await
        .with_context(|| format!("Failed to open form {form_id}"))?;
    tracing::info!(form_id, commands = script.len(), "Replaying command script");

    for (step, command) in script.into_iter().enumerate() {
        match editor.apply(command) {
            Ok(outcome) => tracing::debug!(step, ?outcome, "Command applied"),
            Err(e) => tracing::warn!(step, error = %e, "Command rejected"),
        }
    }

    let saved = editor.save().await.context("Failed to save form")?;
    tracing::info!(
        form_id,
        version = saved.version,
        elements = saved.elements.len(),
        "Form saved"
    );

    editor.shutdown();
    Ok(())
}
