/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Form elements are identified client-side, before they ever reach the database.
pub type ElementId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
