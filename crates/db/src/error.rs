use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(Uuid),

    #[error("Run '{label}' is already in progress for campaign {campaign_id}")]
    PhaseRunActive { campaign_id: Uuid, label: String },

    #[error("Database schema is missing tables: {}", .0.join(", "))]
    SchemaMissing(Vec<String>),
}

/// SQLite result codes that clear up on their own: BUSY, LOCKED and their
/// extended variants.
const TRANSIENT_SQLITE_CODES: &[&str] = &["5", "6", "261", "262", "517"];

impl DbError {
    /// Whether the failure is a connection-level hiccup worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::PoolTimedOut) | DbError::Sqlx(sqlx::Error::Io(_)) => true,
            DbError::Sqlx(sqlx::Error::Database(err)) => err
                .code()
                .as_deref()
                .is_some_and(|code| TRANSIENT_SQLITE_CODES.contains(&code)),
            _ => false,
        }
    }

    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}
