use crate::error::DbError;
use crate::models::{datetime_to_millis, PhaseRunRow};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use trudy_core::{PhaseRun, PhaseRunStatus};
use uuid::Uuid;

const PHASE_RUN_COLUMNS: &str =
    "id, campaign_id, phase, status, label, error, started_at, finished_at";

#[derive(Clone)]
pub struct PhaseRunRepository {
    pool: SqlitePool,
}

impl PhaseRunRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new RUNNING row. Fails with `PhaseRunActive` when the same
    /// runner is already RUNNING for the campaign.
    pub async fn start(&self, run: &PhaseRun) -> Result<PhaseRun, DbError> {
        let row = PhaseRunRow::from(run);

        let result = sqlx::query(
            r#"
            INSERT INTO phase_runs (id, campaign_id, phase, status, label, error, started_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.campaign_id)
        .bind(&row.phase)
        .bind(&row.status)
        .bind(&row.label)
        .bind(&row.error)
        .bind(row.started_at)
        .bind(row.finished_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(run.clone()),
            Err(err) if DbError::is_unique_violation(&err) => Err(DbError::PhaseRunActive {
                campaign_id: run.campaign_id,
                label: run.label.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn finish(&self, run: &PhaseRun) -> Result<(), DbError> {
        let row = PhaseRunRow::from(run);

        sqlx::query("UPDATE phase_runs SET status = ?, error = ?, finished_at = ? WHERE id = ?")
            .bind(&row.status)
            .bind(&row.error)
            .bind(row.finished_at)
            .bind(&row.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark RUNNING rows for a runner started before `cutoff` as ABANDONED.
    pub async fn abandon_stale(
        &self,
        campaign_id: Uuid,
        label: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE phase_runs
            SET status = ?, error = 'abandoned: exceeded run window', finished_at = ?
            WHERE campaign_id = ? AND label = ? AND status = ? AND started_at < ?
            "#,
        )
        .bind(PhaseRunStatus::Abandoned.as_str())
        .bind(datetime_to_millis(Utc::now()))
        .bind(campaign_id.to_string())
        .bind(label)
        .bind(PhaseRunStatus::Running.as_str())
        .bind(datetime_to_millis(cutoff))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PhaseRun>, DbError> {
        let row: Option<PhaseRunRow> = sqlx::query_as(&format!(
            "SELECT {PHASE_RUN_COLUMNS} FROM phase_runs WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_domain()))
    }

    /// Most recent first.
    pub async fn find_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<PhaseRun>, DbError> {
        let rows: Vec<PhaseRunRow> = sqlx::query_as(&format!(
            "SELECT {PHASE_RUN_COLUMNS} FROM phase_runs WHERE campaign_id = ? ORDER BY started_at DESC"
        ))
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}
