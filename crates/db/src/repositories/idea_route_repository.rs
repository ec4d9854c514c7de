use crate::error::DbError;
use crate::models::IdeaRouteRow;
use chrono::Utc;
use sqlx::SqlitePool;
use trudy_core::IdeaRoute;
use uuid::Uuid;

#[derive(Clone)]
pub struct IdeaRouteRepository {
    pool: SqlitePool,
}

impl IdeaRouteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a route by `(campaign_id, name)`. Returns the stored
    /// row, whose id is the original one when the name already existed.
    pub async fn upsert(&self, route: &IdeaRoute) -> Result<IdeaRoute, DbError> {
        let mut row = IdeaRouteRow::from(route);
        row.updated_at = crate::models::datetime_to_millis(Utc::now());

        let stored: IdeaRouteRow = sqlx::query_as(
            r#"
            INSERT INTO idea_routes (id, campaign_id, name, hook, mechanic, prize, rationale, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(campaign_id, name) DO UPDATE SET
                hook = excluded.hook,
                mechanic = excluded.mechanic,
                prize = excluded.prize,
                rationale = excluded.rationale,
                updated_at = excluded.updated_at
            RETURNING id, campaign_id, name, hook, mechanic, prize, rationale, created_at, updated_at
            "#,
        )
        .bind(&row.id)
        .bind(&row.campaign_id)
        .bind(&row.name)
        .bind(&row.hook)
        .bind(&row.mechanic)
        .bind(&row.prize)
        .bind(&row.rationale)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored.into_domain())
    }

    pub async fn find_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<IdeaRoute>, DbError> {
        let rows: Vec<IdeaRouteRow> = sqlx::query_as(
            r#"
            SELECT id, campaign_id, name, hook, mechanic, prize, rationale, created_at, updated_at
            FROM idea_routes
            WHERE campaign_id = ?
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(campaign_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{seed_campaign, setup_test_db};

    #[tokio::test]
    async fn test_upsert_by_name_keeps_id() {
        let pool = setup_test_db().await;
        let campaign = seed_campaign(&pool).await;
        let repo = IdeaRouteRepository::new(pool);

        let mut route = IdeaRoute::new(campaign.id, "Cellar Door");
        route.hook = "Win the cellar".to_string();
        let first = repo.upsert(&route).await.unwrap();

        let mut again = IdeaRoute::new(campaign.id, "Cellar Door");
        again.hook = "Win the whole cellar".to_string();
        let second = repo.upsert(&again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.hook, "Win the whole cellar");
        assert_eq!(repo.find_by_campaign(campaign.id).await.unwrap().len(), 1);
    }
}
