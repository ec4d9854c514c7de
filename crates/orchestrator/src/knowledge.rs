use chrono::Utc;
use db::KnowledgeRepository;
use llm::{ChatModel, ChatRequest};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trudy_core::{Agent, KnowledgeEntry, KnowledgeKind};

use crate::error::Result;
use crate::parse::ResponseParser;
use crate::payloads::KnowledgePayload;
use crate::prompts::PhasePrompts;

const RUNNER: &str = "knowledge";
const KNOWLEDGE_MAX_TOKENS: u32 = 600;

/// Cached model summaries of brands and prizes, keyed by subject and market.
pub struct KnowledgeService {
    repo: KnowledgeRepository,
    model: Arc<dyn ChatModel>,
    model_name: String,
}

impl KnowledgeService {
    pub fn new(pool: SqlitePool, model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
        Self {
            repo: KnowledgeRepository::new(pool),
            model,
            model_name: model_name.into(),
        }
    }

    pub async fn brand(&self, brand: &str, market: &str, refresh: bool) -> Option<KnowledgeEntry> {
        self.lookup(KnowledgeKind::Brand, brand, market, refresh).await
    }

    pub async fn prize(&self, prize: &str, market: &str, refresh: bool) -> Option<KnowledgeEntry> {
        self.lookup(KnowledgeKind::Prize, prize, market, refresh).await
    }

    async fn lookup(
        &self,
        kind: KnowledgeKind,
        subject: &str,
        market: &str,
        refresh: bool,
    ) -> Option<KnowledgeEntry> {
        let subject = subject.trim();
        if subject.is_empty() {
            return None;
        }
        match self.try_lookup(kind, subject, market, refresh).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(kind = kind.as_str(), subject, market, error = %e, "Knowledge lookup failed");
                None
            }
        }
    }

    async fn try_lookup(
        &self,
        kind: KnowledgeKind,
        subject: &str,
        market: &str,
        refresh: bool,
    ) -> Result<KnowledgeEntry> {
        let slug = KnowledgeEntry::slug_for(subject, market);

        if !refresh {
            if let Some(entry) = self.repo.find(kind, &slug).await? {
                debug!(kind = kind.as_str(), %slug, "Knowledge cache hit");
                return Ok(entry);
            }
        }

        let request = ChatRequest::new(&self.model_name)
            .with_system(PhasePrompts::persona(Agent::Researcher))
            .with_user(PhasePrompts::knowledge(kind, subject, market))
            .with_json()
            .with_max_tokens(KNOWLEDGE_MAX_TOKENS)
            .with_metadata("runner", RUNNER)
            .with_metadata("kind", kind.as_str())
            .with_metadata("slug", slug.as_str());

        let content = self.model.complete(request).await?;
        let payload: KnowledgePayload = ResponseParser::parse(RUNNER, &content)?;

        let entry = KnowledgeEntry {
            kind,
            slug,
            subject: subject.to_string(),
            market: market.to_string(),
            summary: payload.summary.trim().to_string(),
            payload: serde_json::to_value(&payload)?,
            updated_at: Utc::now(),
        };
        if self.model.is_fake() {
            debug!(kind = kind.as_str(), slug = %entry.slug, "Fake run, knowledge entry not stored");
            return Ok(entry);
        }
        self.repo.upsert(&entry).await?;

        info!(kind = kind.as_str(), slug = %entry.slug, refresh, "Knowledge entry stored");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{setup_test_db, ScriptedModel};

    #[tokio::test]
    async fn test_lookup_caches_entry() {
        let pool = setup_test_db().await;
        let model = Arc::new(ScriptedModel::new().on(
            RUNNER,
            r#"{"summary": "Barossa winemaker since 1988.", "facts": ["Family owned"]}"#,
        ));
        let service = KnowledgeService::new(pool, model.clone(), "gpt-4o");

        let first = service.brand("Grant Burge", "AU", false).await.unwrap();
        assert_eq!(first.slug, "grant-burge-au");
        assert_eq!(first.summary, "Barossa winemaker since 1988.");

        let second = service.brand("Grant Burge", "AU", false).await.unwrap();
        assert_eq!(second.summary, first.summary);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let pool = setup_test_db().await;
        let model = Arc::new(ScriptedModel::new().on(RUNNER, r#"{"summary": "A trip."}"#));
        let service = KnowledgeService::new(pool, model.clone(), "gpt-4o");

        service.prize("Weekend away", "AU", false).await.unwrap();
        service.prize("Weekend away", "AU", true).await.unwrap();
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_fake_runs_do_not_populate_cache() {
        let pool = setup_test_db().await;
        let gateway = llm::ChatGateway::new(llm::GatewayConfig {
            fake_runs: true,
            ..Default::default()
        });
        let service = KnowledgeService::new(pool.clone(), Arc::new(gateway), "gpt-4o");

        let entry = service.brand("Grant Burge", "AU", false).await.unwrap();
        assert_eq!(entry.slug, "grant-burge-au");

        let cached = KnowledgeRepository::new(pool)
            .find(KnowledgeKind::Brand, "grant-burge-au")
            .await
            .unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_failures_yield_none() {
        let pool = setup_test_db().await;
        let model = Arc::new(ScriptedModel::new().on(RUNNER, "not json at all"));
        let service = KnowledgeService::new(pool, model.clone(), "gpt-4o");

        assert!(service.brand("Grant Burge", "AU", false).await.is_none());
        assert!(service.brand("   ", "AU", false).await.is_none());
        assert_eq!(model.calls(), 1);
    }
}
