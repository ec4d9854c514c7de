mod agent_message_repository;
mod benchmark_repository;
mod brief_repository;
mod campaign_repository;
mod founder_note_repository;
mod heuristic_score_repository;
mod idea_route_repository;
mod knowledge_repository;
mod output_repository;
mod phase_run_repository;
mod playbook_snippet_repository;

pub use agent_message_repository::AgentMessageRepository;
pub use benchmark_repository::BenchmarkRepository;
pub use brief_repository::BriefRepository;
pub use campaign_repository::CampaignRepository;
pub use founder_note_repository::FounderNoteRepository;
pub use heuristic_score_repository::HeuristicScoreRepository;
pub use idea_route_repository::IdeaRouteRepository;
pub use knowledge_repository::KnowledgeRepository;
pub use output_repository::OutputRepository;
pub use phase_run_repository::PhaseRunRepository;
pub use playbook_snippet_repository::PlaybookSnippetRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use trudy_core::Campaign;

    use crate::{create_pool, run_migrations, CampaignRepository};

    pub async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn seed_campaign(pool: &SqlitePool) -> Campaign {
        let campaign = Campaign::new("Summer Sizzle", "Grant Burge").with_market("AU");
        CampaignRepository::new(pool.clone())
            .create(&campaign)
            .await
            .unwrap()
    }
}
