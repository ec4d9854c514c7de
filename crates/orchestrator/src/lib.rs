pub mod context;
pub mod enrich;
pub mod error;
pub mod executor;
pub mod export;
pub mod knowledge;
pub mod parse;
pub mod payloads;
pub mod phases;
pub mod prompts;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{CampaignContext, Enrichment};
pub use error::{OrchestratorError, Result};
pub use executor::{
    ModelConfig, Orchestrator, OrchestratorConfig, PhaseOutcome, ResearchRefresh, DEFAULT_MODEL,
};
pub use export::{ProofExporter, ProofFile, EXPORT_URL_PREFIX};
pub use knowledge::KnowledgeService;
pub use runner::{PhaseArtifacts, PhaseRunner, ScoredRoute};
