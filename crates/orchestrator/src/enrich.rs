use db::{BenchmarkRepository, FounderNoteRepository, PlaybookSnippetRepository};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use chrono::Utc;
use serde_json::json;
use trudy_core::{KnowledgeEntry, KnowledgeKind, PlaybookSnippet, ASSET_RESEARCH_OVERRIDES};

use crate::context::{CampaignContext, Enrichment};
use crate::knowledge::KnowledgeService;

const MAX_PLAYBOOK_SNIPPETS: usize = 5;

/// Attaches reference data to a campaign context. Every lookup is
/// best-effort: a failure is logged and leaves that part empty.
pub struct ContextEnricher {
    founder_notes: FounderNoteRepository,
    benchmarks: BenchmarkRepository,
    playbook: PlaybookSnippetRepository,
}

impl ContextEnricher {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            founder_notes: FounderNoteRepository::new(pool.clone()),
            benchmarks: BenchmarkRepository::new(pool.clone()),
            playbook: PlaybookSnippetRepository::new(pool),
        }
    }

    pub async fn enrich(
        &self,
        ctx: CampaignContext,
        knowledge: &KnowledgeService,
    ) -> CampaignContext {
        let campaign_id = ctx.campaign.id;
        let market = ctx.market().to_string();
        let category = ctx.category().map(str::to_string);

        let founder_notes = self
            .founder_notes
            .find_for(Some(&market), category.as_deref())
            .await
            .unwrap_or_else(|e| {
                warn!(%campaign_id, error = %e, "Founder notes lookup failed");
                Vec::new()
            });

        let benchmark = match category.as_deref() {
            Some(category) => self
                .benchmarks
                .find(&market, category)
                .await
                .unwrap_or_else(|e| {
                    warn!(%campaign_id, error = %e, "Benchmark lookup failed");
                    None
                }),
            None => None,
        };

        let playbook = match self.playbook.find_all().await {
            Ok(snippets) => {
                select_playbook(snippets, &market, category.as_deref(), ctx.campaign.mode.as_str())
            }
            Err(e) => {
                warn!(%campaign_id, error = %e, "Playbook lookup failed");
                Vec::new()
            }
        };

        let brand = match (research_override(&ctx, KnowledgeKind::Brand), ctx.spec.brand.as_deref()) {
            (Some(entry), _) => Some(entry),
            (None, Some(brand)) => knowledge.brand(brand, &market, false).await,
            (None, None) => None,
        };
        let prize = match (research_override(&ctx, KnowledgeKind::Prize), ctx.spec.prize.as_deref()) {
            (Some(entry), _) => Some(entry),
            (None, Some(prize)) => knowledge.prize(prize, &market, false).await,
            (None, None) => None,
        };

        debug!(
            %campaign_id,
            founder_notes = founder_notes.len(),
            benchmark = benchmark.is_some(),
            playbook = playbook.len(),
            brand = brand.is_some(),
            prize = prize.is_some(),
            "Context enriched"
        );

        ctx.with_enrichment(Enrichment {
            founder_notes,
            benchmark,
            playbook,
            brand,
            prize,
        })
    }
}

/// A team-written summary under `assets.researchOverrides.{brand,prize}`
/// replaces the model lookup for that subject.
fn research_override(ctx: &CampaignContext, kind: KnowledgeKind) -> Option<KnowledgeEntry> {
    let key = match kind {
        KnowledgeKind::Brand => "brand",
        KnowledgeKind::Prize => "prize",
    };
    let summary = ctx
        .brief
        .asset(ASSET_RESEARCH_OVERRIDES)?
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let subject = match kind {
        KnowledgeKind::Brand => ctx.spec.brand.clone(),
        KnowledgeKind::Prize => ctx.spec.prize.clone(),
    }
    .unwrap_or_default();

    Some(KnowledgeEntry {
        kind,
        slug: KnowledgeEntry::slug_for(&subject, ctx.market()),
        subject,
        market: ctx.market().to_string(),
        summary: summary.to_string(),
        payload: json!({ "source": "override" }),
        updated_at: Utc::now(),
    })
}

/// Untagged snippets apply everywhere; tagged ones must name the market,
/// the category or the campaign mode.
fn select_playbook(
    snippets: Vec<PlaybookSnippet>,
    market: &str,
    category: Option<&str>,
    mode: &str,
) -> Vec<PlaybookSnippet> {
    snippets
        .into_iter()
        .filter(|snippet| {
            snippet.tags.is_empty()
                || snippet.tags.iter().any(|tag| {
                    tag.eq_ignore_ascii_case(market)
                        || tag.eq_ignore_ascii_case(mode)
                        || category.is_some_and(|c| tag.eq_ignore_ascii_case(c))
                })
        })
        .take(MAX_PLAYBOOK_SNIPPETS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trudy_core::{Brief, Campaign};

    fn snippet(key: &str, tags: &[&str]) -> PlaybookSnippet {
        PlaybookSnippet {
            key: key.to_string(),
            title: key.to_string(),
            body: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_select_playbook_by_tags() {
        let snippets = vec![
            snippet("everywhere", &[]),
            snippet("au-only", &["au"]),
            snippet("nz-only", &["NZ"]),
            snippet("wine", &["Wine"]),
            snippet("create", &["CREATE"]),
        ];
        let keys: Vec<String> = select_playbook(snippets, "AU", Some("wine"), "EVALUATION")
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["everywhere", "au-only", "wine"]);
    }

    #[test]
    fn test_select_playbook_is_capped() {
        let snippets = (0..8).map(|i| snippet(&format!("s{i}"), &[])).collect();
        assert_eq!(select_playbook(snippets, "AU", None, "CREATE").len(), MAX_PLAYBOOK_SNIPPETS);
    }

    #[test]
    fn test_research_override_replaces_lookup() {
        let campaign = Campaign::new("Summer", "Grant Burge").with_market("AU");
        let mut brief = Brief::new(campaign.id, "", json!({"brand": "Grant Burge"}));
        brief.assets = json!({"researchOverrides": {"brand": "Family winery, premium tier."}});
        let ctx = CampaignContext::build(campaign, brief);

        let entry = research_override(&ctx, KnowledgeKind::Brand).unwrap();
        assert_eq!(entry.summary, "Family winery, premium tier.");
        assert_eq!(entry.slug, "grant-burge-au");
        assert!(research_override(&ctx, KnowledgeKind::Prize).is_none());
    }
}
