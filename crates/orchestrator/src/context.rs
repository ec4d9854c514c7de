use serde::Serialize;
use trudy_core::{
    build_campaign_rules, classify_brief, Brief, BriefClassification, BriefSpec, Campaign,
    CampaignRules, FounderNote, KnowledgeEntry, MarketCategoryBenchmark, PlaybookSnippet,
    ASSET_EXCEPTIONS, ASSET_MANUAL_NOTES,
};

/// Raw brief text longer than this is cut before prompting.
const RAW_TEXT_LIMIT: usize = 4_000;

/// Optional reference data attached to a context. Every part may be empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enrichment {
    pub founder_notes: Vec<FounderNote>,
    pub benchmark: Option<MarketCategoryBenchmark>,
    pub playbook: Vec<PlaybookSnippet>,
    pub brand: Option<KnowledgeEntry>,
    pub prize: Option<KnowledgeEntry>,
}

/// Everything a phase needs to know about a campaign.
#[derive(Debug, Clone)]
pub struct CampaignContext {
    pub campaign: Campaign,
    pub brief: Brief,
    pub spec: BriefSpec,
    pub rules: CampaignRules,
    pub classification: BriefClassification,
    pub manual_notes: Vec<String>,
    pub exceptions: Vec<String>,
    pub enrichment: Enrichment,
}

impl CampaignContext {
    pub fn build(campaign: Campaign, brief: Brief) -> Self {
        let spec = brief.spec();
        let rules = build_campaign_rules(&spec, &campaign.market);
        let classification = classify_brief(&spec);
        let manual_notes = brief.asset_strings(ASSET_MANUAL_NOTES);
        let exceptions = brief.asset_strings(ASSET_EXCEPTIONS);

        Self {
            campaign,
            brief,
            spec,
            rules,
            classification,
            manual_notes,
            exceptions,
            enrichment: Enrichment::default(),
        }
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Normalised market code.
    pub fn market(&self) -> &str {
        &self.rules.market
    }

    pub fn category(&self) -> Option<&str> {
        self.spec
            .category
            .as_deref()
            .or(Some(self.campaign.category.as_str()))
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Markdown block describing the campaign, embedded in every prompt.
    pub fn render_prompt_block(&self) -> String {
        let mut out = String::new();

        out.push_str("## Campaign\n");
        out.push_str(&format!("- Title: {}\n", self.campaign.title));
        push_field(&mut out, "Client", Some(self.campaign.client.as_str()));
        out.push_str(&format!("- Market: {}\n", self.market()));
        push_field(&mut out, "Category", self.category());
        out.push_str(&format!("- Mode: {}\n", self.campaign.mode.as_str()));

        out.push_str("\n## Brief\n");
        let spec = &self.spec;
        push_field(&mut out, "Brand", spec.brand.as_deref());
        push_field(&mut out, "Objective", spec.objective.as_deref());
        push_field(&mut out, "Audience", spec.audience.as_deref());
        push_field(&mut out, "Hook", spec.hook.as_deref());
        push_field(&mut out, "Mechanic", spec.mechanic.as_deref());
        push_field(&mut out, "Prize", spec.prize.as_deref());
        if let Some(winners) = spec.total_winners {
            out.push_str(&format!("- Total winners: {winners}\n"));
        }
        if let Some(pool) = spec.prize_pool_value {
            out.push_str(&format!("- Prize pool: {pool:.0}\n"));
        }
        if let Some(weeks) = spec.duration_weeks {
            out.push_str(&format!("- Duration: {weeks} weeks\n"));
        }
        if !spec.retailers.is_empty() {
            out.push_str(&format!("- Retailers: {}\n", spec.retailers.join(", ")));
        }

        let raw = self.brief.raw_text.trim();
        if !raw.is_empty() {
            let clipped: String = raw.chars().take(RAW_TEXT_LIMIT).collect();
            out.push_str(&format!("\n### Brief text\n{clipped}\n"));
        }

        push_list(&mut out, "Rules of thumb", &self.rules.notes);
        push_list(&mut out, "Client exceptions (must respect)", &self.exceptions);
        push_list(&mut out, "Team notes", &self.manual_notes);

        let enrichment = &self.enrichment;
        let founder: Vec<String> = enrichment
            .founder_notes
            .iter()
            .map(|n| format!("{}: {}", n.title, n.body))
            .collect();
        push_list(&mut out, "Founder notes", &founder);

        if let Some(b) = &enrichment.benchmark {
            let mut parts = Vec::new();
            if let Some(w) = b.median_winners {
                parts.push(format!("median winners {w}"));
            }
            if let Some(p) = b.median_prize_pool {
                parts.push(format!("median prize pool {p:.0}"));
            }
            if let Some(d) = b.typical_duration_weeks {
                parts.push(format!("typical duration {d} weeks"));
            }
            if !b.notes.trim().is_empty() {
                parts.push(b.notes.trim().to_string());
            }
            if !parts.is_empty() {
                out.push_str(&format!(
                    "\n## Benchmark ({} / {})\n{}\n",
                    b.market,
                    b.category,
                    parts.join("; ")
                ));
            }
        }

        let playbook: Vec<String> = enrichment
            .playbook
            .iter()
            .map(|s| format!("{}: {}", s.title, s.body))
            .collect();
        push_list(&mut out, "Playbook", &playbook);

        if let Some(brand) = &enrichment.brand {
            out.push_str(&format!("\n## About the brand\n{}\n", brand.summary));
        }
        if let Some(prize) = &enrichment.prize {
            out.push_str(&format!("\n## About the prize\n{}\n", prize.summary));
        }

        out.trim_end().to_string()
    }
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        out.push_str(&format!("- {label}: {value}\n"));
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {title}\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trudy_core::BriefMode;

    fn context(parsed: serde_json::Value, assets: serde_json::Value) -> CampaignContext {
        let campaign = Campaign::new("Summer Sizzle", "Grant Burge").with_market("Australia");
        let mut brief = Brief::new(campaign.id, "Drive summer rosé sales.", parsed);
        brief.assets = assets;
        CampaignContext::build(campaign, brief)
    }

    #[test]
    fn test_build_derives_rules_and_classification() {
        let ctx = context(
            json!({"hook": "Win summer", "mechanic": "Buy and enter", "totalWinners": 600}),
            json!({"exceptions": ["No under-25 talent"], "manualNotes": "Client loves puns"}),
        );

        assert_eq!(ctx.market(), "AU");
        assert!(ctx.rules.heuristics.breadth_strong);
        assert_eq!(ctx.classification.mode, BriefMode::Create);
        assert_eq!(ctx.classification.missing, vec!["prize"]);
        assert_eq!(ctx.exceptions, vec!["No under-25 talent"]);
        assert_eq!(ctx.manual_notes, vec!["Client loves puns"]);
    }

    #[test]
    fn test_prompt_block_includes_present_sections_only() {
        let ctx = context(json!({"brand": "Grant Burge", "hook": "Win summer"}), json!({}));
        let block = ctx.render_prompt_block();

        assert!(block.contains("- Brand: Grant Burge"));
        assert!(block.contains("- Market: AU"));
        assert!(block.contains("### Brief text\nDrive summer rosé sales."));
        assert!(!block.contains("Founder notes"));
        assert!(!block.contains("- Prize:"));
    }

    #[test]
    fn test_prompt_block_renders_enrichment() {
        let ctx = context(json!({}), json!({})).with_enrichment(Enrichment {
            benchmark: Some(MarketCategoryBenchmark {
                market: "AU".into(),
                category: "Wine".into(),
                median_winners: Some(250),
                median_prize_pool: None,
                typical_duration_weeks: Some(6),
                notes: String::new(),
                updated_at: chrono::Utc::now(),
            }),
            ..Default::default()
        });
        let block = ctx.render_prompt_block();
        assert!(block.contains("## Benchmark (AU / Wine)\nmedian winners 250; typical duration 6 weeks"));
    }

    #[test]
    fn test_category_prefers_brief_then_campaign() {
        let mut ctx = context(json!({}), json!({}));
        assert_eq!(ctx.category(), None);
        ctx.campaign.category = "Wine".into();
        assert_eq!(ctx.category(), Some("Wine"));
        ctx.spec.category = Some("Spirits".into());
        assert_eq!(ctx.category(), Some("Spirits"));
    }
}
