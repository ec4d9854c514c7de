use serde_json::Value;
use trudy_core::{
    FounderNote, HeuristicScore, IdeaRoute, KnowledgeEntry, KnowledgeKind,
    MarketCategoryBenchmark, PlaybookSnippet,
};

use super::{datetime_to_millis, empty_object, millis_to_datetime, parse_json, parse_uuid};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdeaRouteRow {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub hook: String,
    pub mechanic: String,
    pub prize: Option<String>,
    pub rationale: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl IdeaRouteRow {
    pub fn into_domain(self) -> IdeaRoute {
        IdeaRoute {
            id: parse_uuid(&self.id),
            campaign_id: parse_uuid(&self.campaign_id),
            name: self.name,
            hook: self.hook,
            mechanic: self.mechanic,
            prize: self.prize,
            rationale: self.rationale,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

impl From<&IdeaRoute> for IdeaRouteRow {
    fn from(route: &IdeaRoute) -> Self {
        Self {
            id: route.id.to_string(),
            campaign_id: route.campaign_id.to_string(),
            name: route.name.clone(),
            hook: route.hook.clone(),
            mechanic: route.mechanic.clone(),
            prize: route.prize.clone(),
            rationale: route.rationale.clone(),
            created_at: datetime_to_millis(route.created_at),
            updated_at: datetime_to_millis(route.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeuristicScoreRow {
    pub id: String,
    pub campaign_id: String,
    pub route_id: String,
    pub total: i64,
    pub breakdown: String,
    pub created_at: i64,
}

impl HeuristicScoreRow {
    pub fn into_domain(self) -> HeuristicScore {
        HeuristicScore {
            id: parse_uuid(&self.id),
            campaign_id: parse_uuid(&self.campaign_id),
            route_id: parse_uuid(&self.route_id),
            total: u32::try_from(self.total).unwrap_or(0),
            breakdown: parse_json(&self.breakdown, empty_object()),
            created_at: millis_to_datetime(self.created_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FounderNoteRow {
    pub id: String,
    pub market: String,
    pub category: String,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn blank_to_none(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

impl FounderNoteRow {
    pub fn into_domain(self) -> FounderNote {
        FounderNote {
            id: parse_uuid(&self.id),
            market: blank_to_none(self.market),
            category: blank_to_none(self.category),
            title: self.title,
            body: self.body,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BenchmarkRow {
    pub market: String,
    pub category: String,
    pub median_winners: Option<i64>,
    pub median_prize_pool: Option<f64>,
    pub typical_duration_weeks: Option<i64>,
    pub notes: String,
    pub updated_at: i64,
}

impl BenchmarkRow {
    pub fn into_domain(self) -> MarketCategoryBenchmark {
        MarketCategoryBenchmark {
            market: self.market,
            category: self.category,
            median_winners: self.median_winners,
            median_prize_pool: self.median_prize_pool,
            typical_duration_weeks: self.typical_duration_weeks,
            notes: self.notes,
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaybookSnippetRow {
    pub key: String,
    pub title: String,
    pub body: String,
    pub tags: String,
    pub updated_at: i64,
}

impl PlaybookSnippetRow {
    pub fn into_domain(self) -> PlaybookSnippet {
        PlaybookSnippet {
            key: self.key,
            title: self.title,
            body: self.body,
            tags: serde_json::from_str(&self.tags).unwrap_or_default(),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KnowledgeEntryRow {
    pub kind: String,
    pub slug: String,
    pub subject: String,
    pub market: String,
    pub summary: String,
    pub payload: String,
    pub updated_at: i64,
}

impl KnowledgeEntryRow {
    pub fn into_domain(self) -> KnowledgeEntry {
        KnowledgeEntry {
            kind: KnowledgeKind::parse(&self.kind).unwrap_or(KnowledgeKind::Brand),
            slug: self.slug,
            subject: self.subject,
            market: self.market,
            summary: self.summary,
            payload: parse_json(&self.payload, Value::Null),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}
