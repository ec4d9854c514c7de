//! Lookup and reference records. All of these are upserted by a natural key
//! and have no lifecycle beyond create/update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::text::slugify;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct IdeaRoute {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub hook: String,
    pub mechanic: String,
    pub prize: Option<String>,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdeaRoute {
    pub fn new(campaign_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            name: name.into(),
            hook: String::new(),
            mechanic: String::new(),
            prize: None,
            rationale: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct HeuristicScore {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub route_id: Uuid,
    pub total: u32,
    pub breakdown: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FounderNote {
    pub id: Uuid,
    pub market: Option<String>,
    pub category: Option<String>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UpsertFounderNoteRequest {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MarketCategoryBenchmark {
    pub market: String,
    pub category: String,
    pub median_winners: Option<i64>,
    pub median_prize_pool: Option<f64>,
    pub typical_duration_weeks: Option<i64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PlaybookSnippet {
    pub key: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnowledgeKind {
    Brand,
    Prize,
}

impl KnowledgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Prize => "PRIZE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BRAND" => Some(Self::Brand),
            "PRIZE" => Some(Self::Prize),
            _ => None,
        }
    }
}

/// Cached model answer about a brand or prize in a market.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct KnowledgeEntry {
    pub kind: KnowledgeKind,
    pub slug: String,
    pub subject: String,
    pub market: String,
    pub summary: String,
    pub payload: Value,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    pub fn slug_for(subject: &str, market: &str) -> String {
        format!("{}-{}", slugify(subject), market.trim().to_ascii_lowercase())
    }
}
