use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Asset bag keys with meaning outside the UI.
pub const ASSET_VARIANTS: &str = "variants";
pub const ASSET_SPARK: &str = "__spark";
pub const ASSET_EXCEPTIONS: &str = "exceptions";
pub const ASSET_MANUAL_NOTES: &str = "manualNotes";
pub const ASSET_RESEARCH_OVERRIDES: &str = "researchOverrides";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Brief {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub raw_text: String,
    pub parsed_json: Value,
    pub assets: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brief {
    pub fn new(campaign_id: Uuid, raw_text: impl Into<String>, parsed_json: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            raw_text: raw_text.into(),
            parsed_json,
            assets: Value::Object(Map::new()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn spec(&self) -> BriefSpec {
        BriefSpec::from_value(&self.parsed_json)
    }

    pub fn asset(&self, key: &str) -> Option<&Value> {
        self.assets.get(key)
    }

    /// String entries stored under `key` in the asset bag, skipping blanks.
    pub fn asset_strings(&self, key: &str) -> Vec<String> {
        match self.assets.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UpsertBriefRequest {
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub parsed_json: Option<Value>,
    #[serde(default)]
    pub assets: Option<Value>,
}

/// Typed projection of the loosely-typed `parsed_json` blob.
///
/// Reading is lenient: numbers may arrive as strings ("1,000"), retailers as
/// a comma separated string, and a handful of legacy key spellings are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct BriefSpec {
    pub brand: Option<String>,
    pub market: Option<String>,
    pub category: Option<String>,
    pub hook: Option<String>,
    pub mechanic: Option<String>,
    pub prize: Option<String>,
    pub total_winners: Option<u64>,
    pub prize_pool_value: Option<f64>,
    pub retailers: Vec<String>,
    pub duration_weeks: Option<u32>,
    pub objective: Option<String>,
    pub audience: Option<String>,
    pub proof_of_purchase: Option<bool>,
    pub staff_involvement: Option<bool>,
}

impl BriefSpec {
    pub fn from_value(value: &Value) -> Self {
        Self {
            brand: text(value, &["brand", "brandName"]),
            market: text(value, &["market", "marketCode"]),
            category: text(value, &["category"]),
            hook: text(value, &["hook", "campaignHook"]),
            mechanic: text(value, &["mechanic", "entryMechanic"]),
            prize: text(value, &["prize", "heroPrize", "majorPrize"]),
            total_winners: number(value, &["totalWinners", "winners"]).map(|n| n.max(0.0) as u64),
            prize_pool_value: number(value, &["prizePoolValue", "prizePool"]),
            retailers: list(value, &["retailers", "retailer"]),
            duration_weeks: number(value, &["durationWeeks"]).map(|n| n.max(0.0) as u32),
            objective: text(value, &["objective"]),
            audience: text(value, &["audience", "targetAudience"]),
            proof_of_purchase: flag(value, &["proofOfPurchase"]),
            staff_involvement: flag(value, &["staffInvolvement"]),
        }
    }
}

fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

fn text(value: &Value, keys: &[&str]) -> Option<String> {
    let found = match lookup(value, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("title"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())?,
        _ => return None,
    };
    (!found.is_empty()).then_some(found)
}

fn number(value: &Value, keys: &[&str]) -> Option<f64> {
    match lookup(value, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn flag(value: &Value, keys: &[&str]) -> Option<bool> {
    match lookup(value, keys)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn list(value: &Value, keys: &[&str]) -> Vec<String> {
    match lookup(value, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(map) => map.get("name").and_then(|v| v.as_str()).map(str::to_string),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
