use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignMode {
    Evaluation,
    #[default]
    Create,
}

impl CampaignMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evaluation => "EVALUATION",
            Self::Create => "CREATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EVALUATION" => Some(Self::Evaluation),
            "CREATE" => Some(Self::Create),
            _ => None,
        }
    }
}

/// Lifecycle of a campaign. Route handlers and phase runners move it forward;
/// nothing enforces ordering beyond that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Briefed,
    Running,
    Review,
    Complete,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Briefed => "BRIEFED",
            Self::Running => "RUNNING",
            Self::Review => "REVIEW",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "BRIEFED" => Some(Self::Briefed),
            "RUNNING" => Some(Self::Running),
            "REVIEW" => Some(Self::Review),
            "COMPLETE" => Some(Self::Complete),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub client: String,
    pub market: String,
    pub category: String,
    pub mode: CampaignMode,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(title: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            client: client.into(),
            market: String::new(),
            category: String::new(),
            mode: CampaignMode::default(),
            status: CampaignStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_mode(mut self, mode: CampaignMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CreateCampaignRequest {
    pub title: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub mode: Option<CampaignMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub client: Option<String>,
    pub market: Option<String>,
    pub category: Option<String>,
    pub mode: Option<CampaignMode>,
    pub status: Option<CampaignStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_creation() {
        let campaign = Campaign::new("Summer Sizzle", "Grant Burge")
            .with_market("AU")
            .with_category("Wine");

        assert_eq!(campaign.title, "Summer Sizzle");
        assert_eq!(campaign.client, "Grant Burge");
        assert_eq!(campaign.market, "AU");
        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert_eq!(campaign.mode, CampaignMode::Create);
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Briefed,
            CampaignStatus::Running,
            CampaignStatus::Review,
            CampaignStatus::Complete,
            CampaignStatus::Failed,
        ] {
            assert_eq!(CampaignStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CampaignStatus::parse("draft"), None);
    }

    #[test]
    fn test_mode_serializes_screaming_case() {
        let json = serde_json::to_string(&CampaignMode::Evaluation).unwrap();
        assert_eq!(json, "\"EVALUATION\"");
        assert_eq!(CampaignMode::parse("CREATE"), Some(CampaignMode::Create));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(CampaignStatus::Complete.is_terminal());
        assert!(CampaignStatus::Failed.is_terminal());
        assert!(!CampaignStatus::Running.is_terminal());
    }
}
