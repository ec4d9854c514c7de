use trudy_core::{Campaign, CampaignMode, CampaignStatus};

use super::{datetime_to_millis, millis_to_datetime, parse_uuid};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: String,
    pub title: String,
    pub client: String,
    pub market: String,
    pub category: String,
    pub mode: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CampaignRow {
    pub fn into_domain(self) -> Campaign {
        Campaign {
            id: parse_uuid(&self.id),
            title: self.title,
            client: self.client,
            market: self.market,
            category: self.category,
            mode: CampaignMode::parse(&self.mode).unwrap_or_default(),
            status: CampaignStatus::parse(&self.status).unwrap_or_default(),
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

impl From<&Campaign> for CampaignRow {
    fn from(campaign: &Campaign) -> Self {
        Self {
            id: campaign.id.to_string(),
            title: campaign.title.clone(),
            client: campaign.client.clone(),
            market: campaign.market.clone(),
            category: campaign.category.clone(),
            mode: campaign.mode.as_str().to_string(),
            status: campaign.status.as_str().to_string(),
            created_at: datetime_to_millis(campaign.created_at),
            updated_at: datetime_to_millis(campaign.updated_at),
        }
    }
}
