use trudy_core::Brief;

use super::{datetime_to_millis, empty_object, millis_to_datetime, parse_json, parse_uuid};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BriefRow {
    pub id: String,
    pub campaign_id: String,
    pub raw_text: String,
    pub parsed_json: String,
    pub assets: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BriefRow {
    pub fn into_domain(self) -> Brief {
        Brief {
            id: parse_uuid(&self.id),
            campaign_id: parse_uuid(&self.campaign_id),
            raw_text: self.raw_text,
            parsed_json: parse_json(&self.parsed_json, empty_object()),
            assets: parse_json(&self.assets, empty_object()),
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

impl From<&Brief> for BriefRow {
    fn from(brief: &Brief) -> Self {
        Self {
            id: brief.id.to_string(),
            campaign_id: brief.campaign_id.to_string(),
            raw_text: brief.raw_text.clone(),
            parsed_json: brief.parsed_json.to_string(),
            assets: brief.assets.to_string(),
            created_at: datetime_to_millis(brief.created_at),
            updated_at: datetime_to_millis(brief.updated_at),
        }
    }
}
