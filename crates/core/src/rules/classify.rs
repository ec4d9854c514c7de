use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BriefSpec, CampaignMode};

/// What the pipeline should do with a brief.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BriefMode {
    /// Hook, mechanic and prize are all supplied: critique the idea.
    Evaluate,
    /// Something is missing: generate routes.
    Create,
}

impl From<BriefMode> for CampaignMode {
    fn from(mode: BriefMode) -> Self {
        match mode {
            BriefMode::Evaluate => CampaignMode::Evaluation,
            BriefMode::Create => CampaignMode::Create,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BriefClassification {
    pub mode: BriefMode,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

pub fn classify_brief(spec: &BriefSpec) -> BriefClassification {
    let fields = [
        ("hook", &spec.hook),
        ("mechanic", &spec.mechanic),
        ("prize", &spec.prize),
    ];

    let (present, missing): (Vec<_>, Vec<_>) = fields
        .iter()
        .partition(|(_, value)| value.as_deref().is_some_and(|v| !v.trim().is_empty()));

    let mode = if missing.is_empty() {
        BriefMode::Evaluate
    } else {
        BriefMode::Create
    };

    BriefClassification {
        mode,
        present: present.into_iter().map(|(name, _)| name.to_string()).collect(),
        missing: missing.into_iter().map(|(name, _)| name.to_string()).collect(),
    }
}
