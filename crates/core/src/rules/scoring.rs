use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::campaign_rules::CampaignRules;

const ACTION_VERBS: &[&str] = &[
    "buy", "purchase", "scan", "upload", "enter", "share", "snap", "collect", "spend",
    "register", "sign up", "play", "vote",
];

/// Per-dimension heuristic score for a piece of route copy. `total` is 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct HeuristicBreakdown {
    pub simplicity: u32,
    pub clarity: u32,
    pub prize_salience: u32,
    pub breadth: u32,
    pub staff_penalty: u32,
    pub total: u32,
}

pub fn score_route(
    hook: &str,
    mechanic: &str,
    prize: Option<&str>,
    rules: &CampaignRules,
) -> HeuristicBreakdown {
    let simplicity: u32 = match word_count(hook) {
        0 => 0,
        1..=6 => 30,
        7..=10 => 22,
        11..=15 => 12,
        _ => 5,
    };

    let mechanic_lower = mechanic.to_lowercase();
    let clarity: u32 = match word_count(mechanic) {
        0 => 0,
        n => {
            let verb = if ACTION_VERBS.iter().any(|v| mechanic_lower.contains(v)) {
                12
            } else {
                0
            };
            let length = match n {
                1..=20 => 18,
                21..=35 => 10,
                _ => 3,
            };
            verb + length
        }
    };

    let prize_salience: u32 = match prize.map(str::trim).filter(|p| !p.is_empty()) {
        None => 0,
        Some(prize) => {
            let hook_lower = hook.to_lowercase();
            let echoed = prize
                .split_whitespace()
                .filter(|word| word.chars().count() >= 4)
                .any(|word| hook_lower.contains(&word.to_lowercase()));
            if echoed {
                20
            } else {
                12
            }
        }
    };

    let breadth: u32 = if rules.heuristics.breadth_strong {
        20
    } else if rules.heuristics.breadth_solid {
        12
    } else if rules.total_winners.is_none() {
        8
    } else {
        4
    };

    let staff_penalty: u32 = if rules.heuristics.staff_burden_high {
        10
    } else if rules.heuristics.staff_burden {
        5
    } else {
        0
    };

    let total = (simplicity + clarity + prize_salience + breadth).saturating_sub(staff_penalty);

    HeuristicBreakdown {
        simplicity,
        clarity,
        prize_salience,
        breadth,
        staff_penalty,
        total: total.min(100),
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
