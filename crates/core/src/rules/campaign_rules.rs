use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::market::normalise_market_code;
use crate::domain::BriefSpec;

const STAFF_KEYWORDS: &[&str] = &[
    "staff",
    "in-store",
    "instore",
    "manual",
    "validate",
    "verify",
    "verification",
    "counter",
    "scan at",
];
const INSTANT_WIN_KEYWORDS: &[&str] = &["instant win", "instant-win", "instantly", "win instantly"];
const DRAW_KEYWORDS: &[&str] = &["draw", "chance", "random", "drawn"];
const PURCHASE_KEYWORDS: &[&str] = &["purchase", "receipt", "buy", "spend"];

/// Retailer count above which staff-operated mechanics become a heavy burden.
const STAFF_HEAVY_RETAILERS: usize = 3;
/// Winner count above which staff-operated mechanics become a heavy burden.
const STAFF_HEAVY_WINNERS: u64 = 1_000;

/// Winner-count thresholds for prize breadth in a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BreadthThresholds {
    pub solid: u64,
    pub strong: u64,
}

impl BreadthThresholds {
    pub fn for_market(market: &str) -> Self {
        let (solid, strong) = match market {
            "AU" => (100, 500),
            "NZ" => (40, 200),
            "GB" => (150, 750),
            "US" => (250, 1_000),
            _ => (100, 500),
        };
        Self { solid, strong }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CampaignHeuristics {
    pub breadth_solid: bool,
    pub breadth_strong: bool,
    pub staff_burden: bool,
    pub staff_burden_high: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CampaignFlags {
    pub instant_win: bool,
    pub draw: bool,
    pub proof_of_purchase: bool,
    pub permit_review: bool,
}

/// Derived facts about a brief used to steer prompts and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CampaignRules {
    pub market: String,
    pub thresholds: BreadthThresholds,
    pub total_winners: Option<u64>,
    pub heuristics: CampaignHeuristics,
    pub flags: CampaignFlags,
    pub notes: Vec<String>,
}

pub fn build_campaign_rules(spec: &BriefSpec, fallback_market: &str) -> CampaignRules {
    let market = normalise_market_code(spec.market.as_deref().unwrap_or(fallback_market));
    let thresholds = BreadthThresholds::for_market(&market);
    let winners = spec.total_winners;
    let mechanic = spec
        .mechanic
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let breadth_solid = winners.is_some_and(|w| w >= thresholds.solid);
    let breadth_strong = winners.is_some_and(|w| w >= thresholds.strong);

    let staff_burden = spec.staff_involvement.unwrap_or(false) || mentions(&mechanic, STAFF_KEYWORDS);
    let staff_burden_high = staff_burden
        && (spec.retailers.len() > STAFF_HEAVY_RETAILERS
            || winners.is_some_and(|w| w > STAFF_HEAVY_WINNERS));

    let instant_win = mentions(&mechanic, INSTANT_WIN_KEYWORDS);
    let draw = mentions(&mechanic, DRAW_KEYWORDS);
    let proof_of_purchase = spec
        .proof_of_purchase
        .unwrap_or_else(|| mentions(&mechanic, PURCHASE_KEYWORDS));
    let permit_review = market == "AU" && draw;

    let heuristics = CampaignHeuristics {
        breadth_solid,
        breadth_strong,
        staff_burden,
        staff_burden_high,
    };
    let flags = CampaignFlags {
        instant_win,
        draw,
        proof_of_purchase,
        permit_review,
    };
    let notes = describe(&market, thresholds, winners, &heuristics, &flags);

    CampaignRules {
        market,
        thresholds,
        total_winners: winners,
        heuristics,
        flags,
        notes,
    }
}

fn mentions(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn describe(
    market: &str,
    thresholds: BreadthThresholds,
    winners: Option<u64>,
    heuristics: &CampaignHeuristics,
    flags: &CampaignFlags,
) -> Vec<String> {
    let mut notes = Vec::new();

    match winners {
        None => notes.push("Winner count not specified; breadth cannot be judged.".to_string()),
        Some(w) if heuristics.breadth_strong => notes.push(format!(
            "{w} winners is strong breadth for {market} (>= {}).",
            thresholds.strong
        )),
        Some(w) if heuristics.breadth_solid => notes.push(format!(
            "{w} winners is solid breadth for {market}; strong starts at {}.",
            thresholds.strong
        )),
        Some(w) => notes.push(format!(
            "{w} winners is thin for {market}; solid breadth starts at {}.",
            thresholds.solid
        )),
    }

    if heuristics.staff_burden_high {
        notes.push("Mechanic leans heavily on retail staff across many outlets.".to_string());
    } else if heuristics.staff_burden {
        notes.push("Mechanic needs retail staff involvement.".to_string());
    }
    if flags.instant_win {
        notes.push("Instant-win mechanic: winning moments must be pre-seeded.".to_string());
    }
    if flags.proof_of_purchase {
        notes.push("Entry requires proof of purchase.".to_string());
    }
    if flags.permit_review {
        notes.push("Game of chance in AU: check state trade promotion permits.".to_string());
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_winners(winners: Option<u64>) -> BriefSpec {
        BriefSpec {
            market: Some("Australia".to_string()),
            total_winners: winners,
            ..Default::default()
        }
    }

    #[test]
    fn test_strong_breadth_at_threshold() {
        let rules = build_campaign_rules(&spec_with_winners(Some(500)), "");
        assert_eq!(rules.market, "AU");
        assert!(rules.heuristics.breadth_strong);
        assert!(rules.heuristics.breadth_solid);
    }

    #[test]
    fn test_solid_but_not_strong() {
        let rules = build_campaign_rules(&spec_with_winners(Some(100)), "");
        assert!(rules.heuristics.breadth_solid);
        assert!(!rules.heuristics.breadth_strong);
    }

    #[test]
    fn test_below_solid_both_false() {
        let rules = build_campaign_rules(&spec_with_winners(Some(99)), "");
        assert!(!rules.heuristics.breadth_solid);
        assert!(!rules.heuristics.breadth_strong);

        let rules = build_campaign_rules(&spec_with_winners(None), "");
        assert!(!rules.heuristics.breadth_solid);
        assert!(!rules.heuristics.breadth_strong);
    }

    #[test]
    fn test_market_falls_back_to_campaign_market() {
        let spec = BriefSpec {
            total_winners: Some(200),
            ..Default::default()
        };
        let rules = build_campaign_rules(&spec, "New Zealand");
        assert_eq!(rules.market, "NZ");
        assert!(rules.heuristics.breadth_strong);
    }

    #[test]
    fn test_staff_burden_flags() {
        let spec = BriefSpec {
            market: Some("AU".to_string()),
            mechanic: Some("Staff validate receipts at the counter, then a weekly draw".to_string()),
            retailers: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            ..Default::default()
        };
        let rules = build_campaign_rules(&spec, "");
        assert!(rules.heuristics.staff_burden);
        assert!(rules.heuristics.staff_burden_high);
        assert!(rules.flags.draw);
        assert!(rules.flags.proof_of_purchase);
        assert!(rules.flags.permit_review);
        assert!(rules.notes.iter().any(|n| n.contains("permits")));
    }

    #[test]
    fn test_explicit_proof_of_purchase_wins() {
        let spec = BriefSpec {
            mechanic: Some("Buy and enter".to_string()),
            proof_of_purchase: Some(false),
            ..Default::default()
        };
        let rules = build_campaign_rules(&spec, "US");
        assert!(!rules.flags.proof_of_purchase);
        assert!(!rules.flags.permit_review);
    }
}
