// distress-triage - core/scorer.rs
//
// Heuristic distress scoring. A pure function of the listing description
// and days on market: no external state, deterministic.
//
//   distress (0-50)  distinct distress phrases found in the description
//   dom      (0-30)  days-on-market bucket; unknown DOM scores 5
//   vacancy  (0-20)  "vacant possession", or no tenancy language at all
//
// "vacant possession" counts toward BOTH the keyword and vacancy
// sub-scores. Historical scores depend on this, keep it.

use crate::core::model::{Priority, ScoreBreakdown};

/// Distress phrases, matched case-insensitively as substrings.
/// Each phrase counts at most once per description.
pub const DISTRESS_KEYWORDS: &[&str] = &[
    "mortgagee",
    "receivership",
    "insolvency",
    "liquidation",
    "liquidator",
    "administrator",
    "must sell",
    "must be sold",
    "urgent sale",
    "reduced",
    "motivated vendor",
    "vendor says sell",
    "deceased estate",
    "distressed",
    "fire sale",
    "below valuation",
    "vacant possession",
    "relocating",
    "all offers considered",
    "quick sale",
];

/// Phrases indicating the property is tenanted.
pub const TENANCY_TERMS: &[&str] = &["leased", "tenant", "lease", "tenancy", "net income"];

/// Phrase that confirms vacancy outright.
pub const VACANT_POSSESSION: &str = "vacant possession";

/// Minimum total score for the High Priority bucket.
pub const HIGH_PRIORITY_THRESHOLD: u32 = 60;

/// Minimum total score for the Monitor bucket.
pub const MONITOR_THRESHOLD: u32 = 35;

/// DOM sub-score when days on market is unknown.
pub const UNKNOWN_DOM_SCORE: u32 = 5;

/// Maximum possible total score.
pub const MAX_SCORE: u32 = 100;

/// Score a listing from its description and days on market.
pub fn score(description: &str, days_on_market: Option<i64>) -> ScoreBreakdown {
    let matched_keywords = matched_keywords(description);

    let distress_score = keyword_score(matched_keywords.len());
    let dom_score = dom_score(days_on_market);
    let vacancy_score = vacancy_score(description);
    let total = distress_score + dom_score + vacancy_score;

    ScoreBreakdown {
        distress_score,
        dom_score,
        vacancy_score,
        priority: Priority::from_score(total),
        matched_keywords,
    }
}

/// Distress phrases present in `description`, in keyword-list order.
pub fn matched_keywords(description: &str) -> Vec<String> {
    let lower = description.to_lowercase();
    DISTRESS_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect()
}

/// Map a distinct-keyword count to the keyword sub-score.
pub fn keyword_score(count: usize) -> u32 {
    match count {
        0 => 0,
        1 => 15,
        2 => 30,
        3 => 40,
        _ => 50,
    }
}

/// Days-on-market sub-score.
pub fn dom_score(days_on_market: Option<i64>) -> u32 {
    match days_on_market {
        None => UNKNOWN_DOM_SCORE,
        Some(d) if d > 180 => 30,
        Some(d) if d > 120 => 20,
        Some(d) if d > 60 => 10,
        Some(_) => 0,
    }
}

/// Vacancy sub-score: 20 for vacant possession, 10 when the description has
/// no tenancy language, otherwise 0.
pub fn vacancy_score(description: &str) -> u32 {
    let lower = description.to_lowercase();
    if lower.contains(VACANT_POSSESSION) {
        20
    } else if !TENANCY_TERMS.iter().any(|t| lower.contains(t)) {
        10
    } else {
        0
    }
}

impl Priority {
    /// Bucket a total score. Lower bounds are inclusive.
    pub fn from_score(total: u32) -> Self {
        if total >= HIGH_PRIORITY_THRESHOLD {
            Priority::High
        } else if total >= MONITOR_THRESHOLD {
            Priority::Monitor
        } else {
            Priority::Low
        }
    }
}
