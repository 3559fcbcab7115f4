// distress-triage - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// =============================================================================
// Raw input
// =============================================================================

/// One data line of an imported listing export, keyed by the original
/// header strings found in row 1 of the file.
pub type RawRow = HashMap<String, String>;

// =============================================================================
// Canonical fields
// =============================================================================

/// Canonical semantic fields a listing export can provide.
///
/// Declaration order is significant: the column mapper walks fields in this
/// order and the first field to match a header claims it. `Ord` follows
/// declaration order so a `BTreeMap<Field, _>` iterates the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Address,
    Suburb,
    State,
    Postcode,
    PropertyType,
    AskingPrice,
    LandArea,
    BuildingArea,
    DaysOnMarket,
    Agent,
    Agency,
    Url,
    Council,
    ListingType,
    Description,
}

impl Field {
    /// All fields in declaration (matching) order.
    pub fn all() -> &'static [Field] {
        &[
            Field::Address,
            Field::Suburb,
            Field::State,
            Field::Postcode,
            Field::PropertyType,
            Field::AskingPrice,
            Field::LandArea,
            Field::BuildingArea,
            Field::DaysOnMarket,
            Field::Agent,
            Field::Agency,
            Field::Url,
            Field::Council,
            Field::ListingType,
            Field::Description,
        ]
    }

    /// Stable camelCase key used in mapping overrides and JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Address => "address",
            Field::Suburb => "suburb",
            Field::State => "state",
            Field::Postcode => "postcode",
            Field::PropertyType => "propertyType",
            Field::AskingPrice => "askingPrice",
            Field::LandArea => "landArea",
            Field::BuildingArea => "buildingArea",
            Field::DaysOnMarket => "daysOnMarket",
            Field::Agent => "agent",
            Field::Agency => "agency",
            Field::Url => "url",
            Field::Council => "council",
            Field::ListingType => "listingType",
            Field::Description => "description",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Address => "Address",
            Field::Suburb => "Suburb",
            Field::State => "State",
            Field::Postcode => "Postcode",
            Field::PropertyType => "Property Type",
            Field::AskingPrice => "Asking Price",
            Field::LandArea => "Land Area",
            Field::BuildingArea => "Building Area",
            Field::DaysOnMarket => "Days on Market",
            Field::Agent => "Agent",
            Field::Agency => "Agency",
            Field::Url => "Listing URL",
            Field::Council => "Council",
            Field::ListingType => "Listing Type",
            Field::Description => "Description",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts the camelCase key, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::all()
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown field '{wanted}'"))
    }
}

// =============================================================================
// Priority
// =============================================================================

/// Coarse triage bucket derived from the total score.
///
/// Ordered from least to most urgent so `Ord` matches score order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Priority {
    #[default]
    Low,
    Monitor,
    #[serde(rename = "High Priority")]
    High,
}

impl Priority {
    /// Human-readable label, as shown in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Monitor => "Monitor",
            Priority::High => "High Priority",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "monitor" => Ok(Priority::Monitor),
            "high" | "high priority" | "high-priority" => Ok(Priority::High),
            other => Err(format!(
                "unknown priority '{other}' (expected low, monitor or high)"
            )),
        }
    }
}

// =============================================================================
// Score breakdown
// =============================================================================

/// Output of the scorer for a single listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Keyword sub-score, 0-50.
    pub distress_score: u32,
    /// Days-on-market sub-score, 0-30.
    pub dom_score: u32,
    /// Vacancy sub-score, 0-20.
    pub vacancy_score: u32,
    pub priority: Priority,
    /// Distress phrases found in the description, in keyword-list order.
    pub matched_keywords: Vec<String>,
}

impl ScoreBreakdown {
    /// Sum of the three sub-scores.
    pub fn total(&self) -> u32 {
        self.distress_score + self.dom_score + self.vacancy_score
    }
}

// =============================================================================
// Scored property (output of the row pipeline)
// =============================================================================

/// A listing after column mapping, price parsing and scoring.
///
/// Built once per raw row and never mutated afterwards; re-scoring
/// produces a new batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProperty {
    pub address: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub property_type: String,
    /// Parsed asking price in whole AUD. `None` when the price text has no
    /// numeric value ("Contact Agent", auctions, blanks).
    pub asking_price: Option<i64>,
    /// Price cell from the export, with surrounding whitespace trimmed.
    pub price_text: String,
    pub land_area: String,
    pub building_area: String,
    pub days_on_market: Option<i64>,
    pub agent: String,
    pub agency: String,
    pub url: String,
    pub council: String,
    pub listing_type: String,
    pub description: String,

    pub distress_score: u32,
    pub dom_score: u32,
    pub vacancy_score: u32,
    /// Always `distress_score + dom_score + vacancy_score`.
    pub score: u32,
    pub priority: Priority,
    pub matched_keywords: Vec<String>,
}

// =============================================================================
// Aggregates
// =============================================================================

/// Headline statistics over a batch of scored properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total: usize,
    pub high_priority: usize,
    pub monitor: usize,
    pub low: usize,
    /// Mean total score, rounded to one decimal place. 0.0 for an empty batch.
    pub average_score: f64,
    /// Number of listings with a parsed asking price.
    pub priced: usize,
    /// Mean asking price over priced listings.
    pub average_price: Option<i64>,
}

/// Distinct values available to the multi-select filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacets {
    pub property_types: Vec<String>,
    pub suburbs: Vec<String>,
}
