// distress-triage - core/pipeline.rs
//
// Row pipeline: column map + price parser + scorer over a batch of raw rows.
// Never drops a row and never fails; missing data degrades to empty strings
// and `None`. Output order always matches input order.
// Core layer: pure logic, no I/O.

use crate::core::mapper::ColumnMap;
use crate::core::model::{Field, RawRow, ScoredProperty};
use crate::core::price::parse_price;
use crate::core::scorer;
use crate::util::constants;
use rayon::prelude::*;

/// Configuration for the row pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// State written when a row's state column is blank.
    pub default_state: String,
    /// Batches larger than this are scored on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_state: constants::DEFAULT_STATE.to_string(),
            parallel_threshold: constants::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Score a batch of raw rows with the default configuration.
pub fn process(rows: &[RawRow], columns: &ColumnMap) -> Vec<ScoredProperty> {
    process_with(rows, columns, &PipelineConfig::default())
}

/// Score a batch of raw rows.
///
/// Rows are independent, so large batches are spread across the rayon pool.
/// `collect` on an indexed parallel iterator keeps input order.
pub fn process_with(
    rows: &[RawRow],
    columns: &ColumnMap,
    config: &PipelineConfig,
) -> Vec<ScoredProperty> {
    let properties: Vec<ScoredProperty> = if rows.len() > config.parallel_threshold {
        tracing::debug!(rows = rows.len(), "Scoring rows in parallel");
        rows.par_iter()
            .map(|row| process_row(row, columns, config))
            .collect()
    } else {
        rows.iter()
            .map(|row| process_row(row, columns, config))
            .collect()
    };

    tracing::debug!(
        rows = rows.len(),
        mapped_fields = columns.len(),
        "Row pipeline complete"
    );
    properties
}

/// Build one scored property from one raw row.
pub fn process_row(row: &RawRow, columns: &ColumnMap, config: &PipelineConfig) -> ScoredProperty {
    let get = |field: Field| -> String {
        columns
            .get(field)
            .and_then(|header| row.get(header))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let price_text = get(Field::AskingPrice);
    let asking_price = parse_price(Some(price_text.as_str()));
    let days_on_market = parse_days_on_market(&get(Field::DaysOnMarket));
    let description = get(Field::Description);

    let mut state = get(Field::State);
    if state.is_empty() {
        state = config.default_state.clone();
    }

    let breakdown = scorer::score(&description, days_on_market);
    let score = breakdown.total();

    tracing::trace!(
        description = crate::util::logging::preview(&description),
        score,
        "Scored row"
    );

    ScoredProperty {
        address: get(Field::Address),
        suburb: get(Field::Suburb),
        state,
        postcode: get(Field::Postcode),
        property_type: get(Field::PropertyType),
        asking_price,
        price_text,
        land_area: get(Field::LandArea),
        building_area: get(Field::BuildingArea),
        days_on_market,
        agent: get(Field::Agent),
        agency: get(Field::Agency),
        url: get(Field::Url),
        council: get(Field::Council),
        listing_type: get(Field::ListingType),
        description,
        distress_score: breakdown.distress_score,
        dom_score: breakdown.dom_score,
        vacancy_score: breakdown.vacancy_score,
        score,
        priority: breakdown.priority,
        matched_keywords: breakdown.matched_keywords,
    }
}

/// Parse a days-on-market cell.
///
/// Blank and `-` mean "unknown", not zero. Otherwise the leading integer is
/// used, so "45 days" reads as 45. Text without a leading integer is unknown.
/// Digit grouping is not understood: "1,200" reads as 1.
/// A digit run too long for `i64` saturates rather than becoming unknown.
pub fn parse_days_on_market(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if text.is_empty() || text == "-" {
        return None;
    }

    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let days = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * days)
}
