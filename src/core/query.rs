// distress-triage - core/query.rs
//
// Composable filter, sort, and aggregate engine over scored properties.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{FilterFacets, PortfolioSummary, Priority, ScoredProperty};
use crate::util::error::QueryError;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

// =============================================================================
// Filter state
// =============================================================================

/// Complete filter state. All fields are AND-combined when applied.
/// `Default` shows everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Case-insensitive substring searched in address, suburb, property type
    /// and description. Empty = no filter.
    pub search: String,

    /// Priorities to include (empty = all).
    pub priorities: HashSet<Priority>,

    /// Property types to include, exact values (empty = all).
    pub property_types: HashSet<String>,

    /// Suburbs to include, exact values (empty = all).
    pub suburbs: HashSet<String>,

    /// Inclusive price bounds. Listings without a price always pass.
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,

    /// Minimum total score (inclusive).
    pub min_score: u32,

    /// Inclusive days-on-market bounds. Unknown DOM is compared as 0.
    pub min_dom: Option<i64>,
    pub max_dom: Option<i64>,
}

impl FilterState {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.priorities.is_empty()
            && self.property_types.is_empty()
            && self.suburbs.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_score == 0
            && self.min_dom.is_none()
            && self.max_dom.is_none()
    }

    /// Set the price range, rejecting an inverted range.
    pub fn set_price_range(&mut self, min: Option<i64>, max: Option<i64>) -> Result<(), QueryError> {
        check_range("price", min, max)?;
        self.min_price = min;
        self.max_price = max;
        Ok(())
    }

    /// Set the days-on-market range, rejecting an inverted range.
    pub fn set_dom_range(&mut self, min: Option<i64>, max: Option<i64>) -> Result<(), QueryError> {
        check_range("days on market", min, max)?;
        self.min_dom = min;
        self.max_dom = max;
        Ok(())
    }

    /// Quick filter: High Priority listings only.
    pub fn high_priority_only() -> Self {
        Self {
            priorities: HashSet::from([Priority::High]),
            ..Default::default()
        }
    }

    /// Quick filter: everything that needs attention (High Priority + Monitor).
    pub fn actionable() -> Self {
        Self {
            priorities: HashSet::from([Priority::High, Priority::Monitor]),
            ..Default::default()
        }
    }
}

fn check_range(name: &'static str, min: Option<i64>, max: Option<i64>) -> Result<(), QueryError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(QueryError::InvalidRange { name, min, max }),
        _ => Ok(()),
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Column to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Score,
    DistressScore,
    DomScore,
    VacancyScore,
    AskingPrice,
    DaysOnMarket,
    Priority,
    Address,
    Suburb,
    PropertyType,
    Agency,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::Score,
            SortKey::DistressScore,
            SortKey::DomScore,
            SortKey::VacancyScore,
            SortKey::AskingPrice,
            SortKey::DaysOnMarket,
            SortKey::Priority,
            SortKey::Address,
            SortKey::Suburb,
            SortKey::PropertyType,
            SortKey::Agency,
        ]
    }

    /// Key accepted on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::DistressScore => "distress",
            SortKey::DomScore => "dom-score",
            SortKey::VacancyScore => "vacancy",
            SortKey::AskingPrice => "price",
            SortKey::DaysOnMarket => "dom",
            SortKey::Priority => "priority",
            SortKey::Address => "address",
            SortKey::Suburb => "suburb",
            SortKey::PropertyType => "type",
            SortKey::Agency => "agency",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SortKey::all()
            .iter()
            .copied()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = SortKey::all().iter().map(|k| k.key()).collect();
                format!("unknown sort key '{wanted}' (expected one of: {})", keys.join(", "))
            })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// A sortable value extracted from a property.
enum SortValue<'a> {
    Number(Option<i64>),
    Text(&'a str),
}

fn sort_value(p: &ScoredProperty, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Score => SortValue::Number(Some(i64::from(p.score))),
        SortKey::DistressScore => SortValue::Number(Some(i64::from(p.distress_score))),
        SortKey::DomScore => SortValue::Number(Some(i64::from(p.dom_score))),
        SortKey::VacancyScore => SortValue::Number(Some(i64::from(p.vacancy_score))),
        SortKey::AskingPrice => SortValue::Number(p.asking_price),
        SortKey::DaysOnMarket => SortValue::Number(p.days_on_market),
        SortKey::Priority => SortValue::Number(Some(p.priority as i64)),
        SortKey::Address => SortValue::Text(&p.address),
        SortKey::Suburb => SortValue::Text(&p.suburb),
        SortKey::PropertyType => SortValue::Text(&p.property_type),
        SortKey::Agency => SortValue::Text(&p.agency),
    }
}

/// Compare two properties on `key`. Missing numbers sort last in both
/// directions.
fn compare(a: &ScoredProperty, b: &ScoredProperty, key: SortKey, dir: SortDirection) -> Ordering {
    let directed = |ord: Ordering| match dir {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };

    match (sort_value(a, key), sort_value(b, key)) {
        (SortValue::Number(x), SortValue::Number(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => directed(x.cmp(&y)),
        },
        (SortValue::Text(x), SortValue::Text(y)) => directed(locale_cmp(x, y)),
        // A key always yields the same variant for every property.
        _ => Ordering::Equal,
    }
}

/// Human-friendly string ordering: case-insensitive first, then exact text
/// as the tie-break so the order is total.
///
/// Only case is folded. Accents are compared by code point, so "École"
/// sorts after "Zeta" rather than with the other E words.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

// =============================================================================
// Query
// =============================================================================

/// Filter and sort, returning indices into `properties`.
///
/// Indices avoid copying records when the caller keeps its own batch.
/// The sort is stable: ties keep input order.
pub fn query_indices(
    properties: &[ScoredProperty],
    filter: &FilterState,
    key: SortKey,
    dir: SortDirection,
) -> Vec<usize> {
    let search = filter.search.trim().to_lowercase();

    let mut indices: Vec<usize> = if filter.is_empty() {
        (0..properties.len()).collect()
    } else {
        properties
            .iter()
            .enumerate()
            .filter(|(_, p)| matches_all(p, filter, &search))
            .map(|(idx, _)| idx)
            .collect()
    };

    indices.sort_by(|&a, &b| compare(&properties[a], &properties[b], key, dir));
    indices
}

/// Filter and sort, returning copies of the matching properties.
pub fn query(
    properties: &[ScoredProperty],
    filter: &FilterState,
    key: SortKey,
    dir: SortDirection,
) -> Vec<ScoredProperty> {
    query_indices(properties, filter, key, dir)
        .into_iter()
        .map(|idx| properties[idx].clone())
        .collect()
}

/// Check if a single property matches all active filters.
fn matches_all(p: &ScoredProperty, filter: &FilterState, search_lower: &str) -> bool {
    // Free-text search: any of the searchable fields
    if !search_lower.is_empty() {
        let hit = [&p.address, &p.suburb, &p.property_type, &p.description]
            .iter()
            .any(|field| field.to_lowercase().contains(search_lower));
        if !hit {
            return false;
        }
    }

    if !filter.priorities.is_empty() && !filter.priorities.contains(&p.priority) {
        return false;
    }

    if !filter.property_types.is_empty() && !filter.property_types.contains(&p.property_type) {
        return false;
    }

    if !filter.suburbs.is_empty() && !filter.suburbs.contains(&p.suburb) {
        return false;
    }

    // Unpriced listings cannot be excluded by a price range
    if let Some(price) = p.asking_price {
        if filter.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if filter.max_price.is_some_and(|max| price > max) {
            return false;
        }
    }

    if p.score < filter.min_score {
        return false;
    }

    let dom = p.days_on_market.unwrap_or(0);
    if filter.min_dom.is_some_and(|min| dom < min) {
        return false;
    }
    if filter.max_dom.is_some_and(|max| dom > max) {
        return false;
    }

    true
}

// =============================================================================
// Aggregates
// =============================================================================

/// Headline statistics for a batch (usually the filtered view).
pub fn summarize(properties: &[ScoredProperty]) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        total: properties.len(),
        ..Default::default()
    };

    let mut score_sum: u64 = 0;
    let mut price_sum: i128 = 0;
    for p in properties {
        match p.priority {
            Priority::High => summary.high_priority += 1,
            Priority::Monitor => summary.monitor += 1,
            Priority::Low => summary.low += 1,
        }
        score_sum += u64::from(p.score);
        if let Some(price) = p.asking_price {
            summary.priced += 1;
            price_sum += i128::from(price);
        }
    }

    if summary.total > 0 {
        let mean = score_sum as f64 / summary.total as f64;
        summary.average_score = (mean * 10.0).round() / 10.0;
    }
    if summary.priced > 0 {
        summary.average_price = Some((price_sum as f64 / summary.priced as f64).round() as i64);
    }
    summary
}

/// Sorted distinct non-empty property types and suburbs.
pub fn facets(properties: &[ScoredProperty]) -> FilterFacets {
    fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
        let mut seen: Vec<String> = values
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        seen.sort_by(|a, b| locale_cmp(a, b));
        seen
    }

    FilterFacets {
        property_types: distinct(properties.iter().map(|p| &p.property_type)),
        suburbs: distinct(properties.iter().map(|p| &p.suburb)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(address: &str, suburb: &str, kind: &str, score: u32, price: Option<i64>, dom: Option<i64>) -> ScoredProperty {
        ScoredProperty {
            address: address.to_string(),
            suburb: suburb.to_string(),
            state: "NSW".to_string(),
            postcode: String::new(),
            property_type: kind.to_string(),
            asking_price: price,
            price_text: String::new(),
            land_area: String::new(),
            building_area: String::new(),
            days_on_market: dom,
            agent: String::new(),
            agency: String::new(),
            url: String::new(),
            council: String::new(),
            listing_type: String::new(),
            description: String::new(),
            distress_score: 0,
            dom_score: 0,
            vacancy_score: score,
            score,
            priority: Priority::from_score(score),
            matched_keywords: Vec::new(),
        }
    }

    fn sample() -> Vec<ScoredProperty> {
        vec![
            make("1 Alpha St", "Parramatta", "Office", 70, Some(1_200_000), Some(200)),
            make("2 Beta Rd", "Penrith", "Retail", 40, None, None),
            make("3 Gamma Ave", "Parramatta", "Industrial", 10, Some(800_000), Some(30)),
            make("4 Delta Ln", "Blacktown", "Office", 40, Some(2_000_000), Some(90)),
        ]
    }

    fn addresses(props: &[ScoredProperty], idx: &[usize]) -> Vec<String> {
        idx.iter().map(|&i| props[i].address.clone()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let props = sample();
        let result = query_indices(&props, &FilterState::default(), SortKey::Score, SortDirection::Descending);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_empty_type_selection_equals_no_filter() {
        let props = sample();
        let filter = FilterState {
            property_types: HashSet::new(),
            ..Default::default()
        };
        assert_eq!(
            query(&props, &filter, SortKey::Address, SortDirection::Ascending),
            query(&props, &FilterState::default(), SortKey::Address, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_search_any_field_case_insensitive() {
        let mut props = sample();
        props[1].description = "Vacant PARRAMATTA-adjacent shop".to_string();
        let filter = FilterState {
            search: "parramatta".to_string(),
            ..Default::default()
        };
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["1 Alpha St", "2 Beta Rd", "3 Gamma Ave"]);
    }

    #[test]
    fn test_multi_select_filters() {
        let props = sample();
        let filter = FilterState {
            property_types: HashSet::from(["Office".to_string()]),
            suburbs: HashSet::from(["Parramatta".to_string(), "Blacktown".to_string()]),
            ..Default::default()
        };
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["1 Alpha St", "4 Delta Ln"]);

        let result = query_indices(&props, &FilterState::actionable(), SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["1 Alpha St", "2 Beta Rd", "4 Delta Ln"]);
    }

    #[test]
    fn test_null_price_survives_price_range() {
        let props = sample();
        let mut filter = FilterState::default();
        filter.set_price_range(Some(900_000), Some(1_500_000)).unwrap();
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["1 Alpha St", "2 Beta Rd"]);
    }

    #[test]
    fn test_price_range_inclusive() {
        let props = sample();
        let mut filter = FilterState::default();
        filter.set_price_range(Some(800_000), Some(800_000)).unwrap();
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["2 Beta Rd", "3 Gamma Ave"]);
    }

    #[test]
    fn test_unknown_dom_compares_as_zero() {
        let props = sample();
        let mut filter = FilterState::default();
        filter.set_dom_range(Some(0), Some(30)).unwrap();
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["2 Beta Rd", "3 Gamma Ave"]);
        assert_eq!(props[1].days_on_market, None);

        filter.set_dom_range(Some(1), None).unwrap();
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["1 Alpha St", "3 Gamma Ave", "4 Delta Ln"]);
    }

    #[test]
    fn test_score_floor() {
        let props = sample();
        let filter = FilterState {
            min_score: 40,
            ..Default::default()
        };
        let result = query_indices(&props, &filter, SortKey::Address, SortDirection::Ascending);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut filter = FilterState::default();
        assert_eq!(
            filter.set_price_range(Some(10), Some(5)),
            Err(QueryError::InvalidRange {
                name: "price",
                min: 10,
                max: 5
            })
        );
        assert!(filter.min_price.is_none());
    }

    #[test]
    fn test_sort_score_desc_then_asc_reverses() {
        let props = vec![
            make("a", "", "", 10, None, None),
            make("b", "", "", 90, None, None),
            make("c", "", "", 50, None, None),
        ];
        let desc = query_indices(&props, &FilterState::default(), SortKey::Score, SortDirection::Descending);
        let mut asc = query_indices(&props, &FilterState::default(), SortKey::Score, SortDirection::Ascending);
        asc.reverse();
        assert_eq!(desc, asc);
        assert_eq!(addresses(&props, &desc), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let props = sample();
        let result = query_indices(&props, &FilterState::default(), SortKey::Score, SortDirection::Descending);
        // 2 Beta Rd and 4 Delta Ln both score 40; input order kept
        assert_eq!(
            addresses(&props, &result),
            vec!["1 Alpha St", "2 Beta Rd", "4 Delta Ln", "3 Gamma Ave"]
        );
    }

    #[test]
    fn test_nulls_sort_last_both_directions() {
        let props = sample();
        for dir in [SortDirection::Ascending, SortDirection::Descending] {
            let result = query_indices(&props, &FilterState::default(), SortKey::AskingPrice, dir);
            assert_eq!(props[*result.last().unwrap()].address, "2 Beta Rd", "{dir:?}");
        }
        let asc = query_indices(&props, &FilterState::default(), SortKey::AskingPrice, SortDirection::Ascending);
        assert_eq!(
            addresses(&props, &asc),
            vec!["3 Gamma Ave", "1 Alpha St", "4 Delta Ln", "2 Beta Rd"]
        );
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let props = vec![
            make("b street", "", "", 0, None, None),
            make("A street", "", "", 0, None, None),
            make("C street", "", "", 0, None, None),
        ];
        let result = query_indices(&props, &FilterState::default(), SortKey::Address, SortDirection::Ascending);
        assert_eq!(addresses(&props, &result), vec!["A street", "b street", "C street"]);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("PRICE".parse::<SortKey>(), Ok(SortKey::AskingPrice));
        assert_eq!("dom".parse::<SortKey>(), Ok(SortKey::DaysOnMarket));
        assert!("height".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_summarize() {
        let props = sample();
        let s = summarize(&props);
        assert_eq!(s.total, 4);
        assert_eq!(s.high_priority, 1);
        assert_eq!(s.monitor, 2);
        assert_eq!(s.low, 1);
        assert_eq!(s.average_score, 40.0);
        assert_eq!(s.priced, 3);
        assert_eq!(s.average_price, Some(1_333_333));

        assert_eq!(summarize(&[]), PortfolioSummary::default());
    }

    #[test]
    fn test_facets_sorted_distinct() {
        let f = facets(&sample());
        assert_eq!(f.property_types, vec!["Industrial", "Office", "Retail"]);
        assert_eq!(f.suburbs, vec!["Blacktown", "Parramatta", "Penrith"]);
    }

    #[test]
    fn test_locale_cmp_folds_case_only() {
        assert_eq!(locale_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(locale_cmp("Alpha", "alpha"), Ordering::Less);
        assert_eq!(locale_cmp("alpha", "alpha"), Ordering::Equal);
        // Accented letters sort by code point, after plain ASCII.
        assert_eq!(locale_cmp("École", "Zeta"), Ordering::Greater);
    }
}
