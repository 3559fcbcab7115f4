// distress-triage - core/mapper.rs
//
// Maps raw export headers onto canonical fields using a static alias table.
// Matching is greedy and order-dependent: fields are visited in declaration
// order, aliases in listed order, and a header claimed by an earlier field
// is never reused.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::Field;
use crate::util::error::MappingError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Accepted header aliases per canonical field, in matching order.
///
/// Entries are written pre-normalised (lowercase, single spaces). The last
/// aliases of several fields are the labels used by `core::export`, so a
/// re-imported export maps itself.
pub const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Address,
        &["address", "property address", "street address", "full address", "display address", "street"],
    ),
    (Field::Suburb, &["suburb", "locality", "city", "town", "suburb name"]),
    (Field::State, &["state", "state code", "st"]),
    (Field::Postcode, &["postcode", "post code", "postal code", "zip", "zip code"]),
    (
        Field::PropertyType,
        &["property type", "type", "asset type", "property category", "category", "usage"],
    ),
    (
        Field::AskingPrice,
        &[
            "asking price",
            "price",
            "price text",
            "display price",
            "list price",
            "listing price",
            "price guide",
            "asking price (aud)",
        ],
    ),
    (
        Field::LandArea,
        &["land area", "land size", "site area", "land area sqm", "land area (sqm)", "land"],
    ),
    (
        Field::BuildingArea,
        &[
            "building area",
            "floor area",
            "building size",
            "nla",
            "building area sqm",
            "building area (sqm)",
        ],
    ),
    (
        Field::DaysOnMarket,
        &["days on market", "dom", "days listed", "days on site", "listing age", "days"],
    ),
    (Field::Agent, &["agent", "agent name", "listing agent", "contact name", "contact"]),
    (Field::Agency, &["agency", "agency name", "office", "brokerage", "agent company"]),
    (
        Field::Url,
        &["url", "listing url", "link", "listing link", "property url", "web address"],
    ),
    (
        Field::Council,
        &["council", "lga", "local government area", "local council", "municipality"],
    ),
    (
        Field::ListingType,
        &["listing type", "sale type", "sale method", "method of sale", "listing method"],
    ),
    (
        Field::Description,
        &["description", "listing description", "details", "property description", "summary", "comments"],
    ),
];

/// Normalise a header (or alias) for comparison: lowercase, trimmed,
/// runs of `_` / `-` turned into a space, and repeated whitespace collapsed.
pub fn normalize_header(raw: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[_\-]+").expect("normalize_header: invalid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("normalize_header: invalid regex"));

    let lowered = raw.to_lowercase();
    let replaced = separators.replace_all(&lowered, " ");
    spaces.replace_all(replaced.trim(), " ").into_owned()
}

// =============================================================================
// ColumnMap
// =============================================================================

/// Canonical field -> raw header name. Fields without a column are absent.
///
/// Iterates in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    columns: BTreeMap<Field, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw header mapped to `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Map `field` to `header`, replacing any previous mapping for the field.
    ///
    /// If another field already holds `header` it is unmapped, so a header is
    /// never claimed twice.
    pub fn set(&mut self, field: Field, header: impl Into<String>) {
        let header = header.into();
        self.columns.retain(|f, h| *f == field || *h != header);
        self.columns.insert(field, header);
    }

    /// Remove the mapping for `field`. Returns the header it held.
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.columns.remove(&field)
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `(field, header)` pairs in field declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.columns.iter().map(|(f, h)| (*f, h.as_str()))
    }

    /// Fields with no mapped column, in declaration order.
    pub fn unmapped(&self) -> Vec<Field> {
        Field::all()
            .iter()
            .copied()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }

    /// True when enough fields are mapped to process the file unattended.
    pub fn meets_threshold(&self, min_mapped: usize) -> bool {
        self.len() >= min_mapped
    }

    /// Apply manual `field=Header` overrides on top of the current mapping.
    ///
    /// Field keys are matched case-insensitively. Headers must match a column
    /// in `headers` exactly or after normalisation; the original header text
    /// is stored. An empty header (`field=`) removes the field's mapping.
    pub fn apply_overrides<S: AsRef<str>>(
        &mut self,
        overrides: &[S],
        headers: &[String],
    ) -> Result<(), MappingError> {
        for raw in overrides {
            let raw = raw.as_ref();
            let (field_key, header) =
                raw.split_once('=')
                    .ok_or_else(|| MappingError::MalformedOverride {
                        raw: raw.to_string(),
                    })?;

            let field: Field = field_key.parse().map_err(|_| MappingError::UnknownField {
                field: field_key.trim().to_string(),
            })?;

            let header = header.trim();
            if header.is_empty() {
                self.remove(field);
                continue;
            }

            let wanted = normalize_header(header);
            let actual = headers
                .iter()
                .find(|h| h.as_str() == header)
                .or_else(|| headers.iter().find(|h| normalize_header(h) == wanted))
                .ok_or_else(|| MappingError::UnknownHeader {
                    field: field.key().to_string(),
                    header: header.to_string(),
                })?;

            tracing::debug!(field = field.key(), header = %actual, "Manual column override");
            self.set(field, actual.clone());
        }
        Ok(())
    }
}

/// Build a column map from the header row of an export.
///
/// Never fails: unmatched fields are simply absent. Callers decide how many
/// mapped fields they need before trusting the result.
pub fn auto_map(headers: &[String]) -> ColumnMap {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut map = ColumnMap::new();

    for (field, aliases) in FIELD_ALIASES {
        'aliases: for alias in aliases.iter() {
            let alias = normalize_header(alias);
            for (idx, header) in normalized.iter().enumerate() {
                if claimed[idx] || *header != alias {
                    continue;
                }
                claimed[idx] = true;
                map.columns.insert(*field, headers[idx].clone());
                break 'aliases;
            }
        }
    }

    tracing::debug!(
        headers = headers.len(),
        mapped = map.len(),
        "Auto-mapped columns"
    );
    map
}
