// distress-triage - app/state.rs
//
// Triage session state: the scored batch, the current filter and sort,
// and the cached view (indices into the batch matching the filter).
// The batch itself is never edited; re-scoring swaps in a new one.

use crate::core::model::{FilterFacets, PortfolioSummary, ScoredProperty};
use crate::core::query::{self, FilterState, SortDirection, SortKey};

/// Scored listings plus the query currently applied to them.
#[derive(Debug, Clone, Default)]
pub struct TriageState {
    /// All scored listings from the current import.
    properties: Vec<ScoredProperty>,

    /// Current filter configuration.
    pub filter: FilterState,

    pub sort_key: SortKey,
    pub sort_direction: SortDirection,

    /// Indices of properties matching the current filter, in sorted order.
    visible: Vec<usize>,
}

impl TriageState {
    /// Create state over a scored batch, showing everything by score (desc).
    pub fn new(properties: Vec<ScoredProperty>) -> Self {
        let mut state = Self {
            properties,
            ..Default::default()
        };
        state.apply_query();
        state
    }

    /// Replace the scored batch (e.g. after re-mapping columns) and re-run
    /// the current query over it.
    pub fn replace_properties(&mut self, properties: Vec<ScoredProperty>) {
        self.properties = properties;
        self.apply_query();
    }

    /// Recompute the visible view from the current filter and sort.
    pub fn apply_query(&mut self) {
        self.visible = query::query_indices(
            &self.properties,
            &self.filter,
            self.sort_key,
            self.sort_direction,
        );
        tracing::debug!(
            total = self.properties.len(),
            visible = self.visible.len(),
            sort = self.sort_key.key(),
            "Query applied"
        );
    }

    /// Reset all filters to "show everything".
    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.apply_query();
    }

    pub fn properties(&self) -> &[ScoredProperty] {
        &self.properties
    }

    /// Properties matching the filter, in sort order.
    pub fn visible(&self) -> impl Iterator<Item = &ScoredProperty> {
        self.visible.iter().map(|&idx| &self.properties[idx])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Owned copies of the visible properties (for export).
    pub fn visible_cloned(&self) -> Vec<ScoredProperty> {
        self.visible().cloned().collect()
    }

    /// Statistics over the visible properties.
    pub fn summary(&self) -> PortfolioSummary {
        query::summarize(&self.visible_cloned())
    }

    /// Filter options derived from the full batch, not just the visible set,
    /// so a selection can always be widened again.
    pub fn facets(&self) -> FilterFacets {
        query::facets(&self.properties)
    }
}
