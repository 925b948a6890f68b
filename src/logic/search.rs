// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Paged record search with selection and stale-request supersession.

use std::collections::BTreeSet;

use crate::models::record::{GlobalId, Record, RecordKind};

pub const PAGE_SIZES: [usize; 4] = [5, 10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Listing parameters sent to the inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub kind: Option<RecordKind>,
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            kind: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchParams {
    /// Whether `record` matches the query and kind filter.
    pub fn matches(&self, record: &Record) -> bool {
        if self.kind.is_some_and(|k| k != record.kind()) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let fields = &record.fields;
        record.global_id.to_string().to_lowercase().contains(&query)
            || fields.name.to_lowercase().contains(&query)
            || fields.description.to_lowercase().contains(&query)
            || fields
                .tags
                .items()
                .iter()
                .any(|t| t.to_lowercase().contains(&query))
    }
}

/// One page of results plus the total match count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultsPage {
    pub records: Vec<Record>,
    pub total: usize,
}

/// Identifies one issued search; only the latest ticket may land results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

/// Search state owned by the listing view.
#[derive(Clone, Debug, Default)]
pub struct Search {
    params: SearchParams,
    latest: u64,
    loading: bool,
    results: ResultsPage,
    selection: BTreeSet<GlobalId>,
}

impl Search {
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[Record] {
        &self.results.records
    }

    pub fn total(&self) -> usize {
        self.results.total
    }

    pub fn page_count(&self) -> usize {
        self.results.total.div_ceil(self.params.page_size.max(1)).max(1)
    }

    /// Make `params` authoritative and return the ticket for the request to issue.
    pub fn begin(&mut self, params: SearchParams) -> SearchTicket {
        self.params = params;
        self.latest += 1;
        self.loading = true;
        SearchTicket(self.latest)
    }

    /// Land results for `ticket`. Returns `false` and changes nothing when the
    /// ticket was superseded by a newer [`Search::begin`].
    pub fn complete(&mut self, ticket: SearchTicket, page: ResultsPage) -> bool {
        if ticket.0 != self.latest {
            tracing::debug!(
                stale = ticket.0,
                latest = self.latest,
                "discarding stale search results"
            );
            return false;
        }
        self.loading = false;
        self.results = page;
        true
    }

    /// Mark the latest request as failed; stale failures are ignored.
    pub fn fail(&mut self, ticket: SearchTicket) -> bool {
        if ticket.0 != self.latest {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn selection(&self) -> &BTreeSet<GlobalId> {
        &self.selection
    }

    pub fn is_selected(&self, id: &GlobalId) -> bool {
        self.selection.contains(id)
    }

    pub fn set_selected(&mut self, id: GlobalId, selected: bool) {
        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(&id);
        }
    }

    /// Select every record on the current page.
    pub fn select_page(&mut self) {
        let ids = self.results.records.iter().map(|r| r.global_id.clone());
        self.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Replace listed records with fresh copies after a save.
    pub fn refresh_records(&mut self, updated: &[Record]) {
        for record in &mut self.results.records {
            if let Some(fresh) = updated.iter().find(|u| u.global_id == record.global_id) {
                *record = fresh.clone();
            }
        }
    }
}
