//! Application state for the browsing session.
//!
//! The collection is replaced wholesale by each completed load and is never
//! mutated in between. Loads are ticketed: a response that arrives after a
//! newer load was started is discarded.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use editais_common::entities::Facet;
use editais_common::{Notice, RequestSequence, Ticket};

use crate::facets::{all_facets, FacetValue};
use crate::filter::{apply, FilterSet};
use crate::normalise::NormalizeReport;
use crate::search::TextSearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { loaded: usize, rejected: usize },
    Stale,
}

#[derive(Debug, Default)]
pub struct Catalog {
    notices: Vec<Notice>,
    rejected: usize,
    loaded_at: Option<Instant>,
    sequence: RequestSequence,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load; the returned ticket must accompany its completion.
    pub fn begin_load(&mut self) -> Ticket {
        self.sequence.issue()
    }

    /// Install a load result unless a newer load has started since.
    pub fn complete_load(&mut self, ticket: Ticket, report: NormalizeReport) -> LoadOutcome {
        if !self.sequence.is_current(ticket) {
            debug!(ticket = ticket.value(), "Discarding stale catalog load");
            return LoadOutcome::Stale;
        }
        let loaded = report.notices.len();
        let rejected = report.rejected.len();
        self.notices = report.notices;
        self.rejected = rejected;
        self.loaded_at = Some(Instant::now());
        info!(loaded, rejected, "Catalog loaded");
        LoadOutcome::Applied { loaded, rejected }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    /// Never loaded, or loaded longer ago than `max_age`.
    pub fn needs_refresh(&self, max_age: Duration) -> bool {
        self.loaded_at.map_or(true, |t| t.elapsed() >= max_age)
    }

    /// Records dropped by the normalizer in the last load.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn find(&self, id: &str) -> Option<&Notice> {
        self.notices.iter().find(|n| n.id == id)
    }

    pub fn filter(&self, filters: &FilterSet, search: &dyn TextSearch) -> Vec<&Notice> {
        apply(&self.notices, filters, search)
    }

    pub fn facets(&self) -> Vec<(Facet, Vec<FacetValue>)> {
        all_facets(&self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalise::{normalize_all, RawNotice};
    use serde_json::json;

    fn report(ids: &[u32]) -> NormalizeReport {
        let raw: Vec<RawNotice> = ids
            .iter()
            .map(|id| serde_json::from_value(json!({ "id": id, "titulo": format!("Edital {id}") })).unwrap())
            .collect();
        normalize_all(&raw)
    }

    #[test]
    fn test_load_installs_collection() {
        let mut catalog = Catalog::new();
        assert!(catalog.needs_refresh(Duration::from_secs(60)));

        let ticket = catalog.begin_load();
        let outcome = catalog.complete_load(ticket, report(&[1, 2]));
        assert_eq!(outcome, LoadOutcome::Applied { loaded: 2, rejected: 0 });
        assert!(catalog.is_loaded());
        assert!(!catalog.needs_refresh(Duration::from_secs(60)));
        assert_eq!(catalog.find("2").map(|n| n.title.as_str()), Some("Edital 2"));
        assert!(catalog.find("9").is_none());
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut catalog = Catalog::new();
        let slow = catalog.begin_load();
        let fast = catalog.begin_load();

        assert_eq!(catalog.complete_load(fast, report(&[1, 2, 3])), LoadOutcome::Applied { loaded: 3, rejected: 0 });
        assert_eq!(catalog.complete_load(slow, report(&[7])), LoadOutcome::Stale);
        assert_eq!(catalog.notices().len(), 3);
    }

    #[test]
    fn test_zero_max_age_always_refreshes() {
        let mut catalog = Catalog::new();
        let t = catalog.begin_load();
        catalog.complete_load(t, report(&[1]));
        assert!(catalog.needs_refresh(Duration::ZERO));
    }
}
