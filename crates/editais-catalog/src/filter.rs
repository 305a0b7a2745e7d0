//! Filter engine: text, facet and date-range predicates over the catalog.
//!
//! `apply` is a pure function of the collection and the predicate set and
//! never mutates the collection. With an order-preserving text backend every
//! predicate is a commutative AND; with fuzzy search the text predicate runs
//! first and fixes the result order, then facets, then dates.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use editais_common::entities::Facet;
use editais_common::Notice;

use crate::search::TextSearch;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Facet selection ───────────────────────────────────────────────────────────

/// Checked values per facet. An empty set places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    selected: BTreeMap<Facet, BTreeSet<String>>,
}

impl FacetSelection {
    pub fn select(&mut self, facet: Facet, value: impl Into<String>) {
        self.selected.entry(facet).or_default().insert(value.into());
    }

    pub fn with(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.select(facet, value);
        self
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.selected
            .get(&facet)
            .is_some_and(|set| set.contains(value))
    }

    pub fn values(&self, facet: Facet) -> impl Iterator<Item = &str> {
        self.selected
            .get(&facet)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.selected.values().all(BTreeSet::is_empty)
    }

    /// AND across facets, membership within one facet.
    pub fn matches(&self, notice: &Notice) -> bool {
        self.selected
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .all(|(facet, set)| set.contains(notice.facet_value(*facet)))
    }
}

// ── Date range ────────────────────────────────────────────────────────────────

/// Inclusive on both ends; the end bound covers its whole calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Records without a parseable closing/opening date never match an
    /// active range.
    pub fn contains(&self, notice: &Notice) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = notice
            .reference_date()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
        else {
            return false;
        };
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

// ── Filter set ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub query: String,
    pub facets: FacetSelection,
    pub dates: DateRange,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.facets.is_empty() && !self.dates.is_active()
    }

    /// Decode from query-string pairs: `q`, repeated facet keys, `from`, `to`.
    /// Unknown keys and unparseable dates are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = FilterSet::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if value.is_empty() {
                continue;
            }
            match key {
                "q" => set.query = value.to_string(),
                "from" => set.dates.start = parse_date_param(key, value),
                "to" => set.dates.end = parse_date_param(key, value),
                other => match Facet::from_str(other) {
                    Some(facet) => set.facets.select(facet, value),
                    None => debug!(key = other, "Ignoring unknown filter parameter"),
                },
            }
        }
        set
    }

    /// Inverse of `from_pairs`, used to build links that keep the filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.query.trim().is_empty() {
            pairs.push(("q", self.query.clone()));
        }
        for facet in Facet::ALL {
            for v in self.facets.values(facet) {
                pairs.push((facet.as_str(), v.to_string()));
            }
        }
        if let Some(d) = self.dates.start {
            pairs.push(("from", d.format(DATE_FORMAT).to_string()));
        }
        if let Some(d) = self.dates.end {
            pairs.push(("to", d.format(DATE_FORMAT).to_string()));
        }
        pairs
    }
}

fn parse_date_param(key: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(d) => Some(d),
        Err(e) => {
            debug!(key, value, error = %e, "Ignoring invalid date bound");
            None
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Filtered view of `notices`. Never mutates the collection.
pub fn apply<'a>(
    notices: &'a [Notice],
    filters: &FilterSet,
    search: &dyn TextSearch,
) -> Vec<&'a Notice> {
    let query = filters.query.trim();
    let candidates: Vec<usize> = if query.is_empty() {
        (0..notices.len()).collect()
    } else {
        search.narrow(notices, query)
    };

    let out: Vec<&Notice> = candidates
        .into_iter()
        .filter_map(|i| notices.get(i))
        .filter(|n| filters.facets.matches(n))
        .filter(|n| filters.dates.contains(n))
        .collect();

    debug!(
        backend = search.name(),
        total = notices.len(),
        matched = out.len(),
        "Applied filters"
    );
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
