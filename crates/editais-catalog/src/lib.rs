//! editais-catalog — In-memory catalog of funding notices.
//! Turns raw API records into canonical notices and derives filtered views:
//!   - Normalizer (raw record → `Notice`)
//!   - Filter engine (text, facets, date range)
//!   - Text search backends (substring, fuzzy)
//!   - Facet derivation
//!   - `Catalog` application state with stale-load protection

pub mod normalise;
pub mod filter;
pub mod search;
pub mod facets;
pub mod catalog;

pub use catalog::{Catalog, LoadOutcome};
pub use facets::{all_facets, facet_values, FacetValue};
pub use filter::{apply, DateRange, FacetSelection, FilterSet};
pub use normalise::{normalize, normalize_all, NormalizeError, NormalizeReport, RawNotice};
pub use search::{FuzzySearch, SubstringSearch, TextSearch};
