//! Text search backends for the free-text predicate.
//!
//! `SubstringSearch` is the default. When `FuzzySearch` is configured it
//! replaces substring matching entirely; the two are never combined.

use editais_common::config::SearchConfig;
use editais_common::Notice;
use std::cmp::Ordering;

/// Narrows a collection by a text query.
pub trait TextSearch: Send + Sync {
    /// Indices of matching notices, in the order results should be shown.
    fn narrow(&self, notices: &[Notice], query: &str) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// Build the backend selected in configuration.
pub fn from_config(config: &SearchConfig) -> Box<dyn TextSearch> {
    if config.fuzzy {
        Box::new(FuzzySearch::new(config.fuzzy_threshold))
    } else {
        Box::new(SubstringSearch)
    }
}

/// Fields the text predicate looks at: title, description, institution,
/// category and every tag.
pub fn searchable_fields(n: &Notice) -> impl Iterator<Item = &str> {
    [n.title.as_str(), n.description.as_str(), n.category.as_str()]
        .into_iter()
        .chain(n.institution.as_deref())
        .chain(n.tags.iter().map(String::as_str))
}

// ── Substring ─────────────────────────────────────────────────────────────────

/// Case-insensitive substring match, OR across fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstringSearch;

impl SubstringSearch {
    pub fn matches(notice: &Notice, needle_lower: &str) -> bool {
        searchable_fields(notice).any(|f| f.to_lowercase().contains(needle_lower))
    }
}

impl TextSearch for SubstringSearch {
    fn narrow(&self, notices: &[Notice], query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        notices
            .iter()
            .enumerate()
            .filter(|(_, n)| Self::matches(n, &needle))
            .map(|(i, _)| i)
            .collect()
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

// ── Fuzzy ─────────────────────────────────────────────────────────────────────

/// Word-level Jaro-Winkler matching. Results come back by descending score.
#[derive(Debug, Clone, Copy)]
pub struct FuzzySearch {
    threshold: f64,
}

impl FuzzySearch {
    pub fn new(threshold: f64) -> Self {
        Self { threshold: threshold.clamp(0.0, 1.0) }
    }

    /// Score in [0.0, 1.0]: each query word takes its best word match, the
    /// notice scores the mean. A substring hit on the whole query is 1.0.
    pub fn score(notice: &Notice, query_lower: &str) -> f64 {
        let fields: Vec<String> = searchable_fields(notice).map(str::to_lowercase).collect();
        if fields.iter().any(|f| f.contains(query_lower)) {
            return 1.0;
        }

        let words: Vec<&str> = fields
            .iter()
            .flat_map(|f| f.split(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .collect();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();
        if terms.is_empty() || words.is_empty() {
            return 0.0;
        }

        let total: f64 = terms
            .iter()
            .map(|t| {
                words
                    .iter()
                    .map(|w| strsim::jaro_winkler(t, w))
                    .fold(0.0, f64::max)
            })
            .sum();
        total / terms.len() as f64
    }
}

impl TextSearch for FuzzySearch {
    fn narrow(&self, notices: &[Notice], query: &str) -> Vec<usize> {
        let q = query.trim().to_lowercase();
        let mut hits: Vec<(usize, f64)> = notices
            .iter()
            .enumerate()
            .map(|(i, n)| (i, Self::score(n, &q)))
            .filter(|(_, s)| *s >= self.threshold)
            .collect();
        // stable: equal scores keep collection order
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        hits.into_iter().map(|(i, _)| i).collect()
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editais_common::entities::NOT_INFORMED;

    fn notice(id: &str, title: &str, description: &str) -> Notice {
        Notice {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            region: "BR".into(),
            category: "Geral".into(),
            support_type: NOT_INFORMED.into(),
            notice_type: NOT_INFORMED.into(),
            closing_date: None,
            opening_date: None,
            tags: vec![],
            attachments: vec![],
            share_link: None,
            total_value: None,
            target_audience: None,
            institution: None,
            icon: None,
        }
    }

    #[test]
    fn test_substring_is_case_insensitive_over_all_fields() {
        let mut tagged = notice("3", "Outro", "x");
        tagged.tags = vec!["AgroTech".into()];
        let mut by_inst = notice("4", "Mais um", "y");
        by_inst.institution = Some("FAPESP".into());
        let notices = vec![notice("1", "Bolsa", "apoio a AGRO"), notice("2", "Nada", "z"), tagged, by_inst];

        assert_eq!(SubstringSearch.narrow(&notices, "agro"), vec![0, 2]);
        assert_eq!(SubstringSearch.narrow(&notices, "fapesp"), vec![3]);
    }

    #[test]
    fn test_fuzzy_tolerates_typos_and_ranks() {
        let notices = vec![
            notice("1", "Bolsa Rural", "campo"),
            notice("2", "Programa de Inovacao", "empresas"),
            notice("3", "Inovação Tech", "startups"),
        ];
        let search = FuzzySearch::new(0.85);
        let hits = search.narrow(&notices, "inovação");
        assert_eq!(hits, vec![2, 1]);
    }

    #[test]
    fn test_fuzzy_threshold_excludes_unrelated() {
        let notices = vec![notice("1", "Bolsa Rural", "campo")];
        assert!(FuzzySearch::new(0.9).narrow(&notices, "satélite").is_empty());
    }

    #[test]
    fn test_from_config() {
        let mut config = SearchConfig::default();
        assert_eq!(from_config(&config).name(), "substring");
        config.fuzzy = true;
        assert_eq!(from_config(&config).name(), "fuzzy");
    }
}
