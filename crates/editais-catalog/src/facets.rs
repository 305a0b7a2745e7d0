//! Facet values derived from the loaded collection.
//! Recomputed from the data every time; never hand-maintained.

use serde::Serialize;
use std::collections::BTreeMap;

use editais_common::entities::Facet;
use editais_common::Notice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
}

/// Distinct values of one facet, alphabetically, with occurrence counts.
pub fn facet_values(notices: &[Notice], facet: Facet) -> Vec<FacetValue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for n in notices {
        *counts.entry(n.facet_value(facet)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| FacetValue { value: value.to_string(), count })
        .collect()
}

/// Every facet, in display order.
pub fn all_facets(notices: &[Notice]) -> Vec<(Facet, Vec<FacetValue>)> {
    Facet::ALL
        .iter()
        .map(|f| (*f, facet_values(notices, *f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use editais_common::entities::NOT_INFORMED;

    fn notice(region: &str) -> Notice {
        Notice {
            id: region.into(),
            title: "t".into(),
            description: "d".into(),
            region: region.into(),
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
    fn test_distinct_sorted_with_counts() {
        let notices = vec![notice("SP"), notice("RJ"), notice("SP")];
        assert_eq!(
            facet_values(&notices, Facet::Region),
            vec![
                FacetValue { value: "RJ".into(), count: 1 },
                FacetValue { value: "SP".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_empty_collection_has_no_values() {
        assert!(all_facets(&[]).iter().all(|(_, values)| values.is_empty()));
        assert_eq!(all_facets(&[]).len(), 4);
    }
}
