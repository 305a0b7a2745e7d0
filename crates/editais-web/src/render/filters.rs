//! Filter panel: text query, one checkbox group per facet, date range.

use editais_catalog::{FacetValue, FilterSet};
use editais_catalog::filter::DATE_FORMAT;
use editais_common::entities::Facet;

use super::html_escape;

pub fn render_filters(filters: &FilterSet, facets: &[(Facet, Vec<FacetValue>)]) -> String {
    let groups: String = facets
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(facet, values)| {
            let boxes: String = values
                .iter()
                .map(|v| {
                    let checked = if filters.facets.is_selected(*facet, &v.value) { " checked" } else { "" };
                    format!(
                        r#"<label><input type="checkbox" name="{name}" value="{value}"{checked}> {value} <small>({count})</small></label><br>"#,
                        name = facet.as_str(),
                        value = html_escape(&v.value),
                        count = v.count,
                    )
                })
                .collect();
            format!(
                r#"<fieldset class="facet facet-{}"><legend>{}</legend>{}</fieldset>"#,
                facet.as_str(),
                facet.label(),
                boxes
            )
        })
        .collect();

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();

    format!(
        r#"<aside class="filters">
<form method="GET" action="/">
    <fieldset>
        <legend>Buscar</legend>
        <input type="search" name="q" value="{query}" placeholder="Título, descrição, instituição...">
    </fieldset>
    {groups}
    <fieldset class="dates">
        <legend>Prazo</legend>
        <label>De <input type="date" name="from" value="{from}"></label><br>
        <label>Até <input type="date" name="to" value="{to}"></label>
    </fieldset>
    <button type="submit" class="btn btn-primary">Filtrar</button>
    <a href="/" class="btn">Limpar</a>
</form>
</aside>"#,
        query = html_escape(&filters.query),
        from = date(filters.dates.start),
        to = date(filters.dates.end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_values_are_checked() {
        let filters = FilterSet::from_pairs([("region", "SP"), ("q", "inova")]);
        let facets = vec![(
            Facet::Region,
            vec![
                FacetValue { value: "RJ".into(), count: 1 },
                FacetValue { value: "SP".into(), count: 2 },
            ],
        )];
        let html = render_filters(&filters, &facets);
        assert!(html.contains(r#"name="region" value="SP" checked"#));
        assert!(html.contains(r#"name="region" value="RJ">"#));
        assert!(html.contains(r#"name="q" value="inova""#));
    }
}
