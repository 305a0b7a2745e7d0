//! Browse page: filters, facets, cards and the deep-linked detail modal.

use axum::{
    extract::{Path, RawQuery, State},
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::debug;

use editais_catalog::{FacetValue, FilterSet};
use editais_common::entities::Facet;
use editais_common::Notice;

use crate::error::WebError;
use crate::render::filters::render_filters;
use crate::render::layout::{alert, page, NavItem};
use crate::render::{html_escape, query_string, render_cards, render_detail, CardMode};
use crate::state::{AppState, SharedState};

/// Query-string pairs, with the `id` deep-link parameter split off.
fn decode_query(raw: Option<&str>) -> (FilterSet, Option<String>) {
    let pairs: Vec<(String, String)> = raw
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let deep_link = pairs
        .iter()
        .find(|(k, v)| k == "id" && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_string());
    let filters = FilterSet::from_pairs(
        pairs
            .iter()
            .filter(|(k, _)| k != "id")
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    (filters, deep_link)
}

pub async fn browse_page(State(state): State<SharedState>, RawQuery(raw): RawQuery) -> Html<String> {
    let (filters, deep_link) = decode_query(raw.as_deref());

    let mut banners = String::new();
    if let Err(e) = state.ensure_catalog().await {
        banners.push_str(&alert(
            "error",
            &format!("Não foi possível carregar os editais. {}", e.user_message()),
        ));
    }

    let catalog = state.catalog.read().await;
    if catalog.rejected() > 0 {
        banners.push_str(&alert(
            "info",
            &format!("{} registro(s) ignorado(s) por conter dados inválidos.", catalog.rejected()),
        ));
    }

    let modal = match deep_link.as_deref() {
        None => String::new(),
        Some(id) => match catalog.find(id) {
            Some(notice) => {
                let pairs = filters.to_pairs();
                let close = query_string(pairs.iter().map(|(k, v)| (*k, v.as_str())));
                format!(
                    r#"<div class="modal" role="dialog" aria-modal="true"><div class="modal-body">{}<p><a class="btn" href="/?{}">Fechar</a></p></div></div>"#,
                    render_detail(notice),
                    html_escape(&close)
                )
            }
            None => {
                debug!(id, "Deep link to unknown notice");
                banners.push_str(&alert("error", "Edital não encontrado."));
                String::new()
            }
        },
    };

    let results = catalog.filter(&filters, state.search.as_ref());
    let facets = catalog.facets();

    let body = format!(
        r#"{banners}
<main class="main-content">
{filters_html}
<div style="flex:1">
    <p class="result-count">{count} edital(is) encontrado(s)</p>
    <section id="cards" class="cards">
{cards}
    </section>
</div>
</main>
{modal}"#,
        filters_html = render_filters(&filters, &facets),
        count = results.len(),
        cards = render_cards(&results, CardMode::Public, state.config.ui.description_preview_chars),
    );

    Html(page(&state.config.ui.site_title, "Editais", NavItem::Browse, &body))
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FacetGroup {
    pub facet: Facet,
    pub label: &'static str,
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Serialize)]
pub struct EditaisResponse {
    pub total: usize,
    pub notices: Vec<Notice>,
    pub facets: Vec<FacetGroup>,
}

/// Reload when stale. A failed reload is only an error if no collection
/// was ever loaded; otherwise the previous one is served.
async fn ensure_servable(state: &AppState) -> Result<(), WebError> {
    if let Err(e) = state.ensure_catalog().await {
        if !state.catalog.read().await.is_loaded() {
            return Err(e.into());
        }
    }
    Ok(())
}

/// GET /api/editais: filtered notices and facet values as JSON.
pub async fn api_editais(
    State(state): State<SharedState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<EditaisResponse>, WebError> {
    let (filters, _) = decode_query(raw.as_deref());
    ensure_servable(&state).await?;

    let catalog = state.catalog.read().await;
    let notices: Vec<Notice> = catalog
        .filter(&filters, state.search.as_ref())
        .into_iter()
        .cloned()
        .collect();
    let facets = catalog
        .facets()
        .into_iter()
        .map(|(facet, values)| FacetGroup { facet, label: facet.label(), values })
        .collect();

    Ok(Json(EditaisResponse { total: notices.len(), notices, facets }))
}

/// GET /api/editais/{id}: one notice as JSON.
pub async fn api_edital(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Notice>, WebError> {
    ensure_servable(&state).await?;
    let notice = state.catalog.read().await.find(id.trim()).cloned();
    notice.map(Json).ok_or_else(|| WebError::NotFound(format!("Edital {id}")))
}
