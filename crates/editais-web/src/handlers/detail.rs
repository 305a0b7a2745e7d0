//! Standalone detail page, `GET /editais/{id}`. Looks the id up in the
//! loaded collection only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};

use crate::render::layout::{alert, page, NavItem};
use crate::render::render_detail;
use crate::state::SharedState;

pub async fn detail_page(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> (StatusCode, Html<String>) {
    let mut banners = String::new();
    if let Err(e) = state.ensure_catalog().await {
        banners.push_str(&alert("error", &e.user_message()));
    }

    let catalog = state.catalog.read().await;
    let site = &state.config.ui.site_title;
    match catalog.find(&id) {
        Some(notice) => {
            let body = format!(
                r#"{banners}<main class="main-content"><section class="panel">{}<p><a class="btn" href="/">Voltar</a></p></section></main>"#,
                render_detail(notice)
            );
            (StatusCode::OK, Html(page(site, &notice.title, NavItem::Browse, &body)))
        }
        None => {
            banners.push_str(&alert("error", "Edital não encontrado."));
            let body = format!(r#"{banners}<main class="main-content"><a class="btn" href="/">Ver todos os editais</a></main>"#);
            (StatusCode::NOT_FOUND, Html(page(site, "Edital não encontrado", NavItem::Browse, &body)))
        }
    }
}
