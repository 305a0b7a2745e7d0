//! Notice cards for the browse page and the admin list.

use editais_common::Notice;

use super::{format_date, html_escape, safe_href, truncate_chars};

/// Tags shown on a card; the rest are only in the detail view.
const CARD_TAGS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    Public,
    /// Adds an edit action to each card.
    Admin,
}

/// Contents of the card container. Replaces whatever was there before;
/// an empty input yields a single `no-results` placeholder.
pub fn render_cards(notices: &[&Notice], mode: CardMode, preview_chars: usize) -> String {
    if notices.is_empty() {
        return r#"<div class="no-results">Nenhum edital encontrado para os filtros selecionados.</div>"#
            .to_string();
    }
    notices
        .iter()
        .map(|n| render_card(n, mode, preview_chars))
        .collect()
}

fn render_card(n: &Notice, mode: CardMode, preview_chars: usize) -> String {
    let id = html_escape(&n.id);

    let icon = n
        .icon
        .as_deref()
        .map(|i| format!(r#"<span class="card-icon">{}</span>"#, html_escape(i)))
        .unwrap_or_default();

    let tags: String = n
        .tags
        .iter()
        .take(CARD_TAGS)
        .map(|t| format!(r#"<span class="tag">{}</span>"#, html_escape(t)))
        .collect();

    let share = n
        .share_link
        .as_deref()
        .and_then(safe_href)
        .map(|href| {
            format!(r#"<a class="btn share" href="{href}" target="_blank" rel="noopener">Compartilhar</a>"#)
        })
        .unwrap_or_default();

    let (detail_href, edit) = match mode {
        CardMode::Public => (format!("/?id={}", urlencode(&n.id)), String::new()),
        CardMode::Admin => (
            format!("/editais/{}", urlencode(&n.id)),
            format!(
                r#"<a class="btn btn-primary edit" href="/admin?edit={}">Editar</a>"#,
                urlencode(&n.id)
            ),
        ),
    };

    format!(
        r#"<article class="card" data-id="{id}">
    <h3 class="card-title">{icon}{title}</h3>
    <p class="card-description">{description}</p>
    <div class="card-date">Prazo: {date}</div>
    <div class="card-tags">{tags}</div>
    <div class="card-badges"><span class="badge badge-region">{region}</span><span class="badge badge-category">{category}</span></div>
    <div class="card-actions"><a class="btn details" href="{detail_href}">Ver detalhes</a>{share}{edit}</div>
</article>
"#,
        title = html_escape(&n.title),
        description = html_escape(&truncate_chars(&n.description, preview_chars)),
        date = format_date(n.closing_date.as_deref()),
        region = html_escape(&n.region),
        category = html_escape(&n.category),
    )
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
