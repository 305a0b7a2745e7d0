//! Full detail of one notice, used by the modal on the browse page and by
//! the standalone `/editais/{id}` page.

use editais_common::entities::NOT_INFORMED;
use editais_common::Notice;

use super::{format_date, html_escape, safe_href};

pub fn render_detail(n: &Notice) -> String {
    let field = |label: &str, value: &str| {
        format!("<dt>{}</dt><dd>{}</dd>", label, html_escape(value))
    };

    let mut fields = String::new();
    fields.push_str(&field("Público-alvo", n.target_audience.as_deref().unwrap_or(NOT_INFORMED)));
    if let Some(value) = n.total_value.as_deref() {
        fields.push_str(&field("Valor total", value));
    }
    fields.push_str(&field("Instituição", n.institution.as_deref().unwrap_or(NOT_INFORMED)));
    fields.push_str(&field("Região", &n.region));
    fields.push_str(&field("Categoria", &n.category));
    fields.push_str(&field("Tipo de apoio", &n.support_type));
    fields.push_str(&field("Tipo de edital", &n.notice_type));
    fields.push_str(&field("Abertura", &format_date(n.opening_date.as_deref())));
    fields.push_str(&field("Prazo final", &format_date(n.closing_date.as_deref())));

    let tags = if n.tags.is_empty() {
        String::new()
    } else {
        let items: String = n
            .tags
            .iter()
            .map(|t| format!(r#"<span class="tag">{}</span>"#, html_escape(t)))
            .collect();
        format!(r#"<div class="detail-tags">{items}</div>"#)
    };

    let attachments = if n.attachments.is_empty() {
        "<li>Nenhum anexo disponível.</li>".to_string()
    } else {
        n.attachments
            .iter()
            .map(|a| match safe_href(&a.url) {
                Some(href) => format!(
                    r#"<li><a href="{href}" target="_blank" rel="noopener">{}</a></li>"#,
                    html_escape(&a.name)
                ),
                // Unusable links are listed by name only.
                None => format!("<li>{}</li>", html_escape(&a.name)),
            })
            .collect()
    };

    let share = n
        .share_link
        .as_deref()
        .and_then(safe_href)
        .map(|href| {
            format!(r#"<a class="btn share" href="{href}" target="_blank" rel="noopener">Compartilhar</a>"#)
        })
        .unwrap_or_default();

    let chat_href = format!(
        "/chat?{}",
        super::query_string([("edital", n.id.as_str())])
    );

    format!(
        r#"<article class="detail" id="detail-{id}">
    <h2>{title}</h2>
    <p class="detail-description">{description}</p>
    {tags}
    <dl>{fields}</dl>
    <details class="attachments">
        <summary>Anexos ({count})</summary>
        <ul>{attachments}</ul>
    </details>
    <div class="detail-actions">{share}<a class="btn" href="{chat_href}">Perguntar ao assistente</a></div>
</article>"#,
        id = html_escape(&n.id),
        title = html_escape(&n.title),
        description = html_escape(&n.description),
        count = n.attachments.len(),
        chat_href = html_escape(&chat_href),
    )
}
