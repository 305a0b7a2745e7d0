//! Page shell and navigation shared across all pages.

use super::html_escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Browse,
    Chat,
    Admin,
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1f2933; }
.nav { display: flex; gap: 1.5rem; align-items: center; padding: .75rem 2rem; background: #12355b; }
.nav a { color: #dbe7f3; text-decoration: none; }
.nav a.active { color: #fff; font-weight: 700; }
.nav .brand { color: #fff; font-weight: 800; margin-right: auto; }
.main-content { display: flex; gap: 2rem; padding: 1.5rem 2rem; align-items: flex-start; }
.filters { width: 260px; flex-shrink: 0; background: #fff; padding: 1rem; border-radius: 8px; }
.filters fieldset { border: none; padding: 0; margin: 0 0 1rem; }
.cards { flex: 1; display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1rem; display: flex; flex-direction: column; gap: .5rem; }
.card-title { margin: 0; font-size: 1.1rem; }
.tag, .badge { display: inline-block; font-size: .75rem; padding: .15rem .5rem; border-radius: 999px; background: #e4e7eb; margin-right: .25rem; }
.badge-region { background: #d9f2e6; }
.badge-category { background: #fde9c8; }
.btn { display: inline-block; padding: .35rem .75rem; border-radius: 6px; border: 1px solid #12355b; color: #12355b; text-decoration: none; background: #fff; cursor: pointer; }
.btn-primary { background: #12355b; color: #fff; }
.no-results { flex: 1; padding: 2rem; text-align: center; color: #616e7c; }
.alert { padding: .75rem 1rem; margin: 1rem 2rem 0; border-radius: 6px; }
.alert-error { background: #fde2e1; color: #8a1c1c; }
.alert-info { background: #e1effe; color: #1c3d8a; }
.alert-success { background: #def7ec; color: #03543f; }
.modal { position: fixed; inset: 0; background: rgba(0,0,0,.45); display: flex; align-items: center; justify-content: center; }
.modal-body { background: #fff; max-width: 720px; width: 90%; max-height: 85vh; overflow: auto; border-radius: 10px; padding: 1.5rem; }
.detail dl { display: grid; grid-template-columns: max-content 1fr; gap: .25rem 1rem; }
.detail dt { font-weight: 600; }
.panel { background: #fff; padding: 1.25rem; border-radius: 8px; flex: 1; }
.form-grid { display: grid; grid-template-columns: 1fr 1fr; gap: .75rem 1rem; }
.form-grid label { display: flex; flex-direction: column; gap: .25rem; font-size: .9rem; }
.form-grid .wide { grid-column: 1 / -1; }
.chat-log { list-style: none; padding: 0; display: flex; flex-direction: column; gap: .5rem; }
.chat-entry { padding: .5rem .75rem; border-radius: 8px; max-width: 75%; }
.chat-entry.user { align-self: flex-end; background: #12355b; color: #fff; }
.chat-entry.bot { align-self: flex-start; background: #e4e7eb; }
.chat-entry.pending { font-style: italic; opacity: .7; }
"#;

pub fn nav_html(site_title: &str, active: NavItem) -> String {
    let link = |item: NavItem, href: &str, label: &str| {
        let class = if item == active { " class=\"active\"" } else { "" };
        format!(r#"<a href="{href}"{class}>{label}</a>"#)
    };
    format!(
        r#"<nav class="nav"><span class="brand">{}</span>{}{}{}</nav>"#,
        html_escape(site_title),
        link(NavItem::Browse, "/", "Editais"),
        link(NavItem::Chat, "/chat", "Assistente"),
        link(NavItem::Admin, "/admin", "Administração"),
    )
}

/// Full HTML document around `body`.
pub fn page(site_title: &str, title: &str, active: NavItem, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{} — {}</title>
    <style>{}</style>
</head>
<body>
{}
{}
</body>
</html>"#,
        html_escape(title),
        html_escape(site_title),
        STYLE,
        nav_html(site_title, active),
        body
    )
}

/// Inline alert banner. `kind` is one of `error`, `info`, `success`.
pub fn alert(kind: &str, message: &str) -> String {
    format!(
        r#"<div class="alert alert-{kind}" role="alert">{}</div>"#,
        html_escape(message)
    )
}
