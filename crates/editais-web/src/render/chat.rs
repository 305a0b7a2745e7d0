//! Chat widget page.

use editais_client::chat::{ChatContext, ChatEntry, ChatWidget, Speaker};

use super::html_escape;

fn render_entry(entry: &ChatEntry) -> String {
    let mut class = match entry.speaker {
        Speaker::User => "chat-entry user".to_string(),
        Speaker::Bot => "chat-entry bot".to_string(),
    };
    if entry.pending {
        class.push_str(" pending");
    }

    let options: String = entry
        .options
        .iter()
        .map(|o| {
            format!(
                r#"<form method="POST" action="/chat/select" class="chat-option"><input type="hidden" name="option_id" value="{}"><button type="submit" class="btn">{}</button></form>"#,
                html_escape(&o.id),
                html_escape(&o.titulo)
            )
        })
        .collect();

    format!(
        r#"<li class="{class}">{}{options}</li>"#,
        html_escape(&entry.text)
    )
}

pub fn render_chat(widget: &ChatWidget) -> String {
    let scope = match widget.context() {
        ChatContext::Idle => String::new(),
        ChatContext::Scoped { title, .. } => format!(
            r#"<div class="chat-scope alert alert-info">Conversando sobre: <strong>{}</strong> (digite "sair" para voltar)</div>"#,
            html_escape(title)
        ),
    };
    let entries: String = widget.entries().iter().map(render_entry).collect();
    let disabled = if widget.is_busy() { " disabled" } else { "" };

    format!(
        r#"<main class="main-content">
<section class="panel chat">
    <h1>Assistente de editais</h1>
    {scope}
    <ul class="chat-log">{entries}</ul>
    <form method="POST" action="/chat/send">
        <input type="text" name="message" placeholder="Digite sua pergunta..." autocomplete="off"{disabled}>
        <button type="submit" class="btn btn-primary"{disabled}>Enviar</button>
    </form>
</section>
</main>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_widget_shows_banner() {
        let widget = ChatWidget::scoped("7", "Inovação <Tech>");
        let html = render_chat(&widget);
        assert!(html.contains("Conversando sobre: <strong>Inovação &lt;Tech&gt;</strong>"));
    }

    #[test]
    fn test_busy_widget_shows_pending_and_disables_input() {
        let mut widget = ChatWidget::new();
        widget.begin_send("oi").unwrap();
        let html = render_chat(&widget);
        assert!(html.contains("chat-entry bot pending"));
        assert!(html.contains("autocomplete=\"off\" disabled"));
    }
}
