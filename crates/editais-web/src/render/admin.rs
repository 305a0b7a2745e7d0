//! Admin login form, notice list and the create/update form.

use editais_client::admin::{FormAction, NoticeForm};

use super::html_escape;

pub fn render_login(email: &str) -> String {
    format!(
        r#"<main class="main-content">
<section class="panel" style="max-width:420px">
    <h1>Entrar</h1>
    <form method="POST" action="/admin/login" class="form-grid">
        <label class="wide">E-mail <input type="email" name="email" value="{}" required></label>
        <label class="wide">Senha <input type="password" name="senha" required></label>
        <button type="submit" class="btn btn-primary">Entrar</button>
    </form>
</section>
</main>"#,
        html_escape(email)
    )
}

/// Admin list; `form` is rendered above the cards when open.
pub fn render_admin(greeting: &str, cards: &str, form: Option<&NoticeForm>) -> String {
    let form_html = form.map(render_form).unwrap_or_default();
    format!(
        r#"<main class="main-content" style="flex-direction:column">
<section class="panel admin-header">
    <p>{}</p>
    <a class="btn btn-primary" href="/admin?new=1">Novo edital</a>
    <form method="POST" action="/admin/logout" style="display:inline">
        <button type="submit" class="btn">Sair</button>
    </form>
</section>
{}
<section id="cards" class="cards">
{}
</section>
</main>"#,
        html_escape(greeting),
        form_html,
        cards
    )
}

pub fn render_form(form: &NoticeForm) -> String {
    let heading = match form.action() {
        FormAction::Create => "Novo edital".to_string(),
        FormAction::Update(id) => format!("Editar edital #{}", html_escape(&id)),
    };
    let input = |label: &str, name: &str, value: &str, kind: &str| {
        format!(
            r#"<label>{label} <input type="{kind}" name="{name}" value="{}"></label>"#,
            html_escape(value)
        )
    };
    let area = |label: &str, name: &str, value: &str, hint: &str| {
        format!(
            r#"<label class="wide">{label} <textarea name="{name}" rows="4" placeholder="{hint}">{}</textarea></label>"#,
            html_escape(value)
        )
    };

    let fields = [
        input("Título", "titulo", &form.titulo, "text"),
        input("Instituição", "instituicao", &form.instituicao, "text"),
        area("Descrição", "descricao", &form.descricao, ""),
        input("Região", "regiao", &form.regiao, "text"),
        input("Categoria", "categoria", &form.categoria, "text"),
        input("Tipo de apoio", "tipo_apoio", &form.tipo_apoio, "text"),
        input("Tipo de edital", "tipo_edital", &form.tipo_edital, "text"),
        input("Abertura", "data_abertura", &form.data_abertura, "date"),
        input("Prazo final", "data_final_submissao", &form.data_final_submissao, "date"),
        input("Valor total", "valor_total", &form.valor_total, "text"),
        input("Público-alvo", "publico_alvo", &form.publico_alvo, "text"),
        input("Tags (separadas por vírgula)", "tags", &form.tags, "text"),
        input("Ícone", "icone", &form.icone, "text"),
        area("Anexos (um por linha: nome | url)", "anexos", &form.anexos, "Regulamento | https://..."),
    ]
    .concat();

    format!(
        r#"<section class="panel notice-form">
    <h2>{heading}</h2>
    <form method="POST" action="/admin/editais" class="form-grid">
        <input type="hidden" name="id" value="{id}">
        {fields}
        <div class="wide">
            <button type="submit" class="btn btn-primary">Salvar</button>
            <a class="btn" href="/admin">Cancelar</a>
        </div>
    </form>
</section>"#,
        id = html_escape(form.id.trim()),
    )
}
