//! Admin panel logic: session verification, login, and the single
//! create/update form.
//!
//! The form carries a hidden `id`. Blank means a new notice
//! (`POST /admin/editais`); anything else updates that id
//! (`PUT /admin/editais/{id}`).

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use editais_catalog::{normalize_all, NormalizeReport};
use editais_common::entities::NOT_INFORMED;
use editais_common::Notice;

use crate::api::EditaisApi;
use crate::error::ClientError;

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Granted { greeting: String },
    Denied { reason: String },
}

impl AuthDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthDecision::Granted { .. })
    }
}

/// Check a stored token against the protected endpoint.
/// Any failure, not only 401/403, denies access.
pub async fn verify_session(api: &dyn EditaisApi, token: Option<&str>) -> AuthDecision {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        return AuthDecision::Denied { reason: "no token".to_string() };
    };
    match api.verify_token(token).await {
        Ok(resp) => AuthDecision::Granted { greeting: resp.msg },
        Err(e) => {
            warn!(error = %e, "Admin token rejected");
            AuthDecision::Denied { reason: e.to_string() }
        }
    }
}

/// Exchange credentials for a bearer token.
pub async fn login(
    api: &dyn EditaisApi,
    email: &str,
    password: &SecretString,
) -> Result<String, ClientError> {
    let resp = api.login(email.trim(), password).await?;
    if resp.access_token.trim().is_empty() {
        return Err(ClientError::Status {
            status: 200,
            detail: "resposta de login sem token".to_string(),
        });
    }
    info!(email = email.trim(), "Admin logged in");
    Ok(resp.access_token)
}

/// All notices as the admin sees them, normalized.
pub async fn list_for_admin(api: &dyn EditaisApi, token: &str) -> Result<NormalizeReport, ClientError> {
    let raw = api.list_notices_admin(token).await?;
    Ok(normalize_all(&raw))
}

// ── Form ──────────────────────────────────────────────────────────────────────

/// The create/update form exactly as submitted. Every field is free text;
/// `tags` is comma-separated and `anexos` holds one `nome | url` per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeForm {
    pub id: String,
    pub titulo: String,
    pub descricao: String,
    pub regiao: String,
    pub categoria: String,
    pub tipo_apoio: String,
    pub tipo_edital: String,
    pub data_abertura: String,
    pub data_final_submissao: String,
    pub tags: String,
    pub valor_total: String,
    pub publico_alvo: String,
    pub instituicao: String,
    pub icone: String,
    pub anexos: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Create,
    Update(String),
}

impl FormAction {
    pub fn from_form(form: &NoticeForm) -> Self {
        match form.id.trim() {
            "" => FormAction::Create,
            id => FormAction::Update(id.to_string()),
        }
    }
}

/// `Não informado` is a display default, not something to write back.
fn editable(value: &str) -> String {
    if value == NOT_INFORMED {
        String::new()
    } else {
        value.to_string()
    }
}

impl NoticeForm {
    /// Prefill for editing an existing notice.
    pub fn from_notice(n: &Notice) -> Self {
        Self {
            id: n.id.clone(),
            titulo: n.title.clone(),
            descricao: n.description.clone(),
            regiao: n.region.clone(),
            categoria: n.category.clone(),
            tipo_apoio: editable(&n.support_type),
            tipo_edital: editable(&n.notice_type),
            data_abertura: n.opening_date.clone().unwrap_or_default(),
            data_final_submissao: n.closing_date.clone().unwrap_or_default(),
            tags: n.tags.join(", "),
            valor_total: n.total_value.clone().unwrap_or_default(),
            publico_alvo: n.target_audience.clone().unwrap_or_default(),
            instituicao: n.institution.clone().unwrap_or_default(),
            icone: n.icon.clone().unwrap_or_default(),
            anexos: n
                .attachments
                .iter()
                .map(|a| format!("{} | {}", a.name, a.url))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn action(&self) -> FormAction {
        FormAction::from_form(self)
    }

    fn tag_list(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for t in self.tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|x| x == t) {
                tags.push(t.to_string());
            }
        }
        tags
    }

    /// `nome | url` lines; a bare URL gets a numbered name.
    fn attachment_list(&self) -> Vec<Value> {
        self.anexos
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .filter_map(|(i, line)| {
                let (name, url) = match line.rsplit_once('|') {
                    Some((name, url)) => (name.trim().to_string(), url.trim()),
                    None => (String::new(), line),
                };
                if url.is_empty() {
                    return None;
                }
                let name = if name.is_empty() { format!("Anexo {}", i + 1) } else { name };
                Some(serde_json::json!({ "nome": name, "url": url }))
            })
            .collect()
    }

    /// Write body: the flat payload with blank fields left out, tags as an
    /// array, attachments as `{nome, url}` objects.
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        let fields = [
            ("titulo", &self.titulo),
            ("descricao", &self.descricao),
            ("regiao", &self.regiao),
            ("categoria", &self.categoria),
            ("tipo_apoio", &self.tipo_apoio),
            ("tipo_edital", &self.tipo_edital),
            ("data_abertura", &self.data_abertura),
            ("data_final_submissao", &self.data_final_submissao),
            ("valor_total", &self.valor_total),
            ("publico_alvo", &self.publico_alvo),
            ("instituicao", &self.instituicao),
            ("icone", &self.icone),
        ];
        for (key, value) in fields {
            let value = value.trim();
            if !value.is_empty() {
                body.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        body.insert(
            "tags".to_string(),
            Value::Array(self.tag_list().into_iter().map(Value::String).collect()),
        );
        body.insert("attachments".to_string(), Value::Array(self.attachment_list()));
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { id: String, share_link: Option<String> },
    Updated { id: String },
}

/// Send the form to the create or update endpoint, chosen by its `id`.
pub async fn submit(
    api: &dyn EditaisApi,
    token: &str,
    form: &NoticeForm,
) -> Result<SubmitOutcome, ClientError> {
    let payload = form.to_payload();
    match form.action() {
        FormAction::Create => {
            let created = api.create_notice(token, &payload).await?;
            info!(id = %created.id, "Notice created");
            Ok(SubmitOutcome::Created { id: created.id, share_link: created.share_link })
        }
        FormAction::Update(id) => {
            api.update_notice(token, &id, &payload).await?;
            info!(id = %id, "Notice updated");
            Ok(SubmitOutcome::Updated { id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editais_catalog::{normalize, RawNotice};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blank_id_creates() {
        let mut form = NoticeForm::default();
        assert_eq!(form.action(), FormAction::Create);
        form.id = "   ".into();
        assert_eq!(form.action(), FormAction::Create);
        form.id = "42".into();
        assert_eq!(form.action(), FormAction::Update("42".into()));
    }

    #[test]
    fn test_payload_drops_blank_fields() {
        let form = NoticeForm {
            titulo: " Inovação Tech ".into(),
            regiao: "".into(),
            tags: "inovação, tech, , inovação".into(),
            anexos: "Regulamento | https://x/reg.pdf\nhttps://x/anexo.pdf\n\n".into(),
            ..Default::default()
        };
        assert_eq!(
            form.to_payload(),
            json!({
                "titulo": "Inovação Tech",
                "tags": ["inovação", "tech"],
                "attachments": [
                    { "nome": "Regulamento", "url": "https://x/reg.pdf" },
                    { "nome": "Anexo 2", "url": "https://x/anexo.pdf" }
                ]
            })
        );
    }

    #[test]
    fn test_edit_prefill_survives_write() {
        let raw: RawNotice = serde_json::from_value(json!({
            "id": 9,
            "titulo": "Bolsa Rural",
            "json_data": {
                "descricao": "Apoio ao produtor",
                "regiao": "MG",
                "tags": ["agro"],
                "data_final_submissao": "2025-06-30",
                "instituicao": "FAPEMIG"
            },
            "arquivos_json": [{ "nome": "Edital", "url": "https://x/e.pdf" }]
        }))
        .unwrap();
        let original = normalize(&raw).unwrap();

        let form = NoticeForm::from_notice(&original);
        assert_eq!(form.action(), FormAction::Update("9".into()));
        assert_eq!(form.tipo_apoio, "");

        // What the backend would store and serve back.
        let written: RawNotice = serde_json::from_value(json!({
            "id": 9,
            "titulo": form.titulo.clone(),
            "json_data": form.to_payload(),
        }))
        .unwrap();
        assert_eq!(normalize(&written).unwrap(), original);
    }
}
