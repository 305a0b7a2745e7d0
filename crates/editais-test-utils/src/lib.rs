//! Shared fixtures and an in-memory `EditaisApi` for tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use editais_catalog::{normalize, RawNotice};
use editais_client::models::{
    ChatReply, CreateResponse, LoginResponse, MessageResponse, ProtectedResponse,
};
use editais_client::{ClientError, EditaisApi};
use editais_common::Notice;

pub const ADMIN_EMAIL: &str = "admin@editais.test";
pub const ADMIN_PASSWORD: &str = "s3nha";
pub const VALID_TOKEN: &str = "token-valido";

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// A record in the API's wire shape with the given payload.
pub fn raw_notice(id: u64, title: &str, payload: Value) -> RawNotice {
    serde_json::from_value(json!({ "id": id, "titulo": title, "json_data": payload }))
        .expect("fixture record is an object")
}

/// A normalized notice with a payload.
pub fn notice(id: u64, title: &str, payload: Value) -> Notice {
    normalize(&raw_notice(id, title, payload)).expect("fixture record normalizes")
}

/// Three notices: "Inovação Tech" (SP), "Bolsa Rural" (RJ), "Fundo Inovador" (SP).
pub fn sample_records() -> Vec<RawNotice> {
    vec![
        raw_notice(
            1,
            "Inovação Tech",
            json!({
                "descricao": "Apoio a startups de base tecnológica.",
                "regiao": "SP",
                "categoria": "Tecnologia",
                "tipo_apoio": "Subvenção",
                "tags": ["inovação", "startups", "tecnologia"],
                "data_final_submissao": "2025-03-10",
                "share_link": "https://portal.example/?id=1"
            }),
        ),
        raw_notice(
            2,
            "Bolsa Rural",
            json!({
                "descricao": "Bolsas para pesquisa agropecuária.",
                "regiao": "RJ",
                "categoria": "Agro",
                "tags": "agro, pesquisa",
                "data_final_submissao": "2025-04-01"
            }),
        ),
        raw_notice(
            3,
            "Fundo Inovador",
            json!({
                "descricao": "Fundo para projetos de impacto.",
                "regiao": "SP",
                "categoria": "Impacto",
                "data_abertura": "2025-02-01"
            }),
        ),
    ]
}

fn record_id(record: &RawNotice) -> Option<String> {
    match record.0.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── FakeApi ───────────────────────────────────────────────────────────────────

/// Every call the fake received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListNotices,
    ListNoticesAdmin { token: String },
    Login { email: String },
    VerifyToken { token: String },
    Create { token: String, payload: Value },
    Update { token: String, id: String, payload: Value },
    Chat { message: String },
    ChatAbout { id: String, message: String },
    Ping,
}

/// An in-memory backend. Writes mutate the stored records so a reload
/// sees them.
pub struct FakeApi {
    records: Mutex<Vec<RawNotice>>,
    calls: Mutex<Vec<ApiCall>>,
    next_id: AtomicU64,
    write_failure: Mutex<Option<(u16, String)>>,
    list_failure: Mutex<Option<(u16, String)>>,
    chat_reply: Mutex<ChatReply>,
    chat_failure: Mutex<Option<(u16, String)>>,
    chat_hangs: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(100),
            write_failure: Mutex::new(None),
            list_failure: Mutex::new(None),
            chat_reply: Mutex::new(ChatReply { reply: "Olá!".to_string(), options: vec![] }),
            chat_failure: Mutex::new(None),
            chat_hangs: AtomicBool::new(false),
        }
    }

    pub fn with_records(self, records: Vec<RawNotice>) -> Self {
        *self.records.lock().unwrap() = records;
        self
    }

    pub fn with_chat_reply(self, reply: ChatReply) -> Self {
        *self.chat_reply.lock().unwrap() = reply;
        self
    }

    pub fn failing_writes(self, status: u16, detail: &str) -> Self {
        *self.write_failure.lock().unwrap() = Some((status, detail.to_string()));
        self
    }

    pub fn failing_list(self, status: u16, detail: &str) -> Self {
        *self.list_failure.lock().unwrap() = Some((status, detail.to_string()));
        self
    }

    pub fn failing_chat(self, status: u16, detail: &str) -> Self {
        *self.chat_failure.lock().unwrap() = Some((status, detail.to_string()));
        self
    }

    /// Chat calls are recorded and then never answer.
    pub fn hanging_chat(self) -> Self {
        self.chat_hangs.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_records(&self, records: Vec<RawNotice>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn authorize(&self, token: &str) -> Result<(), ClientError> {
        if token == VALID_TOKEN {
            Ok(())
        } else {
            Err(ClientError::Unauthorized { status: 401, detail: "Token inválido".to_string() })
        }
    }

    async fn stall_chat(&self) {
        if self.chat_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    fn failure(slot: &Mutex<Option<(u16, String)>>) -> Result<(), ClientError> {
        match slot.lock().unwrap().clone() {
            Some((status @ (401 | 403), detail)) => Err(ClientError::Unauthorized { status, detail }),
            Some((status, detail)) => Err(ClientError::Status { status, detail }),
            None => Ok(()),
        }
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EditaisApi for FakeApi {
    async fn list_notices(&self) -> Result<Vec<RawNotice>, ClientError> {
        self.record(ApiCall::ListNotices);
        Self::failure(&self.list_failure)?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn list_notices_admin(&self, token: &str) -> Result<Vec<RawNotice>, ClientError> {
        self.record(ApiCall::ListNoticesAdmin { token: token.to_string() });
        self.authorize(token)?;
        Self::failure(&self.list_failure)?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ClientError> {
        self.record(ApiCall::Login { email: email.to_string() });
        if email == ADMIN_EMAIL && password.expose_secret() == ADMIN_PASSWORD {
            Ok(LoginResponse { access_token: VALID_TOKEN.to_string(), token_type: "bearer".to_string() })
        } else {
            Err(ClientError::Unauthorized { status: 401, detail: "Credenciais inválidas".to_string() })
        }
    }

    async fn verify_token(&self, token: &str) -> Result<ProtectedResponse, ClientError> {
        self.record(ApiCall::VerifyToken { token: token.to_string() });
        self.authorize(token)?;
        Ok(ProtectedResponse { msg: format!("Olá, {ADMIN_EMAIL}") })
    }

    async fn create_notice(&self, token: &str, payload: &Value) -> Result<CreateResponse, ClientError> {
        self.record(ApiCall::Create { token: token.to_string(), payload: payload.clone() });
        self.authorize(token)?;
        Self::failure(&self.write_failure)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let title = payload["titulo"].as_str().unwrap_or_default().to_string();
        let share_link = format!("https://portal.example/?id={id}");
        self.records.lock().unwrap().push(raw_notice(id, &title, payload.clone()));
        Ok(CreateResponse {
            msg: "Edital criado com sucesso".to_string(),
            id: id.to_string(),
            share_link: Some(share_link),
        })
    }

    async fn update_notice(&self, token: &str, id: &str, payload: &Value) -> Result<MessageResponse, ClientError> {
        self.record(ApiCall::Update {
            token: token.to_string(),
            id: id.to_string(),
            payload: payload.clone(),
        });
        self.authorize(token)?;
        Self::failure(&self.write_failure)?;

        let mut records = self.records.lock().unwrap();
        let Some(record) = records
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
        else {
            return Err(ClientError::Status { status: 404, detail: "Edital não encontrado".to_string() });
        };
        if let Some(title) = payload.get("titulo") {
            record.0.insert("titulo".to_string(), title.clone());
        }
        record.0.insert("json_data".to_string(), payload.clone());
        Ok(MessageResponse { msg: "Edital atualizado com sucesso".to_string() })
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        self.record(ApiCall::Chat { message: message.to_string() });
        self.stall_chat().await;
        Self::failure(&self.chat_failure)?;
        Ok(self.chat_reply.lock().unwrap().clone())
    }

    async fn chat_about(&self, notice_id: &str, message: &str) -> Result<ChatReply, ClientError> {
        self.record(ApiCall::ChatAbout { id: notice_id.to_string(), message: message.to_string() });
        self.stall_chat().await;
        Self::failure(&self.chat_failure)?;
        Ok(self.chat_reply.lock().unwrap().clone())
    }

    async fn ping(&self) -> Result<(), ClientError> {
        self.record(ApiCall::Ping);
        Ok(())
    }
}
