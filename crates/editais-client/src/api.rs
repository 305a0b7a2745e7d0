//! `EditaisApi` trait and the reqwest implementation.
//!
//! Endpoints:
//!   GET  /editais                 public list, also used by the admin view
//!   POST /admin/login             credentials to bearer token
//!   GET  /admin/protected         token check
//!   POST /admin/editais           create
//!   PUT  /admin/editais/{id}      update
//!   POST /chat                    general chat turn
//!   POST /chat/edital/{id}        notice-scoped chat turn
//!   GET  /ping                    health

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use editais_catalog::RawNotice;
use editais_common::config::ApiConfig;
use editais_common::sandbox::SandboxClient;

use crate::error::ClientError;
use crate::models::{
    ChatReply, ChatRequest, CreateResponse, LoginRequest, LoginResponse, MessageResponse,
    ProtectedResponse,
};

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait EditaisApi: Send + Sync {
    async fn list_notices(&self) -> Result<Vec<RawNotice>, ClientError>;
    async fn list_notices_admin(&self, token: &str) -> Result<Vec<RawNotice>, ClientError>;
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ClientError>;
    async fn verify_token(&self, token: &str) -> Result<ProtectedResponse, ClientError>;
    async fn create_notice(&self, token: &str, payload: &Value) -> Result<CreateResponse, ClientError>;
    async fn update_notice(&self, token: &str, id: &str, payload: &Value) -> Result<MessageResponse, ClientError>;
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError>;
    async fn chat_about(&self, notice_id: &str, message: &str) -> Result<ChatReply, ClientError>;
    async fn ping(&self) -> Result<(), ClientError>;
}

// ── Helper: status + body decoding ────────────────────────────────────────────

/// FastAPI puts the reason in `detail`, either a string or a list of
/// validation errors.
fn error_detail(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match &json["detail"] {
            Value::String(s) => s.clone(),
            Value::Null => fallback.to_string(),
            other => other.to_string(),
        },
        Err(_) if !body.trim().is_empty() => body.trim().chars().take(200).collect(),
        Err(_) => fallback.to_string(),
    }
}

async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        let detail = error_detail(&body, status.canonical_reason().unwrap_or("erro desconhecido"));
        let code = status.as_u16();
        return Err(if code == 401 || code == 403 {
            ClientError::Unauthorized { status: code, detail }
        } else {
            ClientError::Status { status: code, detail }
        });
    }
    Ok(serde_json::from_str(&body)?)
}

// ── reqwest implementation ────────────────────────────────────────────────────

pub struct HttpEditaisApi {
    client: SandboxClient,
}

impl HttpEditaisApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        Ok(Self { client: SandboxClient::new(config)? })
    }

    /// `{base}/{path}/{id}` with `id` percent-encoded as one segment.
    fn with_segment(&self, path: &str, id: &str) -> Result<String, ClientError> {
        let mut url = Url::parse(&self.client.endpoint(path))
            .map_err(|e| ClientError::Sandbox(format!("invalid URL for {path}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Sandbox(format!("cannot extend URL for {path}")))?
            .push(id);
        Ok(url.into())
    }
}

#[async_trait]
impl EditaisApi for HttpEditaisApi {
    #[instrument(skip(self))]
    async fn list_notices(&self) -> Result<Vec<RawNotice>, ClientError> {
        let resp = self.client.get(&self.client.endpoint("/editais"))?.send().await?;
        let notices: Vec<RawNotice> = decode_response(resp).await?;
        debug!(count = notices.len(), "Fetched notices");
        Ok(notices)
    }

    #[instrument(skip_all)]
    async fn list_notices_admin(&self, token: &str) -> Result<Vec<RawNotice>, ClientError> {
        let resp = self
            .client
            .get(&self.client.endpoint("/editais"))?
            .bearer_auth(token)
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest { email, senha: password.expose_secret() };
        let resp = self
            .client
            .post(&self.client.endpoint("/admin/login"))?
            .json(&body)
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip_all)]
    async fn verify_token(&self, token: &str) -> Result<ProtectedResponse, ClientError> {
        let resp = self
            .client
            .get(&self.client.endpoint("/admin/protected"))?
            .bearer_auth(token)
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip_all)]
    async fn create_notice(&self, token: &str, payload: &Value) -> Result<CreateResponse, ClientError> {
        let resp = self
            .client
            .post(&self.client.endpoint("/admin/editais"))?
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip(self, token, payload))]
    async fn update_notice(&self, token: &str, id: &str, payload: &Value) -> Result<MessageResponse, ClientError> {
        let url = self.with_segment("/admin/editais", id)?;
        let resp = self
            .client
            .put(&url)?
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip(self, message))]
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let resp = self
            .client
            .post(&self.client.endpoint("/chat"))?
            .json(&ChatRequest { message })
            .send()
            .await?;
        decode_response(resp).await
    }

    #[instrument(skip(self, message))]
    async fn chat_about(&self, notice_id: &str, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.with_segment("/chat/edital", notice_id)?;
        let resp = self
            .client
            .post(&url)?
            .json(&ChatRequest { message })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn ping(&self) -> Result<(), ClientError> {
        let resp = self.client.get(&self.client.endpoint("/ping"))?.send().await?;
        let _: Value = decode_response(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpEditaisApi {
        HttpEditaisApi::new(&ApiConfig {
            base_url: "https://api.editais.example".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_segment_is_encoded() {
        let api = api();
        assert_eq!(
            api.with_segment("/admin/editais", "42").unwrap(),
            "https://api.editais.example/admin/editais/42"
        );
        assert_eq!(
            api.with_segment("/chat/edital", "a/b").unwrap(),
            "https://api.editais.example/chat/edital/a%2Fb"
        );
    }

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(error_detail(r#"{"detail":"Credenciais inválidas"}"#, "x"), "Credenciais inválidas");
        assert_eq!(error_detail(r#"{"other":1}"#, "Unauthorized"), "Unauthorized");
        assert_eq!(error_detail("", "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail("upstream down", "x"), "upstream down");
        assert!(error_detail(r#"{"detail":[{"loc":["body"]}]}"#, "x").contains("loc"));
    }

    #[test]
    fn test_foreign_host_never_leaves_process() {
        let api = api();
        let err = api.client.get("https://elsewhere.example/editais").unwrap_err();
        assert!(matches!(ClientError::from(err), ClientError::Sandbox(_)));
    }
}
