use thiserror::Error;

use editais_common::error::EditaisError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error [{status}]: {detail}")]
    Status { status: u16, detail: String },

    #[error("not authorized [{status}]: {detail}")]
    Unauthorized { status: u16, detail: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request refused: {0}")]
    Sandbox(String),

    #[error("no response within {secs}s")]
    Timeout { secs: u64 },
}

impl From<EditaisError> for ClientError {
    fn from(e: EditaisError) -> Self {
        match e {
            EditaisError::Http(e) => ClientError::Transport(e),
            EditaisError::Serialization(e) => ClientError::Decode(e),
            other => ClientError::Sandbox(other.to_string()),
        }
    }
}

impl ClientError {
    /// 401/403 from a protected endpoint: the token must be discarded.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Text shown to the user in alerts and inline messages.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Não foi possível contatar o servidor. Verifique sua conexão e tente novamente.".to_string()
            }
            ClientError::Status { status, detail } => format!("Erro {status}: {detail}"),
            ClientError::Unauthorized { detail, .. } => format!("Acesso negado: {detail}"),
            ClientError::Decode(_) => "O servidor respondeu em um formato inesperado.".to_string(),
            ClientError::Sandbox(_) => "Requisição bloqueada pela configuração do cliente.".to_string(),
            ClientError::Timeout { .. } => "O servidor demorou demais para responder.".to_string(),
        }
    }
}
