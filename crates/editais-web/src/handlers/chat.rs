//! Chat widget: one `ChatWidget` per browser, keyed by a session cookie.
//!
//! The widget lock is released while the API call is in flight, so a second
//! send from the same browser sees the widget busy and is rejected. A
//! session is only stored once the browser scopes, sends or selects.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

use editais_client::chat::{self, ChatContext, ChatWidget, PendingTurn, SendOutcome, SendRejected};
use editais_client::ClientError;

use crate::render::chat::render_chat;
use crate::render::layout::{alert, page, NavItem};
use crate::state::{AppState, SharedState};

pub const SESSION_COOKIE: &str = "editais_chat_session";
const CHAT_PATH: &str = "/chat";

#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    pub edital: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub option_id: String,
}

/// The browser's session id, issuing a new cookie when absent or invalid.
fn session(jar: CookieJar, secure: bool) -> (CookieJar, Uuid) {
    if let Some(id) = jar.get(SESSION_COOKIE).and_then(|c| Uuid::parse_str(c.value()).ok()) {
        return (jar, id);
    }
    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    (jar.add(cookie), id)
}

fn chat_html(state: &AppState, widget: &ChatWidget, banner: &str) -> Html<String> {
    let body = format!("{banner}{}", render_chat(widget));
    Html(page(&state.config.ui.site_title, "Assistente", NavItem::Chat, &body))
}

pub async fn chat_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<ChatQuery>,
) -> Response {
    let (jar, session) = session(jar, state.config.server.secure_cookies);

    let scope = match query.edital.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
        Some(id) => {
            if let Err(e) = state.ensure_catalog().await {
                warn!(error = %e, "Catalog unavailable while opening chat");
            }
            let title = state
                .catalog
                .read()
                .await
                .find(&id)
                .map(|n| n.title.clone())
                .unwrap_or_else(|| format!("Edital #{id}"));
            Some((id, title))
        }
        None => None,
    };

    let mut chats = state.chats.lock().await;
    let html = match scope {
        Some((id, title)) => {
            let widget = chats.get_or_insert(session);
            let already = matches!(widget.context(), ChatContext::Scoped { notice_id, .. } if *notice_id == id);
            if !already {
                widget.enter_scope(&id, &title);
            }
            chat_html(&state, widget, "")
        }
        None => match chats.get_mut(&session) {
            Some(widget) => chat_html(&state, widget, ""),
            None => chat_html(&state, &ChatWidget::new(), ""),
        },
    };

    (jar, html).into_response()
}

/// Perform a turn and install its result. Runs as its own task so the
/// widget leaves the busy state even when the request is dropped.
async fn run_turn(state: SharedState, session: Uuid, turn: PendingTurn) {
    let secs = state.config.api.timeout_secs;
    let result = match tokio::time::timeout(
        Duration::from_secs(secs),
        chat::dispatch(state.api.as_ref(), &turn),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(%session, secs, "Chat request timed out");
            Err(ClientError::Timeout { secs })
        }
    };

    let mut chats = state.chats.lock().await;
    match chats.get_mut(&session) {
        Some(widget) => {
            widget.complete(turn.ticket, result);
        }
        None => debug!(%session, "Chat session expired before the reply arrived"),
    }
}

pub async fn chat_send(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<SendForm>,
) -> Response {
    let (jar, session) = session(jar, state.config.server.secure_cookies);
    if form.message.trim().is_empty() {
        return (jar, Redirect::to(CHAT_PATH)).into_response();
    }

    let outcome = state.chats.lock().await.get_or_insert(session).begin_send(&form.message);

    match outcome {
        Ok(SendOutcome::Dispatch(turn)) => {
            let task = tokio::spawn(run_turn(state.clone(), session, turn));
            if let Err(e) = task.await {
                error!(error = %e, %session, "Chat turn task failed");
            }
            (jar, Redirect::to(CHAT_PATH)).into_response()
        }
        Ok(SendOutcome::ExitedScope) | Ok(SendOutcome::Ignored) => {
            (jar, Redirect::to(CHAT_PATH)).into_response()
        }
        Err(SendRejected::Busy) => {
            debug!(%session, "Chat send rejected while busy");
            let mut chats = state.chats.lock().await;
            let banner = alert("info", "Aguarde a resposta da mensagem anterior.");
            let html = match chats.get_mut(&session) {
                Some(widget) => chat_html(&state, widget, &banner),
                None => chat_html(&state, &ChatWidget::new(), &banner),
            };
            (StatusCode::CONFLICT, jar, html).into_response()
        }
    }
}

pub async fn chat_select(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<SelectForm>,
) -> Response {
    let (jar, session) = session(jar, state.config.server.secure_cookies);

    let picked = state
        .chats
        .lock()
        .await
        .get_mut(&session)
        .map(|w| w.select_option(&form.option_id))
        .unwrap_or(false);
    if !picked {
        debug!(option = %form.option_id, "Ignoring unknown chat option");
    }

    (jar, Redirect::to(CHAT_PATH)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use editais_common::EditaisConfig;
    use editais_test_utils::{sample_records, FakeApi};

    fn state() -> SharedState {
        let api = Arc::new(FakeApi::new().with_records(sample_records()));
        Arc::new(AppState::new(EditaisConfig::default(), api))
    }

    #[tokio::test]
    async fn test_plain_visits_do_not_store_sessions() {
        let state = state();
        for _ in 0..50 {
            let response = chat_page(State(state.clone()), CookieJar::new(), Query(ChatQuery::default())).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert!(state.chats.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_send_does_not_store_session() {
        let state = state();
        let form = SendForm { message: "   ".into() };
        let response = chat_send(State(state.clone()), CookieJar::new(), Form(form)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(state.chats.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_scoped_visit_and_send_store_one_session() {
        let state = state();
        let id = Uuid::new_v4();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, id.to_string()));

        let query = ChatQuery { edital: Some("1".into()) };
        chat_page(State(state.clone()), jar.clone(), Query(query)).await;
        let form = SendForm { message: "qual o prazo?".into() };
        chat_send(State(state.clone()), jar, Form(form)).await;

        let mut chats = state.chats.lock().await;
        assert_eq!(chats.len(), 1);
        let widget = chats.get_mut(&id).unwrap();
        assert!(!widget.is_busy());
        assert_eq!(widget.entries().last().map(|e| e.text.as_str()), Some("Olá!"));
    }
}
