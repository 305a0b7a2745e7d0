//! Admin panel: login, notice list, create/update form.
//!
//! The bearer token lives in the `editais_admin_token` cookie. Any 401/403
//! from the API removes it and sends the browser back to the login form.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, warn};

use editais_catalog::NormalizeReport;
use editais_client::admin::{self, AuthDecision, NoticeForm, SubmitOutcome};
use editais_common::Notice;

use crate::render::admin::{render_admin, render_login};
use crate::render::layout::{alert, page, NavItem};
use crate::render::{query_string, render_cards, CardMode};
use crate::state::{AppState, SharedState};

pub const TOKEN_COOKIE: &str = "editais_admin_token";
const LOGIN_PATH: &str = "/admin/login";
const DEFAULT_GREETING: &str = "Painel administrativo";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub edit: Option<String>,
    pub new: Option<String>,
    pub saved: Option<String>,
}

fn token_from(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

fn to_login(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

fn login_html(state: &AppState, email: &str, banner: &str) -> Html<String> {
    let body = format!("{banner}{}", render_login(email));
    Html(page(&state.config.ui.site_title, "Entrar", NavItem::Admin, &body))
}

fn panel_html(
    state: &AppState,
    greeting: &str,
    notices: &[Notice],
    form: Option<&NoticeForm>,
    banners: &str,
) -> Html<String> {
    let refs: Vec<&Notice> = notices.iter().collect();
    let cards = render_cards(&refs, CardMode::Admin, state.config.ui.description_preview_chars);
    let body = format!("{banners}{}", render_admin(greeting, &cards, form));
    Html(page(&state.config.ui.site_title, "Administração", NavItem::Admin, &body))
}

// ── Login ─────────────────────────────────────────────────────────────────────

pub async fn login_page(State(state): State<SharedState>) -> Html<String> {
    login_html(&state, "", "")
}

pub async fn login_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.senha);
    match admin::login(state.api.as_ref(), &form.email, &password).await {
        Ok(token) => {
            let cookie = Cookie::build((TOKEN_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.config.server.secure_cookies);
            (jar.add(cookie), Redirect::to("/admin")).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Admin login failed");
            let banner = alert("error", &e.user_message());
            (StatusCode::UNAUTHORIZED, login_html(&state, &form.email, &banner)).into_response()
        }
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    to_login(jar)
}

// ── Panel ─────────────────────────────────────────────────────────────────────

/// Admin list, or an error banner with an empty list if the fetch failed.
/// `None` means the token was rejected.
async fn load_list(state: &AppState, token: &str, banners: &mut String) -> Option<NormalizeReport> {
    match admin::list_for_admin(state.api.as_ref(), token).await {
        Ok(report) => Some(report),
        Err(e) if e.is_auth_failure() => None,
        Err(e) => {
            error!(error = %e, "Failed to load admin list");
            banners.push_str(&alert("error", &e.user_message()));
            Some(NormalizeReport::default())
        }
    }
}

pub async fn admin_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<AdminQuery>,
) -> Response {
    let token = token_from(&jar);
    let greeting = match admin::verify_session(state.api.as_ref(), token.as_deref()).await {
        AuthDecision::Granted { greeting } if !greeting.is_empty() => greeting,
        AuthDecision::Granted { .. } => DEFAULT_GREETING.to_string(),
        AuthDecision::Denied { .. } => return to_login(jar),
    };
    let Some(token) = token else {
        return to_login(jar);
    };

    let mut banners = String::new();
    if let Some(id) = query.saved.as_deref() {
        banners.push_str(&alert("success", &format!("Edital #{id} salvo com sucesso.")));
    }

    let Some(report) = load_list(&state, &token, &mut banners).await else {
        return to_login(jar);
    };

    let form = if let Some(id) = query.edit.as_deref() {
        match report.notices.iter().find(|n| n.id == id) {
            Some(notice) => Some(NoticeForm::from_notice(notice)),
            None => {
                banners.push_str(&alert("error", "Edital não encontrado."));
                None
            }
        }
    } else if query.new.is_some() {
        Some(NoticeForm::default())
    } else {
        None
    };

    panel_html(&state, &greeting, &report.notices, form.as_ref(), &banners).into_response()
}

pub async fn admin_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<NoticeForm>,
) -> Response {
    let Some(token) = token_from(&jar) else {
        return to_login(jar);
    };

    match admin::submit(state.api.as_ref(), &token, &form).await {
        Ok(outcome) => {
            let id = match outcome {
                SubmitOutcome::Created { id, .. } | SubmitOutcome::Updated { id } => id,
            };
            if let Err(e) = state.refresh_catalog().await {
                warn!(error = %e, "Catalog reload after admin write failed");
            }
            let location = format!("/admin?{}", query_string([("saved", id.as_str())]));
            Redirect::to(&location).into_response()
        }
        Err(e) if e.is_auth_failure() => to_login(jar),
        Err(e) => {
            error!(error = %e, "Admin write failed");
            let mut banners = alert("error", &e.user_message());
            let Some(report) = load_list(&state, &token, &mut banners).await else {
                return to_login(jar);
            };
            let html = panel_html(&state, DEFAULT_GREETING, &report.notices, Some(&form), &banners);
            (StatusCode::UNPROCESSABLE_ENTITY, html).into_response()
        }
    }
}
