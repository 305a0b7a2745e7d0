//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    admin::{admin_page, admin_submit, login_page, login_submit, logout},
    browse::{api_edital, api_editais, browse_page},
    chat::{chat_page, chat_select, chat_send},
    detail::detail_page,
    health::healthz,
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",              get(browse_page))
        .route("/editais/{id}",  get(detail_page))
        .route("/chat",          get(chat_page))
        .route("/chat/send",     post(chat_send))
        .route("/chat/select",   post(chat_select))

        // Admin
        .route("/admin",         get(admin_page))
        .route("/admin/login",   get(login_page).post(login_submit))
        .route("/admin/logout",  post(logout))
        .route("/admin/editais", post(admin_submit))

        // API endpoints
        .route("/api/editais",   get(api_editais))
        .route("/api/editais/{id}", get(api_edital))
        .route("/healthz",       get(healthz))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
