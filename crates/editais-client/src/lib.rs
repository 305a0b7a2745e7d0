//! editais-client — Typed access to the remote editais API.
//!
//!   - `api`:   `EditaisApi` trait and its reqwest implementation
//!   - `admin`: token verification, login and the shared create/update form
//!   - `chat`:  the chat widget state machine (`Idle` ⇄ `Scoped`)

pub mod error;
pub mod models;
pub mod api;
pub mod admin;
pub mod chat;

pub use api::{EditaisApi, HttpEditaisApi};
pub use error::ClientError;
