//! HTTP handlers for all web routes.

pub mod browse;
pub mod detail;
pub mod admin;
pub mod chat;
pub mod health;
