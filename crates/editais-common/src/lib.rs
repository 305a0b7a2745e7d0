//! editais-common — Shared types, errors, and configuration used across all editais crates.

pub mod error;
pub mod entities;
pub mod config;
pub mod sandbox;
pub mod sequence;

// Re-export commonly used types
pub use config::EditaisConfig;
pub use entities::{Attachment, Notice};
pub use sequence::{RequestSequence, Ticket};
