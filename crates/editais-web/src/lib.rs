//! editais-web — server-rendered front end for the editais catalog.
//!   - Browse page with free-text, faceted and date filters
//!   - Detail view with deep links (`/?id=`)
//!   - Admin panel (login, create, update)
//!   - Chat widget
//!   - JSON view of the filtered catalog and a health probe

pub mod router;
pub mod handlers;
pub mod render;
pub mod state;
pub mod sessions;
pub mod error;
