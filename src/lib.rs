//! Carlot
//!
//! A small dealership web service: vehicle inventory browsing by
//! classification, JWT-backed account identity, per-account favorites,
//! and a contact desk with a staff-only admin surface.

pub mod config;
pub mod crypto;
pub mod error;
pub mod flash;
pub mod guards;
pub mod identity;
pub mod routes;
pub mod state;
pub mod store;
pub mod token;

pub use config::Config;
pub use error::AppError;
pub use identity::{CurrentUser, Identity};
pub use state::AppState;
pub use store::{MemoryStore, SqliteStore, Store};
pub use token::TokenCodec;
