//! roomserve — room reservation service for a university department.
//!
//! Students submit booking requests with a PDF proposal, admins approve or
//! reject them, and notifications fan out to the affected users. The binary
//! in `main.rs` wires this library to a socket; integration tests in
//! `tests/` exercise it directly.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod notify;
pub mod store;
pub mod upload;

use config::Config;
use store::postgres::PgStore;

/// Shared application state passed to handlers and extractors.
pub struct AppState {
    pub db: PgStore,
    pub config: Config,
}
