//! Agenda appointment scheduling server
//!
//! REST JSON API for booking staff time slots, with race-safe slot
//! reservation, a role-aware appointment lifecycle and daily background
//! scans for reminders and subscription expiry.

use std::sync::Arc;

use sqlx::PgPool;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Used by the readiness probe; absent when running on in-memory stores
    pub pool: Option<PgPool>,
}
