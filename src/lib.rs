//! texts: owner-scoped secret text storage behind a signed access token.
//!
//! Request pipeline: catch-panic → trace → access middleware (token → `AuthCtx`)
//! → handler → `TextService` → `TextRepository` (SQLite).

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
