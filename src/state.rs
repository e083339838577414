//! Shared application state.
//!
//! Cloned into each worker and handed to handlers through `web::Data`. The
//! stores are trait objects so the app can be assembled against Postgres in
//! production and the in-memory store in tests. Everything here is read-only
//! after startup; per-request identity travels through request extensions,
//! never through shared state.

use crate::auth::TokenService;
use crate::store::{TodoStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub tokens: TokenService,
}
