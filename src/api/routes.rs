/*
 * Responsibility
 * - JSON API の URL 構造を定義
 * - /health, /api/create, /api/get/{id}
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::services::cache::CacheClient;
use crate::state::AppState;

use crate::api::handlers::{
    health::health,
    secrets::{create_secret, get_secret},
};

pub fn routes<C: CacheClient>() -> Router<AppState<C>> {
    Router::new()
        .route("/health", get(health::<C>))
        .route("/api/create", post(create_secret::<C>))
        .route("/api/get/{secret_id}", get(get_secret::<C>))
}
