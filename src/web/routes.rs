/*
 * Responsibility
 * - HTML ページの URL 構造を定義
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::services::cache::CacheClient;
use crate::state::AppState;

use crate::web::handlers;

pub fn routes<C: CacheClient>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(handlers::index::<C>))
        .route("/create", post(handlers::create::<C>))
        .route("/pre_get/{secret_id}", get(handlers::pre_get::<C>))
        .route("/get/{secret_id}", get(handlers::get::<C>))
}
