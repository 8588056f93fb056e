/*
 * Responsibility
 * - GET /health (疎通用)
 * - 選択中の backend 名も返す (store 自体には問い合わせない)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{services::cache::CacheClient, state::AppState};

pub async fn health<C: CacheClient>(State(state): State<AppState<C>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "backend": state.secrets.backend_name()})),
    )
}
