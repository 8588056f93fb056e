/*
 * Responsibility
 * - POST /api/create : JSON でシークレットを作成し、取得用 URL を返す
 * - GET /api/get/{id} : 一度だけ text を返す (2 回目以降は 404)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::{
        dto::secrets::{CreateSecretRequest, CreateSecretResponse, SecretTextResponse},
        extractors::BaseUrl,
    },
    error::AppError,
    services::cache::CacheClient,
    state::AppState,
};

pub async fn create_secret<C: CacheClient>(
    State(state): State<AppState<C>>,
    base: BaseUrl,
    Json(req): Json<CreateSecretRequest>,
) -> Result<Json<CreateSecretResponse>, AppError> {
    let created = state.secrets.create(&req.text, req.duration).await?;

    Ok(Json(CreateSecretResponse {
        url: base.link(&format!("api/get/{}", created.id))?,
        expires_at: created.expires_at,
    }))
}

pub async fn get_secret<C: CacheClient>(
    State(state): State<AppState<C>>,
    Path(secret_id): Path<String>,
) -> Result<Json<SecretTextResponse>, AppError> {
    let text = state.secrets.consume(&secret_id).await?;

    Ok(Json(SecretTextResponse { text }))
}
