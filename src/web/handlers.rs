/*
 * Responsibility
 * - HTML フォーム系 handler (/, /create, /pre_get/{id}, /get/{id})
 * - pre_get は存在確認のみ (消費しない)、get で消費する
 * - 無効/期限切れは 404 + メッセージページ
 */
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::extractors::BaseUrl,
    error::AppError,
    services::{
        cache::CacheClient,
        secret::{SecretError, parse_form_duration},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateSecretForm {
    pub text: String,
    // Raw so that a non-numeric value is answered like any other bad duration.
    pub duration: String,
}

fn invalid_link<C: CacheClient>(state: &AppState<C>) -> Result<Response, AppError> {
    let html = state.pages.invalid_link()?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

pub async fn index<C: CacheClient>(
    State(state): State<AppState<C>>,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.index()?))
}

pub async fn create<C: CacheClient>(
    State(state): State<AppState<C>>,
    base: BaseUrl,
    Form(form): Form<CreateSecretForm>,
) -> Result<Html<String>, AppError> {
    let hours = parse_form_duration(&form.duration)?;
    let created = state.secrets.create_from_form(&form.text, hours).await?;

    let url = base.link(&format!("pre_get/{}", created.id))?;
    Ok(Html(state.pages.share_link(&url)?))
}

pub async fn pre_get<C: CacheClient>(
    State(state): State<AppState<C>>,
    base: BaseUrl,
    Path(secret_id): Path<String>,
) -> Result<Response, AppError> {
    match state.secrets.peek(&secret_id).await {
        Ok(id) => {
            let url = base.link(&format!("get/{id}"))?;
            Ok(Html(state.pages.confirm(&url)?).into_response())
        }
        Err(SecretError::NotFoundOrExpired) => invalid_link(&state),
        Err(e) => Err(e.into()),
    }
}

pub async fn get<C: CacheClient>(
    State(state): State<AppState<C>>,
    Path(secret_id): Path<String>,
) -> Result<Response, AppError> {
    match state.secrets.consume(&secret_id).await {
        Ok(text) => Ok(Html(state.pages.text(&text)?).into_response()),
        Err(SecretError::NotFoundOrExpired) => invalid_link(&state),
        Err(e) => Err(e.into()),
    }
}
