/*
 * Responsibility
 * - 生成するリンクの基底 URL を決める
 *   - PUBLIC_BASE_URL が設定されていればそれを使う
 *   - なければ Host / X-Forwarded-Proto から組み立てる
 * - 失敗時は AppError::bad_request へ変換
 */
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use url::Url;

use crate::{error::AppError, services::cache::CacheClient, state::AppState};

/// Absolute base URL ending in `/`, ready for `Url::join`.
#[derive(Clone, Debug)]
pub struct BaseUrl(pub Url);

impl BaseUrl {
    /// Join a relative path such as `get/<id>` onto the base.
    pub fn link(&self, path: &str) -> Result<String, AppError> {
        self.0
            .join(path)
            .map(String::from)
            .map_err(|_| AppError::Internal)
    }
}

fn from_headers(headers: &HeaderMap) -> Result<Url, AppError> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::bad_request("MISSING_HOST", "Host header is required"))?;

    // Only the first hop matters when proxies chain the header.
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|p| matches!(*p, "http" | "https"))
        .unwrap_or("http");

    let url = Url::parse(&format!("{scheme}://{host}/"))
        .map_err(|_| AppError::bad_request("INVALID_HOST", "invalid Host header"))?;

    // A Host header carrying a path or credentials is not a plain authority.
    if url.path() != "/" || !url.username().is_empty() || url.query().is_some() {
        return Err(AppError::bad_request("INVALID_HOST", "invalid Host header"));
    }

    Ok(url)
}

impl<C: CacheClient> FromRequestParts<AppState<C>> for BaseUrl {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.public_base_url {
            return Ok(Self(base.clone()));
        }

        from_headers(&parts.headers).map(Self)
    }
}
