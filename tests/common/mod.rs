//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;

use onetime_text::{
    app::build_router,
    config::Config,
    services::{
        cache::{Cache, CacheClient, CacheError, CacheResult, MemoryCache},
        secret::SecretService,
    },
    state::AppState,
    web::pages::Pages,
};

pub const HOST: &str = "localhost:3000";

pub fn test_config() -> Config {
    Config::from_vars(|_| None).expect("default config")
}

/// Router over a fresh in-memory store.
pub fn test_app() -> Router {
    test_app_with_base(None)
}

pub fn test_app_with_base(public_base_url: Option<Url>) -> Router {
    test_app_with_cache(Cache::from(MemoryCache::new()), public_base_url)
}

pub fn test_app_with_cache<C: CacheClient>(cache: C, public_base_url: Option<Url>) -> Router {
    let config = test_config();
    let secrets = SecretService::new(cache, "test", config.max_secret_hours);
    let state = AppState::new(secrets, Pages::new().expect("templates"), public_base_url);
    build_router(state, &config)
}

/// A store whose backend never answers.
#[derive(Clone, Debug)]
pub struct DownCache;

#[async_trait]
impl CacheClient for DownCache {
    fn backend_name(&self) -> &'static str {
        "down"
    }

    async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> CacheResult<()> {
        Err(CacheError::unavailable("down", "connection refused"))
    }

    async fn get_string(&self, _: &str) -> CacheResult<Option<String>> {
        Err(CacheError::unavailable("down", "connection refused"))
    }

    async fn take_string(&self, _: &str) -> CacheResult<Option<String>> {
        Err(CacheError::unavailable("down", "connection refused"))
    }

    async fn del(&self, _: &str) -> CacheResult<bool> {
        Err(CacheError::unavailable("down", "connection refused"))
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("infallible router")
}

pub fn get(path: &str) -> Request<Body> {
    Request::get(path)
        .header(header::HOST, HOST)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, json: serde_json::Value) -> Request<Body> {
    Request::post(path)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub fn post_form(path: &str, form: &str) -> Request<Body> {
    Request::post(path)
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(res).await).unwrap()
}

/// Pull the path that follows `marker` (e.g. `pre_get/`) out of a rendered page.
///
/// Attribute values may have `/` escaped, so it is normalized first.
pub fn link_id(html: &str, marker: &str) -> String {
    let html = html.replace("&#x2f;", "/");
    let start = html.find(marker).expect("link in page") + marker.len();
    html[start..start + 36].to_string()
}
