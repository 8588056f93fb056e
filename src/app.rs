/*
 * Responsibility
 * - Config読み込み → store 生成 → 依存注入 → Router 組み立て
 * - Middleware の適用 (request-id, trace, security headers など)
 * - axum::serve() で起動、シグナルで graceful shutdown
 */
use anyhow::{Context, Result};
use axum::Router;
use std::{panic, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    services::{
        cache::{CacheClient, build_cache},
        secret::SecretService,
    },
    state::AppState,
    web::{self, pages::Pages},
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,onetime_text=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panic via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {} (backend: {:?})",
        config.app_env,
        config.addr,
        config.cache.backend
    );

    // The store lives exactly as long as the server: built here, dropped after shutdown.
    let built = build_cache(&config.cache)
        .await
        .context("failed to initialize cache backend")?;

    let secrets = SecretService::new(
        built.cache,
        config.cache.key_prefix.clone(),
        config.max_secret_hours,
    );
    let pages = Pages::new().context("failed to compile page templates")?;
    let state = AppState::new(secrets, pages, config.public_base_url.clone());

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = built.sweeper {
        sweeper.abort();
    }
    tracing::info!("server stopped");
    Ok(())
}

pub fn build_router<C: CacheClient>(state: AppState<C>, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::routes())
        .merge(web::routes())
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
