/*
 * Responsibility
 * - Config読み込み → tracing 初期化 → 依存生成 → Router 組み立て
 * - Middleware の適用 (panic recovery / trace / timeout / access token)
 * - axum::serve() で起動、SIGINT/SIGTERM で graceful shutdown
 * - 起動時の失敗は全て Result で main に返す (終了を決めるのは main だけ)
 */
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::{AppEnv, Config};
use crate::db;
use crate::middleware;
use crate::repos::SqliteTextRepository;
use crate::services::{TextService, auth::build_token_verifier};
use crate::state::AppState;

fn init_tracing(app_env: AppEnv) -> Result<()> {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,texts=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);

    // production はログ収集基盤向けに JSON
    if app_env.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}

fn init_panic_hook() {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        // Request panics are then turned into 500s by the catch-panic layer;
        // the process keeps serving.
        tracing::error!(%info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(config.app_env).context("failed to initialise tracing")?;
    init_panic_hook();

    tracing::info!(
        "starting texts service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gracefully stopped");
    Ok(())
}

/// Build process-level services and inject them into the shared application state.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let pool = db::create_pool(&config.database_url, config.database_pool)
        .await
        .context("failed to open database")?;

    if config.database_auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to apply database migrations")?;
        tracing::info!("database migrations applied");
    }

    let texts = TextService::new(Arc::new(SqliteTextRepository::new(pool)));
    let verifier = build_token_verifier(config).context("invalid AUTH_SECRET")?;

    Ok(AppState::new(texts, verifier))
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router, request_timeout)
}

async fn shutdown_signal() {
    let ctrl_c = until_signal("SIGINT", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}

// A handler that cannot be installed must never count as a received signal.
async fn until_signal<F>(name: &'static str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!(signal = name, error = %e, "failed to install signal handler");
        std::future::pending::<()>().await;
    }
}
