//! Curbside Storefront - Order-taking HTTP API.
//!
//! This binary serves the JSON API on port 5000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Stateless bearer tokens (HS256 JWT), no server-side sessions
//! - `PostgreSQL` for users, products and orders, or an in-memory store
//!   with `STOREFRONT_STORE=memory`
//!
//! Migrations are NOT run on startup. Run them explicitly via
//! `cargo run -p curbside-cli -- migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curbside_storefront::app::build_router;
use curbside_storefront::config::{StoreKind, StorefrontConfig};
use curbside_storefront::db::{self, MemoryStore, PgStore};
use curbside_storefront::state::AppState;

/// Reasons the server can fail to start or keep running.
#[derive(Debug, Error)]
enum StartupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("STOREFRONT_DATABASE_URL is required for the postgres store")]
    MissingDatabaseUrl,

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: JSON lines or human-readable text.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "curbside_storefront=info,tower_http=debug".into());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.json_logs);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<(), StartupError> {
    let state = match config.store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or(StartupError::MissingDatabaseUrl)?;
            let pool = db::create_pool(url).await?;
            tracing::info!("Database pool created");
            AppState::new(config.clone(), Arc::new(PgStore::new(pool)))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; nothing will be persisted");
            AppState::new(config.clone(), Arc::new(MemoryStore::new()))
        }
    };

    let app = build_router(state);

    let addr = config.socket_addr();
    tracing::info!(
        environment = ?config.environment,
        status_policy = %config.status_policy,
        "storefront listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
