//! claro User Directory API
//!
//! Keeps the internal user directory consistent with the external identity
//! provider: signed lifecycle webhooks on one path, session-driven fallback
//! sync on the other, both converging on one Postgres-backed user store.

mod config;
mod health;
mod logging;
mod openapi;
mod state;

use axum::{routing::get, Router};
use claro_api_identity::{
    session_auth_middleware, session_router, webhook_router, IdentityState, SessionPublicKey,
};
use config::Config;
use health::{health_handler, livez_handler, readyz_handler};
use openapi::openapi_routes;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values).
    // A missing WEBHOOK_SIGNING_SECRET aborts here: the service must never
    // process unsigned provider events.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting claro API"
    );

    // Validate security configuration
    match config.validate_security_config() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::warn!(target: "security", "{}", warning);
            }
            if !warnings.is_empty() {
                tracing::warn!(
                    target: "security",
                    count = warnings.len(),
                    "Insecure settings detected (allowed in {} mode)",
                    config.app_env
                );
            }
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "security", "{}", error);
            }
            eprintln!(
                "FATAL: {} insecure setting(s) detected in production mode.",
                errors.len()
            );
            std::process::exit(1);
        }
    }

    // Create database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    // Apply migrations before serving any traffic
    if let Err(e) = claro_db::run_migrations(&pool).await {
        eprintln!("FATAL: Database migration failed: {e}");
        std::process::exit(1);
    }

    // Identity state; refuses construction with an empty signing secret
    let identity_state = match IdentityState::new(pool.clone(), &config.webhook_signing_secret) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("FATAL: Failed to create identity state: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(pool.clone());
    let shutting_down = app_state.shutting_down.clone();

    let cors = build_cors_layer(&config.cors_origins);

    // Webhook ingestion: public, authenticated by the HMAC signature itself
    let webhook_routes = webhook_router(identity_state.clone());

    // Session sync: requires a provider-issued session JWT
    let session_routes = session_router(identity_state)
        .layer(axum::middleware::from_fn(session_auth_middleware))
        .layer(axum::Extension(SessionPublicKey(
            config.session_jwt_public_key.clone(),
        )));

    let app = Router::new()
        // Health check endpoint (no auth required)
        .route("/health", get(health_handler))
        .route("/livez", get(livez_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(app_state)
        .merge(openapi_routes())
        .merge(webhook_routes)
        .merge(session_routes)
        .layer(tower_http::limit::RequestBodyLimitLayer::new(
            config.max_body_size,
        ))
        .layer(cors);

    // Bind and serve
    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutting_down))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Build CORS layer from configured origins.
///
/// When explicit origins are configured (non-wildcard), enables
/// `allow_credentials(true)` for cookie/auth header support.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.len() == 1 && origins[0] == "*";

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(3600));

    // When credentials are enabled, we cannot use `Any` for headers or
    // methods per CORS spec; explicitly list the ones the frontend needs.
    if is_wildcard {
        layer = layer
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    } else {
        use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
        use axum::http::Method;
        use tower_http::cors::AllowOrigin;
        let allowed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer = layer
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN])
            .allow_credentials(true);
    }

    layer
}

/// Graceful shutdown signal handler.
///
/// Sets the `shutting_down` flag before returning so the readiness probe
/// returns 503 to drain traffic before Axum stops accepting connections.
async fn shutdown_signal(shutting_down: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                // Fall through - we still want to wait for terminate signal
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                // Wait forever if we can't install the handler
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    // Flip the flag BEFORE Axum starts draining connections so the
    // readiness probe tells the orchestrator to stop routing traffic.
    shutting_down.store(true, std::sync::atomic::Ordering::Release);
    info!("Readiness probe set to unhealthy, draining traffic");
}
