// ABOUTME: HTTP server assembly and lifecycle for the calorie API
// ABOUTME: Builds the axum router with shared layers and serves it with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Server
//!
//! Layer order for every request, outermost first: CORS, tracing, request id,
//! body size limit, global rate limit, then the per-route layers.

use crate::config::ServerConfig;
use crate::constants::defaults::MAINTENANCE_INTERVAL_SECS;
use crate::constants::limits::MAX_BODY_BYTES;
use crate::constants::messages::ROUTE_NOT_FOUND;
use crate::errors::AppError;
use crate::middleware::{global_rate_limit, request_id, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{AuthRoutes, CaloriesRoutes, HealthRoutes};
use anyhow::{Context, Result};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

/// JSON 404 for unknown routes
async fn handle_not_found() -> AppError {
    AppError::not_found(ROUTE_NOT_FOUND)
}

/// Assemble the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(CaloriesRoutes::routes(resources.clone()))
        .fallback(handle_not_found)
        .layer(middleware::from_fn_with_state(
            resources,
            global_rate_limit,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_id))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
}

/// Periodically drop expired rate limit windows and cache entries
fn spawn_maintenance(resources: Arc<ServerResources>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(MAINTENANCE_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            resources.purge_expired().await;
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
}

/// Bind and serve until Ctrl+C or SIGTERM
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.http_port);
    let resources = Arc::new(ServerResources::new(config));
    serve_with_resources(&addr, resources).await
}

/// Serve prebuilt resources on `addr`
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve_with_resources(addr: &str, resources: Arc<ServerResources>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Calorie API listening on {}", listener.local_addr()?);

    let maintenance = spawn_maintenance(resources.clone());
    let app = build_router(resources);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    maintenance.abort();
    served.context("HTTP server failed")?;
    info!("Calorie API stopped");
    Ok(())
}
