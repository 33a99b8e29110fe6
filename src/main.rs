use std::sync::Arc;

use axum::{Extension, Router};
use http::{header, HeaderValue, Method};
use tokio::sync::mpsc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use assettrack_api::auth::{AuthConfig, AuthService};
use assettrack_api::config::{init_tracing, load_config, AppConfig};
use assettrack_api::db;
use assettrack_api::events::{process_events, EventSender};
use assettrack_api::handlers::AppServices;
use assettrack_api::openapi;
use assettrack_api::{api_v1_routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        "Starting AssetTrack API v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_pool = Arc::new(db::establish_connection_from_app_config(&config).await?);

    if config.auto_migrate {
        db::run_migrations(&db_pool).await?;
    } else {
        info!("Auto-migration disabled; assuming schema is up to date");
    }

    let (tx, rx) = mpsc::channel(config.event_channel_capacity);
    let event_sender = EventSender::new(tx);

    let auth_service = Arc::new(AuthService::new(
        AuthConfig::from_app_config(&config),
        db_pool.clone(),
    ));

    let services = AppServices::new(
        db_pool.clone(),
        Some(Arc::new(event_sender.clone())),
        auth_service.clone(),
    );

    tokio::spawn(process_events(
        rx,
        services.audit.clone(),
        services.notifications.clone(),
    ));

    let state = AppState {
        db: db_pool,
        config: config.clone(),
        event_sender,
        services,
    };

    let cors = build_cors_layer(&config)?;

    let app = Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_router())
        .layer(Extension(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Builds the CORS layer from configuration. Production deployments must list
/// their allowed origins explicitly; the permissive fallback is reserved for
/// development or an explicit opt-in.
fn build_cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    if let Some(raw) = config
        .cors_allowed_origins
        .as_ref()
        .filter(|raw| !raw.trim().is_empty())
    {
        let mut origins = Vec::new();
        for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            match origin.parse::<HeaderValue>() {
                Ok(value) => origins.push(value),
                Err(e) => {
                    error!("Invalid CORS origin '{}': {}", origin, e);
                    anyhow::bail!("invalid CORS origin: {origin}");
                }
            }
        }

        let mut layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        if config.cors_allow_credentials {
            layer = layer.allow_credentials(true);
        }
        return Ok(layer);
    }

    if config.should_allow_permissive_cors() {
        warn!("CORS is permissive; do not use this mode outside development");
        return Ok(CorsLayer::permissive());
    }

    anyhow::bail!(
        "no CORS origins configured; set APP__CORS_ALLOWED_ORIGINS or opt in with APP__CORS_ALLOW_ANY_ORIGIN=true"
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
