//! IPS portal API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ips_portal::api::{build_router, AppState};
use ips_portal::config::AppConfig;
use ips_portal::database::DatabaseManager;
use ips_portal::navigation::NavigationCell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ips_portal=info,ips_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using process environment");
    }

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(
        "Starting IPS portal API (FormID overrides {}, {} ERM forms)",
        config.form_id_overrides.version,
        config.erm_forms.forms().len()
    );

    let db = DatabaseManager::new(&config.database).context("Failed to configure database pool")?;
    match db.test_connection().await {
        Ok(()) => info!("Database connection established"),
        Err(e) => warn!("Database not reachable yet, requests will fail until it is: {}", e),
    }

    let repository = Arc::new(db.repository());
    let navigation = Arc::new(NavigationCell::new(config.form_id_overrides.clone()));

    // Warm the navigation cache; the first tree request waits on this load.
    {
        let navigation = Arc::clone(&navigation);
        let repository = Arc::clone(&repository);
        tokio::spawn(async move {
            navigation.load(repository).await;
        });
    }

    let state = AppState::new(
        repository.clone(),
        repository,
        navigation,
        config.erm_forms.clone(),
    );

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = build_router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
