//! ferdle-server entry point.
//!
//! Wires configuration, storage, games and services, then starts the Axum
//! HTTP server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ferdle_server::api;
use ferdle_server::app_state::{AppState, EngineSettings};
use ferdle_server::config::{LogFormat, ServerConfig};
use ferdle_server::domain::{GameCalendar, SystemClock, Whitelist};
use ferdle_server::games::builtin_registry;
use ferdle_server::persistence::Stores;
use ferdle_server::persistence::memory::InMemoryStore;
use ferdle_server::persistence::postgres::PostgresStore;
use ferdle_server::service::{HttpImageGenerator, ImageGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting ferdle-server");

    // Storage
    let stores = if config.persistence_enabled {
        let store = PostgresStore::connect(
            &config.database_url,
            config.database_max_connections,
            config.database_min_connections,
            config.database_connect_timeout(),
        )
        .await
        .context("connecting to PostgreSQL")?;
        store.run_migrations().await.context("running migrations")?;
        tracing::info!("using PostgreSQL persistence");
        Stores::from_backend(Arc::new(store))
    } else {
        tracing::warn!("persistence disabled; all state is kept in memory");
        Stores::from_backend(Arc::new(InMemoryStore::new()))
    };

    // Domain
    let whitelist = Arc::new(Whitelist::load(config.whitelist_path()).context("loading whitelist")?);
    let registry = Arc::new(builtin_registry(&config.data_dir).context("loading word lists")?);

    let generator = match &config.content_generator_url {
        Some(url) => {
            let client = HttpImageGenerator::new(url.clone(), config.content_generator_timeout())
                .context("building image generator client")?;
            tracing::info!(endpoint = %url, "illustrations enabled");
            Some(Arc::new(client) as Arc<dyn ImageGenerator>)
        }
        None => {
            tracing::info!("CONTENT_GENERATOR_URL not set; illustrations disabled");
            None
        }
    };

    // Services and state
    let settings = EngineSettings {
        calendar: GameCalendar::new(config.game_retention_days),
        leaderboard_default_limit: config.leaderboard_default_limit,
        admin_emails: config.admin_emails.clone(),
    };
    let app_state = AppState::new(
        stores,
        registry,
        whitelist,
        generator,
        settings,
        Arc::new(SystemClock),
    );

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
