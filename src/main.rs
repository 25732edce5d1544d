use std::sync::Arc;

use anyhow::Context;
use pawconnect::{
    auth,
    backend::{RestBackend, SharedBackend, SqliteBackend},
    config::{BackendConfig, Config},
    AppState,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pawconnect=info,tower_http=info")),
        )
        .init();

    let http = reqwest::Client::new();

    let (backend, db_pool) = match &config.backend {
        BackendConfig::Remote { url, anon_key } => {
            tracing::info!(%url, "using hosted backend");
            let backend: SharedBackend = Arc::new(RestBackend::new(http.clone(), url, anon_key));
            (backend, None)
        }
        BackendConfig::Local { database_url } => {
            tracing::info!(%database_url, "using local sqlite backend");
            let db_pool = SqlitePoolOptions::new()
                .max_connections(16)
                .connect(database_url)
                .await
                .with_context(|| format!("connecting to {database_url}"))?;
            let sqlite = SqliteBackend::new(db_pool.clone());
            sqlite.migrate().await?;
            let backend: SharedBackend = Arc::new(sqlite);
            (backend, Some(db_pool))
        }
    };

    let app_state = AppState {
        backend,
        clients: auth::Clients::new(http, &config),
        db_pool,
    };

    let app = pawconnect::app(app_state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, site = %config.site_url, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
