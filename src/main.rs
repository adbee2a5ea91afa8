use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use filevault::api;
use filevault::config::Config;
use filevault::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Database: {} ({})", config.db_name, config.mongo_uri);
    tracing::info!("Search index: {}", config.search_index);

    let bind_addr = config.bind_addr.clone();
    let max_upload = config.max_upload_bytes();
    let state = AppState::new(config).await?;

    let app = Router::new()
        .route("/", get(api::files::index))
        .route(
            "/upload",
            post(api::files::upload).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/files", get(api::files::list_json))
        .route("/files/{id}", get(api::files::download))
        .route("/search", get(api::search::search_page))
        .route("/search/download/{id}", get(api::search::download))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
