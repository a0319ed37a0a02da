use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classroom_bridge::api::router;
use classroom_bridge::classroom::ClassroomHttpClient;
use classroom_bridge::config::AppConfig;
use classroom_bridge::graph::GraphHttpClient;
use classroom_bridge::session::SessionStore;
use classroom_bridge::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "classroom_bridge=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let session = Arc::new(SessionStore::new());

    let classroom = Arc::new(ClassroomHttpClient::new(
        config.classroom.clone(),
        session.clone(),
        config.http_timeout,
    )?);
    let graph = Arc::new(GraphHttpClient::new(
        config.graph.clone(),
        session.clone(),
        config.http_timeout,
    )?);

    let state = AppState {
        session,
        classroom,
        graph,
        migration: config.migration.clone(),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
