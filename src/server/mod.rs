//! Liveness HTTP endpoint
//!
//! Keeps hosting platforms that expect an open port happy. Uses `axum`.

use axum::{response::Json, routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;

/// Router with `GET /` and `GET /health`
pub fn router() -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
}

/// Bind `0.0.0.0:{port}` and serve until the task is aborted
pub async fn start_server(port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "Starting health server");
    serve(listener).await
}

/// Serve the router on an already bound listener
pub async fn serve(listener: TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}

/// GET /health - process status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}
