//! Ripple HTTP surface: a thin axum router mirroring the CLI's operations,
//! serialized behind one `Engine` mutex.

mod error;
mod routes;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let dev_origin = std::env::var("RIPPLE_DEV_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
    let cors = match dev_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin = %dev_origin, "RIPPLE_DEV_ORIGIN is not a valid origin, disabling CORS");
            CorsLayer::new()
        }
    };

    let state = routes::new_state();

    let app = Router::new()
        .route("/api/v1/workspace/load", post(routes::load))
        .route("/api/v1/workspace/simulate", post(routes::simulate))
        .route("/api/v1/workspace/reset", post(routes::reset))
        .route("/api/v1/workspace/history", get(routes::history))
        .route("/api/v1/workspace/samples", get(routes::samples))
        .route("/api/v1/workspace/health", get(routes::health))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("RIPPLE_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    tracing::info!(%addr, "ripple-server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
