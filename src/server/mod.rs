//! HTTP surface of the bulletin service.
//!
//! - GET /                         - static documentation page
//! - GET /api/Digilaw/Page?page=N  - text of page N of the latest bulletin
//! - GET /api/Digilaw/Companies    - text of the first pages of the latest bulletin
//! - GET /api/Digilaw/health       - liveness check

pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::BulletinError;
use crate::tools::companies_tool::CompaniesTool;
use crate::tools::page_tool::{PageParams, PageTextTool};
use crate::tools::BulletinContext;
use types::{ErrorBody, HealthResponse, TextResponse};

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
struct AppState {
    ctx: Arc<BulletinContext>,
}

pub fn router(ctx: Arc<BulletinContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/Digilaw/Page", get(page_handler))
        .route("/api/Digilaw/Companies", get(companies_handler))
        .route("/api/Digilaw/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(AppState { ctx })
}

pub async fn serve(bind: SocketAddr, ctx: Arc<BulletinContext>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// GET /
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// GET /api/Digilaw/Page?page=N
async fn page_handler(
    State(state): State<AppState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<TextResponse>, BulletinError> {
    let Query(params) = query.map_err(|rejection| {
        BulletinError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    })?;
    let result = PageTextTool::new().execute(&state.ctx, params).await?;
    Ok(Json(result.into()))
}

// GET /api/Digilaw/Companies
async fn companies_handler(
    State(state): State<AppState>,
) -> Result<Json<TextResponse>, BulletinError> {
    let result = CompaniesTool::new().execute(&state.ctx).await?;
    Ok(Json(result.into()))
}

// GET /api/Digilaw/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}
