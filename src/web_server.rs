// File: src/web_server.rs
// HTML explorer pages and JSON API over the view builders

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, Router},
    Json,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::block_source::SourceError;
use crate::data_models::ErrorView;
use crate::explorer::{Explorer, ExplorerError};
use crate::renderer::Renderer;

/// Query parameters for the block list API
#[derive(Deserialize)]
struct PageQuery {
    start: Option<u64>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub explorer: Explorer,
    pub renderer: Arc<Renderer>,
}

/// Build the router: HTML pages at the root, JSON under `/api`
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(main_page))
        .route("/blocks/:height", get(pager_page))
        .route("/block/:hash", get(block_page))
        .route("/tx/:txid", get(tx_page))
        .route("/scores", get(scores_page))
        .route("/api/latest", get(api_latest))
        .route("/api/blocks", get(api_blocks))
        .route("/api/block/:hash", get(api_block))
        .route("/api/tx/:txid", get(api_tx))
        .route("/api/scores", get(api_scores))
        .with_state(state);

    if enable_cors {
        app = app.layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            ),
        );
    }

    app
}

/// Run the web server until the process is stopped
pub async fn run_web_mode(state: AppState, bind: &str, port: u16, enable_cors: bool) -> Result<()> {
    let app = router(state, enable_cors);
    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;

    info!("Explorer available at http://{}", addr);
    info!("API endpoints:");
    info!("   GET /api/latest - Newest blocks");
    info!("   GET /api/blocks?start=H - Block page ending at height H");
    info!("   GET /api/block/:hash - Block details");
    info!("   GET /api/tx/:txid - Transaction details");
    info!("   GET /api/scores - Coinbase message leaderboard");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn status_for(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::View(_) => StatusCode::BAD_REQUEST,
        ExplorerError::Source(SourceError::NotFound(_)) => StatusCode::NOT_FOUND,
        ExplorerError::Source(_) => StatusCode::BAD_GATEWAY,
    }
}

fn log_failure(err: &ExplorerError, status: StatusCode) {
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
}

/// Render a view, or the error page when building it failed
fn html_response<T>(
    renderer: &Renderer,
    result: Result<T, ExplorerError>,
    render: impl FnOnce(&Renderer, &T) -> String,
) -> Response {
    match result {
        Ok(view) => Html(render(renderer, &view)).into_response(),
        Err(err) => {
            let status = status_for(&err);
            log_failure(&err, status);
            let page = renderer.error_page(&ErrorView {
                message: err.to_string(),
            });
            (status, Html(page)).into_response()
        }
    }
}

fn json_response<T: Serialize>(result: Result<T, ExplorerError>) -> Response {
    match result {
        Ok(view) => Json(view).into_response(),
        Err(err) => {
            let status = status_for(&err);
            log_failure(&err, status);
            (
                status,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn main_page(State(state): State<AppState>) -> Response {
    html_response(&state.renderer, state.explorer.latest().await, Renderer::main_page)
}

async fn pager_page(Path(height): Path<u64>, State(state): State<AppState>) -> Response {
    html_response(&state.renderer, state.explorer.page(height).await, Renderer::pager_page)
}

async fn block_page(Path(hash): Path<String>, State(state): State<AppState>) -> Response {
    html_response(&state.renderer, state.explorer.block(&hash).await, Renderer::block_page)
}

async fn tx_page(Path(txid): Path<String>, State(state): State<AppState>) -> Response {
    html_response(&state.renderer, state.explorer.transaction(&txid).await, Renderer::tx_page)
}

async fn scores_page(State(state): State<AppState>) -> Response {
    html_response(&state.renderer, state.explorer.scores().await, Renderer::scores_page)
}

async fn api_latest(State(state): State<AppState>) -> Response {
    json_response(state.explorer.latest().await)
}

async fn api_blocks(Query(params): Query<PageQuery>, State(state): State<AppState>) -> Response {
    match params.start {
        Some(start) => json_response(state.explorer.page(start).await),
        None => json_response(state.explorer.latest().await),
    }
}

async fn api_block(Path(hash): Path<String>, State(state): State<AppState>) -> Response {
    json_response(state.explorer.block(&hash).await)
}

async fn api_tx(Path(txid): Path<String>, State(state): State<AppState>) -> Response {
    json_response(state.explorer.transaction(&txid).await)
}

async fn api_scores(State(state): State<AppState>) -> Response {
    json_response(state.explorer.scores().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::block_source::FixtureBlockSource;
    use crate::model::DisplayZone;
    use crate::test_support::{block, block_hash, fixture_source, txid};

    fn app_with(source: FixtureBlockSource) -> Router {
        let state = AppState {
            explorer: Explorer::new(Arc::new(source), DisplayZone::Utc, 50),
            renderer: Arc::new(Renderer::new("Test Explorer")),
        };
        router(state, false)
    }

    fn app() -> Router {
        app_with(fixture_source(60, &["/a/", "/b/", "/a/", "/c/"]))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn main_page_renders_latest_blocks() {
        let (status, body) = fetch(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Latest blocks - Test Explorer</title>"));
        assert!(body.contains("href=\"/blocks/31\""));
        assert!(!body.contains("Newer blocks"));
    }

    #[tokio::test]
    async fn pager_page_has_both_links() {
        let (status, body) = fetch(app(), "/blocks/40").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/blocks/11\""));
        assert!(body.contains("href=\"/blocks/69\""));
    }

    #[tokio::test]
    async fn block_and_tx_pages() {
        let (status, body) = fetch(app(), &format!("/block/{}", block_hash(12))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2>Block 12</h2>"));

        let (status, body) = fetch(app(), &format!("/tx/{}", txid(12, 1))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Total output: 1.75100000 BTC"));
    }

    #[tokio::test]
    async fn unknown_block_renders_error_page() {
        let (status, body) = fetch(app(), "/block/deadbeef").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<h2>Error</h2>"));
    }

    #[tokio::test]
    async fn malformed_block_is_bad_request() {
        let mut broken = block(0, b"x");
        broken.transactions.clear();
        let (status, body) = fetch(app_with(FixtureBlockSource::from_blocks(vec![broken])), "/api/latest").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("\"error\""));
    }

    #[tokio::test]
    async fn api_blocks_pages_and_defaults_to_latest() {
        let (status, body) = fetch(app(), "/api/blocks?start=40").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["window"]["previous_page"], 11);
        assert_eq!(json["window"]["next_page"], 69);
        assert_eq!(json["blocks"][0]["total_btc"], "51.75100");

        let (_, body) = fetch(app(), "/api/blocks").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["window"].get("next_page").is_none());
        assert_eq!(json["blocks"][0]["height"], 60);
    }

    #[tokio::test]
    async fn api_scores_ranks_messages() {
        let (status, body) = fetch(app(), "/api/scores").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["blocks_scanned"], 50);
        assert_eq!(json["entries"][0]["message"], "/a/");
        assert_eq!(json["entries"][0]["count"], 25);
    }

    #[tokio::test]
    async fn api_block_and_tx() {
        let (_, body) = fetch(app(), &format!("/api/block/{}", block_hash(3))).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["summary"]["coinbase_message"], "/c/");
        assert_eq!(json["transactions"][0]["display_hash"], &txid(3, 0)[..10]);

        let (status, _) = fetch(app(), "/api/tx/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
