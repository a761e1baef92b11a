//! HTTP API for the query service.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - response and error types

mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rabbithole_core::QueryService;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// Search + model pipeline, built once at startup.
    pub service: Arc<QueryService>,
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server.
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Whether to open the health endpoint in a browser.
    pub open_browser: bool,
}

// =============================================================================
// Router
// =============================================================================

/// Builds the API router; split out so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/rabbitholes/search", post(handlers::search))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Server Entry Point
// =============================================================================

/// Start the API server.
pub async fn start_server(
    config: ServeConfig,
    service: QueryService,
) -> color_eyre::Result<()> {
    let state = Arc::new(AppState {
        service: Arc::new(service),
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let url = format!("http://{}/api/health", addr);
    tracing::info!(address = %addr, "server listening");

    println!("rabbithole API on http://{}", addr);
    println!("Press Ctrl+C to stop\n");

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rabbithole_core::search::{SearchHit, SearchOptions, SearchResults};
    use rabbithole_core::{LLMError, SearchError, SearchProvider, LLM};
    use serde_json::Value;
    use tower::ServiceExt;

    struct CannedLLM(Result<&'static str, ()>);

    #[async_trait]
    impl LLM for CannedLLM {
        async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
            self.complete_with_system("", prompt).await
        }

        async fn complete_with_system(&self, _system: &str, _prompt: &str) -> Result<String, LLMError> {
            self.0
                .map(str::to_string)
                .map_err(|_| LLMError::Network("connection reset".to_string()))
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct OneHit;

    #[async_trait]
    impl SearchProvider for OneHit {
        async fn search(&self, query: &str, _options: &SearchOptions) -> Result<SearchResults, SearchError> {
            Ok(SearchResults {
                query: query.to_string(),
                results: vec![SearchHit {
                    title: Some("Tides".to_string()),
                    url: Some("https://example.org/tides".to_string()),
                    ..SearchHit::default()
                }],
                ..SearchResults::default()
            })
        }
    }

    const REPLY: &str = "The Moon pulls the oceans.\n<<<FOLLOW_UP_QUESTIONS>>>\n- Why two tides?\n<<<END_FOLLOW_UP_QUESTIONS>>>";

    fn app(llm: CannedLLM) -> Router {
        let service = QueryService::new(Arc::new(llm), Arc::new(OneHit));
        router(Arc::new(AppState {
            service: Arc::new(service),
        }))
    }

    fn post_search(body: &str) -> Request<Body> {
        Request::post("/api/rabbitholes/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_healthy() {
        let res = app(CannedLLM(Ok(REPLY)))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, serde_json::json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn search_returns_answer() {
        let res = app(CannedLLM(Ok(REPLY)))
            .oneshot(post_search(r#"{"query":"tides","followUpMode":"focused"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = json_body(res).await;
        assert_eq!(body["response"], "The Moon pulls the oceans.");
        assert_eq!(body["followUpQuestions"], serde_json::json!(["Why two tides?"]));
        assert_eq!(body["contextualQuery"], "tides");
        assert_eq!(body["sources"][0]["uri"], "https://example.org/tides");
        assert_eq!(body["images"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn model_failure_is_500() {
        let res = app(CannedLLM(Err(())))
            .oneshot(post_search(r#"{"query":"tides"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(res).await;
        assert_eq!(body["error"], "Failed to process search request");
        assert!(body["details"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn empty_query_is_400() {
        let res = app(CannedLLM(Ok(REPLY)))
            .oneshot(post_search(r#"{"query":"  "}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cors_preflight_allowed() {
        let res = app(CannedLLM(Ok(REPLY)))
            .oneshot(
                Request::options("/api/rabbitholes/search")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
    }
}
