use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>, frontend_dir: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/run", post(handlers::run::run_design))
        // Static files (designer UI)
        .fallback_service(ServeDir::new(frontend_dir))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app(dir: &std::path::Path) -> Router {
        let state = Arc::new(AppState::new(Config {
            yaml_path: dir.join("system.yaml").display().to_string(),
            output_dir: dir.join("output").display().to_string(),
            png_dir: dir.join("pngs").display().to_string(),
            frontend_dir: dir.display().to_string(),
            ..Config::default()
        }));
        build(state, &dir.display().to_string())
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["server"], "RackForge");
    }

    #[tokio::test]
    async fn test_run_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Bad JSON"));
    }

    #[tokio::test]
    async fn test_static_files_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("designer.html"), "<html>rack</html>").unwrap();

        let resp = app(dir.path())
            .oneshot(Request::builder().uri("/designer.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<html>rack</html>");

        let missing = app(dir.path())
            .oneshot(Request::builder().uri("/nope.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
