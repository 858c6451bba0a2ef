//! Axum HTTP surface for the translation gateway.

use crate::config::Config;
use crate::error::TranslationError;
use crate::gateway::{BatchTranslateRequest, TranslateRequest, TranslationGateway};
use crate::i18n::LanguageInfo;
use crate::security::constant_time_compare;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const ADMIN_KEY_HEADER: &str = "x-api-key";

pub struct AppState {
    pub gateway: TranslationGateway,
    pub admin_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub reason: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reason: reason.into(),
        }
    }
}

impl IntoResponse for TranslationError {
    fn into_response(self) -> Response {
        let status = match &self {
            TranslationError::Validation(_) => StatusCode::BAD_REQUEST,
            TranslationError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TranslationError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TranslationError::UpstreamError { .. }
            | TranslationError::UnexpectedResponseShape(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!(error = %self, "Translation request failed");
        }
        let body = ErrorResponse::new(self.to_string(), self.reason());
        (status, Json(body)).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/translate", post(translate_handler))
        .route("/api/translate/batch", post(translate_batch_handler))
        .route("/api/translate/languages", get(languages_handler))
        .route("/api/translate/cache-stats", get(cache_stats_handler))
        .route("/api/translate/cache", delete(clear_cache_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Build the gateway from `config` and serve until Ctrl+C.
pub async fn serve(config: Config) -> Result<()> {
    let gateway = TranslationGateway::from_config(&config)?;
    if config.admin_api_key.is_none() {
        warn!("ADMIN_API_KEY is not set - cache clearing is disabled");
    }
    let state = Arc::new(AppState {
        gateway,
        admin_api_key: config.admin_api_key.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "Translation gateway listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Translation gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Malformed or incomplete JSON bodies get the same error shape as
/// validation failures.
fn invalid_body(rejection: JsonRejection) -> Response {
    warn!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(rejection.body_text(), "invalid_body")),
    )
        .into_response()
}

async fn translate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let outcome = state
        .gateway
        .translate(payload)
        .await
        .map_err(TranslationError::into_response)?;
    Ok(Json(outcome))
}

async fn translate_batch_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchTranslateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let outcome = state
        .gateway
        .translate_batch(payload)
        .await
        .map_err(TranslationError::into_response)?;
    Ok(Json(outcome))
}

async fn languages_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(LanguagesResponse {
        languages: state.gateway.supported_languages(),
    })
}

async fn cache_stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.gateway.cache_stats())
}

async fn clear_cache_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "cache clearing is disabled: no admin key configured",
                "admin_disabled",
            )),
        )
            .into_response();
    };

    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !constant_time_compare(provided, expected) {
        warn!("Rejected cache clear with invalid admin key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("invalid or missing admin key", "unauthorized")),
        )
            .into_response();
    }

    let removed = state.gateway.clear_cache();
    Json(ClearCacheResponse { removed }).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn create_test_app(admin_api_key: Option<&str>) -> Router {
        let config = Config {
            hf_api_key: Some("test-hf-key".to_string()),
            hf_api_base: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let state = Arc::new(AppState {
            gateway: TranslationGateway::from_config(&config).unwrap(),
            admin_api_key: admin_api_key.map(str::to_string),
        });
        build_router(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_translate_same_language_over_http() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/translate",
                serde_json::json!({ "text": " Hola ", "sourceLang": "es", "targetLang": "es" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["translatedText"], "Hola");
        assert_eq!(json["cached"], false);
        assert_eq!(json["fallback"], false);
        assert_eq!(json["sourceLang"], "es");
    }

    #[tokio::test]
    async fn test_translate_unsupported_language_is_bad_request() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/translate",
                serde_json::json!({ "text": "Hello", "targetLang": "xx" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["reason"], "unsupported_language");
    }

    #[tokio::test]
    async fn test_batch_empty_is_bad_request() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/translate/batch",
                serde_json::json!({ "texts": [], "targetLang": "es" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["reason"], "empty_batch");
    }

    #[tokio::test]
    async fn test_batch_same_language_over_http() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/translate/batch",
                serde_json::json!({ "texts": [" Hola ", "Adiós"], "sourceLang": "es", "targetLang": "es" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["translations"], serde_json::json!(["Hola", "Adiós"]));
        assert_eq!(json["cachedCount"], 0);
        assert_eq!(json["failedCount"], 0);
    }

    #[tokio::test]
    async fn test_translate_missing_field_is_bad_request() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/translate",
                serde_json::json!({ "text": "hi" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["reason"], "invalid_body");
        assert!(json["error"].as_str().unwrap().contains("targetLang"));
    }

    #[tokio::test]
    async fn test_batch_malformed_json_is_bad_request() {
        let app = create_test_app(None);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/translate/batch")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"texts\": ["))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["reason"], "invalid_body");
    }

    #[tokio::test]
    async fn test_languages_endpoint() {
        let app = create_test_app(None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/translate/languages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let languages = json["languages"].as_array().unwrap();
        assert!(languages
            .iter()
            .any(|l| l["code"] == "fr" && l["nativeName"] == "Français"));
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let app = create_test_app(None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/translate/cache-stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["size"], 0);
        assert_eq!(json["maxSize"], 1000);
        assert!(json["metrics"].is_object());
    }

    #[tokio::test]
    async fn test_clear_cache_requires_configured_admin_key() {
        let app = create_test_app(None);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/translate/cache")
                    .header("X-API-Key", "anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_clear_cache_rejects_wrong_key() {
        let app = create_test_app(Some("admin-secret"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/translate/cache")
                    .header("X-API-Key", "wrong-secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_clear_cache_with_valid_key() {
        let app = create_test_app(Some("admin-secret"));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/translate/cache")
                    .header("X-API-Key", "admin-secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["removed"], 0);
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                TranslationError::Validation(ValidationError::EmptyBatch),
                StatusCode::BAD_REQUEST,
            ),
            (
                TranslationError::Misconfigured("no key".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TranslationError::ModelUnavailable {
                    model: "m".to_string(),
                    attempts: 4,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                TranslationError::UpstreamError {
                    status: Some(500),
                    message: "boom".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                TranslationError::UnexpectedResponseShape("{}".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
