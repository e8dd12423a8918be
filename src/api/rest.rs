// REST API endpoints

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse};
use crate::classifier::Classifier;
use crate::error::ClassifierError;
use crate::routes::VcnTable;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    classifier: Classifier,
}

impl AppState {
    pub fn new(classifier: Classifier) -> Self {
        AppState { classifier }
    }
}

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/classify", post(classify))
        .route("/api/vcn-table", get(vcn_table))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, err: ClassifierError) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: err.code().to_string(),
            message: err.user_message(),
        }),
    )
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn vcn_table(State(state): State<Arc<AppState>>) -> Json<VcnTable> {
    Json(state.classifier.config().vcn_table.clone())
}

async fn classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let source_ip = request.source_ip.trim().to_string();
    if source_ip.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            ClassifierError::InvalidInput("source_ip is required".to_string()),
        ));
    }

    // Large dumps are CPU-bound; keep them off the async workers
    let classifier = state.classifier.clone();
    let classification =
        tokio::task::spawn_blocking(move || classifier.classify(&request.raw, &source_ip))
            .await
            .map_err(|e| {
                tracing::error!("classification task failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "ClassificationFailed".to_string(),
                        message: "Classification did not complete. Please try again.".to_string(),
                    }),
                )
            })?;

    Ok(Json(ClassifyResponse {
        classified_at: chrono::Utc::now().to_rfc3339(),
        classification,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        create_api_router(Arc::new(AppState::new(Classifier::default())))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let payload = serde_json::json!({
            "source_ip": "192.0.2.1",
            "raw": "0 A S dst-address=191.5.128.105/32 gateway=pppoe-gary01 gateway-status=pppoe-gary01 reachable distance=1"
        });

        let response = app()
            .oneshot(
                Request::post("/api/classify")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["partners"]["gary"], "pppoe-gary01");
        assert_eq!(json["partners"]["plankton"], "NOT_FOUND");
        assert!(json["classifiedAt"].is_string());
    }

    #[tokio::test]
    async fn test_classify_requires_source_ip() {
        let payload = serde_json::json!({ "source_ip": " ", "raw": "" });

        let response = app()
            .oneshot(
                Request::post("/api/classify")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_non_string_raw_rejected() {
        let payload = serde_json::json!({ "source_ip": "192.0.2.1", "raw": 42 });

        let response = app()
            .oneshot(
                Request::post("/api/classify")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_vcn_table_endpoint() {
        let response = app()
            .oneshot(Request::get("/api/vcn-table").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["name"], "gary");
        assert_eq!(json[0]["prefixes"][0], "191.5.128.105/32");
    }
}
