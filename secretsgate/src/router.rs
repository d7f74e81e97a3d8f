//! HTTP router for secretsgate

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use secretsgate_core::{RequestId, REQUEST_ID_HEADER};
use secretsgate_secretsmanager::{
    AwsSecretStore, AwsStoreOptions, InMemorySecretStore, SecretStore, SecretsState,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Instrument};

use crate::config::StoreConfig;

/// Build handler state around the configured store
pub async fn build_state(config: &StoreConfig) -> Arc<SecretsState> {
    let store: Arc<dyn SecretStore> = match config {
        StoreConfig::Aws {
            region,
            profile,
            endpoint_url,
        } => {
            let options = AwsStoreOptions {
                region: region.clone(),
                profile: profile.clone(),
                endpoint_url: endpoint_url.clone(),
            };
            info!(?options, "Using AWS Secrets Manager store");
            Arc::new(AwsSecretStore::from_options(&options).await)
        }
        StoreConfig::Memory => {
            info!("Using in-memory secret store");
            Arc::new(InMemorySecretStore::new())
        }
    };
    Arc::new(SecretsState::new(store))
}

/// Create the main application router
pub fn create_router(state: Arc<SecretsState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(secretsgate_secretsmanager::router(state))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "running" })))
}

/// Tag the request's logs and response with a request ID
async fn request_id(request: Request, next: Next) -> Response {
    let id = RequestId::from_header(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    async fn app() -> Router {
        create_router(build_state(&StoreConfig::Memory).await)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "running");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(id.len(), 32);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .await
            .oneshot(
                Request::get("/describe-secret?secretName=missing")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[REQUEST_ID_HEADER].to_str().unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_secret_routes_are_mounted() {
        let app = app().await;
        let create = Request::post("/create-secret")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"secretName":"db-pw","value":"s3cr3t"}"#))
            .unwrap();
        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/get-secret?secretName=db-pw")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"s3cr3t");
    }
}
