//! HTTP handlers for the Secrets Manager facade

use axum::{
    extract::{Query, State},
    routing::{get, post, put},
    Json, Router,
};
use secretsgate_core::{ApiError, ErrorCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::probe::{probe, Probe, SECRET_NAME_NULL, SECRET_NOT_FOUND};
use crate::store::{
    CreateSecret, CreateSecretOutput, PutSecretValue, PutSecretValueOutput, SecretMetadata,
    SecretStore, SecretSummary, StoreError,
};

pub const SECRET_ALREADY_DEFINED: &str = "secret already defined";
pub const SECRETS_NOT_CREATED: &str = "secrets not created";
pub const NO_STRING_VALUE: &str = "secret has no string value";

/// Shared state for the handlers
pub struct SecretsState {
    pub store: Arc<dyn SecretStore>,
}

impl SecretsState {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }
}

/// Routes for the five secret operations
pub fn router(state: Arc<SecretsState>) -> Router {
    Router::new()
        .route("/list-secretsmanagers", get(list_secrets))
        .route("/create-secret", post(create_secret))
        .route("/get-secret", get(get_secret))
        .route("/update-secret-value", put(update_secret_value))
        .route("/describe-secret", get(describe_secret))
        .with_state(state)
}

// === Request types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSecretsQuery {
    pub max_results: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretNameQuery {
    #[serde(default)]
    pub secret_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    #[serde(default)]
    pub secret_name: String,
    #[serde(default)]
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSecretValueRequest {
    #[serde(default)]
    pub secret_name: String,
    #[serde(default)]
    pub value: String,
}

// === Handlers ===

pub async fn list_secrets(
    State(state): State<Arc<SecretsState>>,
    Query(query): Query<ListSecretsQuery>,
) -> Result<Json<Vec<SecretSummary>>, ApiError> {
    info!(max_results = ?query.max_results, "ListSecrets request");

    state
        .store
        .list(query.max_results)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(ErrorCode::InternalFailure, e.to_string()))
}

pub async fn create_secret(
    State(state): State<Arc<SecretsState>>,
    Json(req): Json<CreateSecretRequest>,
) -> Result<Json<CreateSecretOutput>, ApiError> {
    info!(name = %req.secret_name, "CreateSecret request");

    match probe(state.store.as_ref(), &req.secret_name).await {
        Probe::NotFound => {}
        Probe::Found(_) => {
            return Err(ApiError::new(
                ErrorCode::SecretAlreadyDefined,
                SECRET_ALREADY_DEFINED,
            ))
        }
        Probe::InvalidName => {
            return Err(ApiError::new(ErrorCode::InvalidSecretName, SECRET_NAME_NULL))
        }
        Probe::Failed(message) => return Err(ApiError::new(ErrorCode::StoreFailure, message)),
    }

    let request = CreateSecret {
        name: req.secret_name,
        value: req.value,
        description: req.description.filter(|d| !d.trim().is_empty()),
    };

    match state.store.create(request).await {
        Ok(output) => Ok(Json(output)),
        // Created by someone else between the probe and this call
        Err(StoreError::AlreadyExists(name)) => {
            warn!(name = %name, "Secret appeared after probe");
            Err(ApiError::new(
                ErrorCode::SecretAlreadyDefined,
                SECRET_ALREADY_DEFINED,
            ))
        }
        Err(e) => {
            warn!(error = %e, "CreateSecret rejected");
            Err(ApiError::new(ErrorCode::SecretNotCreated, SECRETS_NOT_CREATED))
        }
    }
}

pub async fn get_secret(
    State(state): State<Arc<SecretsState>>,
    Query(query): Query<SecretNameQuery>,
) -> Result<String, ApiError> {
    info!(name = %query.secret_name, "GetSecretValue request");
    require_name(&query.secret_name)?;

    match state.store.get_value(&query.secret_name).await {
        Ok(value) => value
            .secret_string
            .ok_or_else(|| ApiError::new(ErrorCode::NoStringValue, NO_STRING_VALUE)),
        Err(StoreError::NotFound(_)) => {
            Err(ApiError::new(ErrorCode::SecretNotFound, SECRET_NOT_FOUND))
        }
        Err(e) => Err(ApiError::new(ErrorCode::StoreFailure, e.description())),
    }
}

pub async fn update_secret_value(
    State(state): State<Arc<SecretsState>>,
    Json(req): Json<UpdateSecretValueRequest>,
) -> Result<Json<PutSecretValueOutput>, ApiError> {
    info!(name = %req.secret_name, "PutSecretValue request");
    require_name(&req.secret_name)?;

    state
        .store
        .put_value(PutSecretValue {
            secret_id: req.secret_name,
            value: req.value,
        })
        .await
        .map(Json)
        .map_err(|e| ApiError::new(ErrorCode::InternalFailure, e.to_string()))
}

pub async fn describe_secret(
    State(state): State<Arc<SecretsState>>,
    Query(query): Query<SecretNameQuery>,
) -> Result<Json<SecretMetadata>, ApiError> {
    info!(name = %query.secret_name, "DescribeSecret request");

    let outcome = probe(state.store.as_ref(), &query.secret_name).await;
    let code = match &outcome {
        Probe::Found(metadata) => return Ok(Json(metadata.clone())),
        Probe::InvalidName => ErrorCode::InvalidSecretName,
        Probe::NotFound => ErrorCode::SecretNotFound,
        Probe::Failed(_) => ErrorCode::StoreFailure,
    };
    Err(ApiError::new(code, outcome.error_message()))
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidSecretName, SECRET_NAME_NULL));
    }
    Ok(())
}
