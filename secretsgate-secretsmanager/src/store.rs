//! Secret store capability and the types it exchanges

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret already exists: {0}")]
    AlreadyExists(String),

    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            operation,
            message: message.into(),
        }
    }

    /// Human-readable description without the operation prefix
    pub fn description(&self) -> String {
        match self {
            Self::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Input for creating a secret
#[derive(Debug, Clone)]
pub struct CreateSecret {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

/// Input for storing a new secret value
#[derive(Debug, Clone)]
pub struct PutSecretValue {
    pub secret_id: String,
    pub value: String,
}

/// Entry returned by a list call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretSummary {
    #[serde(rename = "ARN")]
    pub arn: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_date: Option<f64>,
}

/// Metadata returned by a describe call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretMetadata {
    #[serde(rename = "ARN")]
    pub arn: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<f64>,
    pub version_ids_to_stages: HashMap<String, Vec<String>>,
}

/// A secret's current value
#[derive(Debug, Clone, PartialEq)]
pub struct SecretValue {
    pub arn: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
    /// `None` when the secret only holds binary data
    pub secret_string: Option<String>,
}

/// Provider response to a create call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSecretOutput {
    #[serde(rename = "ARN")]
    pub arn: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
}

/// Provider response to a put-value call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutSecretValueOutput {
    #[serde(rename = "ARN")]
    pub arn: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
    pub version_stages: Vec<String>,
}

/// The secret-management capabilities the handlers depend on.
///
/// Each method is a single remote call; implementations do not retry.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List secret summaries, at most `max_results` when given
    async fn list(&self, max_results: Option<i32>) -> Result<Vec<SecretSummary>, StoreError>;

    /// Create a secret; fails with `AlreadyExists` if the name is taken
    async fn create(&self, request: CreateSecret) -> Result<CreateSecretOutput, StoreError>;

    /// Fetch the current value of a secret
    async fn get_value(&self, secret_id: &str) -> Result<SecretValue, StoreError>;

    /// Store a new current value for an existing secret
    async fn put_value(&self, request: PutSecretValue)
        -> Result<PutSecretValueOutput, StoreError>;

    /// Fetch a secret's metadata
    async fn describe(&self, secret_id: &str) -> Result<SecretMetadata, StoreError>;
}
