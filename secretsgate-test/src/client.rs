//! Client for the secretsgate HTTP surface

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Status and raw body of a response
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Client for interacting with secretsgate
pub struct SecretsGateClient {
    base_url: String,
    client: Client,
}

impl SecretsGateClient {
    /// Create a new client
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_secrets(&self, max_results: i32) -> Result<Reply, ClientError> {
        let url = format!("{}/list-secretsmanagers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("maxResults", max_results)])
            .send()
            .await?;
        read(response).await
    }

    pub async fn create_secret(
        &self,
        name: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<Reply, ClientError> {
        let url = format!("{}/create-secret", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "secretName": name,
                "value": value,
                "description": description,
            }))
            .send()
            .await?;
        read(response).await
    }

    pub async fn get_secret(&self, name: &str) -> Result<Reply, ClientError> {
        let url = format!("{}/get-secret", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("secretName", name)])
            .send()
            .await?;
        read(response).await
    }

    pub async fn update_secret_value(&self, name: &str, value: &str) -> Result<Reply, ClientError> {
        let url = format!("{}/update-secret-value", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "secretName": name, "value": value }))
            .send()
            .await?;
        read(response).await
    }

    pub async fn describe_secret(&self, name: &str) -> Result<Reply, ClientError> {
        let url = format!("{}/describe-secret", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("secretName", name)])
            .send()
            .await?;
        read(response).await
    }
}

async fn read(response: reqwest::Response) -> Result<Reply, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    Ok(Reply { status, body })
}
