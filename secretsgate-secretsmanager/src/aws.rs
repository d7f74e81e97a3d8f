//! AWS Secrets Manager backed store

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::primitives::DateTime;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

use crate::store::{
    CreateSecret, CreateSecretOutput, PutSecretValue, PutSecretValueOutput, SecretMetadata,
    SecretStore, SecretSummary, SecretValue, StoreError,
};

/// Overrides applied on top of the ambient AWS configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsStoreOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Alternate endpoint, e.g. a local emulator
    pub endpoint_url: Option<String>,
}

/// Store that forwards every call to AWS Secrets Manager
#[derive(Debug, Clone)]
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient credential chain plus `options`
    pub async fn from_options(options: &AwsStoreOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = options.region.clone() {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = options.profile.as_deref() {
            loader = loader.profile_name(profile);
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_secretsmanager::config::Builder::from(&shared_config);
        if let Some(endpoint) = options.endpoint_url.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        debug!(
            region = ?client.config().region(),
            endpoint = ?options.endpoint_url,
            "AWS Secrets Manager client ready"
        );
        Self::new(client)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn list(&self, max_results: Option<i32>) -> Result<Vec<SecretSummary>, StoreError> {
        debug!(?max_results, "ListSecrets");
        let output = self
            .client
            .list_secrets()
            .set_max_results(max_results)
            .send()
            .await
            .map_err(|e| classify("ListSecrets", "", e))?;

        Ok(output
            .secret_list()
            .iter()
            .map(|entry| SecretSummary {
                arn: entry.arn().map(str::to_string),
                name: entry.name().map(str::to_string),
                description: entry.description().map(str::to_string),
                created_date: epoch_seconds(entry.created_date()),
                last_changed_date: epoch_seconds(entry.last_changed_date()),
                last_accessed_date: epoch_seconds(entry.last_accessed_date()),
            })
            .collect())
    }

    async fn create(&self, request: CreateSecret) -> Result<CreateSecretOutput, StoreError> {
        debug!(name = %request.name, "CreateSecret");
        let output = self
            .client
            .create_secret()
            .name(&request.name)
            .secret_string(request.value)
            .set_description(request.description)
            .send()
            .await
            .map_err(|e| classify("CreateSecret", &request.name, e))?;

        Ok(CreateSecretOutput {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn get_value(&self, secret_id: &str) -> Result<SecretValue, StoreError> {
        debug!(secret_id = %secret_id, "GetSecretValue");
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| classify("GetSecretValue", secret_id, e))?;

        Ok(SecretValue {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            secret_string: output.secret_string().map(str::to_string),
        })
    }

    async fn put_value(
        &self,
        request: PutSecretValue,
    ) -> Result<PutSecretValueOutput, StoreError> {
        debug!(secret_id = %request.secret_id, "PutSecretValue");
        let output = self
            .client
            .put_secret_value()
            .secret_id(&request.secret_id)
            .secret_string(request.value)
            .send()
            .await
            .map_err(|e| classify("PutSecretValue", &request.secret_id, e))?;

        Ok(PutSecretValueOutput {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            version_stages: output.version_stages().to_vec(),
        })
    }

    async fn describe(&self, secret_id: &str) -> Result<SecretMetadata, StoreError> {
        debug!(secret_id = %secret_id, "DescribeSecret");
        let output = self
            .client
            .describe_secret()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| classify("DescribeSecret", secret_id, e))?;

        Ok(SecretMetadata {
            arn: output.arn().map(str::to_string),
            name: output.name().map(str::to_string),
            description: output.description().map(str::to_string),
            kms_key_id: output.kms_key_id().map(str::to_string),
            created_date: epoch_seconds(output.created_date()),
            last_changed_date: epoch_seconds(output.last_changed_date()),
            last_accessed_date: epoch_seconds(output.last_accessed_date()),
            deleted_date: epoch_seconds(output.deleted_date()),
            version_ids_to_stages: output.version_ids_to_stages().cloned().unwrap_or_default(),
        })
    }
}

fn epoch_seconds(date: Option<&DateTime>) -> Option<f64> {
    date.map(DateTime::as_secs_f64)
}

/// Map an SDK failure onto the store's error kinds by service error code
fn classify<E, R>(operation: &'static str, secret_id: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        match service_err.code() {
            Some("ResourceNotFoundException") => {
                return StoreError::NotFound(secret_id.to_string())
            }
            Some("ResourceExistsException") => {
                return StoreError::AlreadyExists(secret_id.to_string())
            }
            _ => {}
        }
        if let Some(message) = service_err.message() {
            return StoreError::service(operation, message);
        }
    }
    StoreError::service(operation, DisplayErrorContext(&err).to_string())
}
