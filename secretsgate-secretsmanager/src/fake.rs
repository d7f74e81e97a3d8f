//! Scripted store for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::store::{
    CreateSecret, CreateSecretOutput, PutSecretValue, PutSecretValueOutput, SecretMetadata,
    SecretStore, SecretSummary, SecretValue, StoreError,
};

/// What a scripted call returns
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Ok,
    NotFound,
    AlreadyExists,
    Fail(&'static str),
}

impl Outcome {
    fn check(self, operation: &'static str, secret_id: &str) -> Result<(), StoreError> {
        match self {
            Self::Ok => Ok(()),
            Self::NotFound => Err(StoreError::NotFound(secret_id.to_string())),
            Self::AlreadyExists => Err(StoreError::AlreadyExists(secret_id.to_string())),
            Self::Fail(message) => Err(StoreError::service(operation, message)),
        }
    }
}

/// Store that answers every call from its script and records the calls made
pub struct FakeStore {
    pub list: Outcome,
    pub create: Outcome,
    pub get_value: Outcome,
    pub put_value: Outcome,
    pub describe: Outcome,
    pub secret_string: Option<String>,
    pub(crate) calls: Mutex<Vec<&'static str>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            list: Outcome::Ok,
            create: Outcome::Ok,
            get_value: Outcome::Ok,
            put_value: Outcome::Ok,
            describe: Outcome::Ok,
            secret_string: Some("s3cr3t".to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeStore {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| **c == operation).count()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }
}

pub fn metadata(name: &str) -> SecretMetadata {
    SecretMetadata {
        arn: Some(format!("arn:aws:secretsmanager:us-east-1:000000000000:secret:{name}-abc123")),
        name: Some(name.to_string()),
        description: Some("d".to_string()),
        kms_key_id: None,
        created_date: Some(1_700_000_000.0),
        last_changed_date: Some(1_700_000_000.0),
        last_accessed_date: None,
        deleted_date: None,
        version_ids_to_stages: HashMap::from([("v1".to_string(), vec!["AWSCURRENT".to_string()])]),
    }
}

#[async_trait]
impl SecretStore for FakeStore {
    async fn list(&self, max_results: Option<i32>) -> Result<Vec<SecretSummary>, StoreError> {
        self.record("list");
        self.list.check("ListSecrets", "")?;
        let count = usize::try_from(max_results.unwrap_or(2)).unwrap_or(0).min(2);
        Ok(["alpha", "beta"]
            .iter()
            .take(count)
            .map(|name| SecretSummary {
                arn: None,
                name: Some((*name).to_string()),
                description: None,
                created_date: None,
                last_changed_date: None,
                last_accessed_date: None,
            })
            .collect())
    }

    async fn create(&self, request: CreateSecret) -> Result<CreateSecretOutput, StoreError> {
        self.record("create");
        self.create.check("CreateSecret", &request.name)?;
        Ok(CreateSecretOutput {
            arn: Some(format!("arn:test:{}", request.name)),
            name: Some(request.name),
            version_id: Some("v1".to_string()),
        })
    }

    async fn get_value(&self, secret_id: &str) -> Result<SecretValue, StoreError> {
        self.record("get_value");
        self.get_value.check("GetSecretValue", secret_id)?;
        Ok(SecretValue {
            arn: None,
            name: Some(secret_id.to_string()),
            version_id: Some("v1".to_string()),
            secret_string: self.secret_string.clone(),
        })
    }

    async fn put_value(
        &self,
        request: PutSecretValue,
    ) -> Result<PutSecretValueOutput, StoreError> {
        self.record("put_value");
        self.put_value.check("PutSecretValue", &request.secret_id)?;
        Ok(PutSecretValueOutput {
            arn: None,
            name: Some(request.secret_id),
            version_id: Some("v2".to_string()),
            version_stages: vec!["AWSCURRENT".to_string()],
        })
    }

    async fn describe(&self, secret_id: &str) -> Result<SecretMetadata, StoreError> {
        self.record("describe");
        self.describe.check("DescribeSecret", secret_id)?;
        Ok(metadata(secret_id))
    }
}
