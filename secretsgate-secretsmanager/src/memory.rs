//! In-memory secret store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::store::{
    CreateSecret, CreateSecretOutput, PutSecretValue, PutSecretValueOutput, SecretMetadata,
    SecretStore, SecretSummary, SecretValue, StoreError,
};

const AWSCURRENT: &str = "AWSCURRENT";
const AWSPREVIOUS: &str = "AWSPREVIOUS";
const MAX_LIST_RESULTS: i32 = 100;

/// A secret with its versions
#[derive(Debug, Clone)]
struct Secret {
    arn: String,
    name: String,
    description: Option<String>,
    /// version_id -> SecretVersion
    versions: HashMap<String, SecretVersion>,
    current_version_id: String,
    previous_version_id: Option<String>,
    created_date: DateTime<Utc>,
    last_changed_date: DateTime<Utc>,
    last_accessed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct SecretVersion {
    secret_string: String,
    version_stages: Vec<String>,
}

impl Secret {
    fn current(&self) -> Option<&SecretVersion> {
        self.versions.get(&self.current_version_id)
    }

    fn summary(&self) -> SecretSummary {
        SecretSummary {
            arn: Some(self.arn.clone()),
            name: Some(self.name.clone()),
            description: self.description.clone(),
            created_date: Some(epoch_seconds(self.created_date)),
            last_changed_date: Some(epoch_seconds(self.last_changed_date)),
            last_accessed_date: self.last_accessed_date.map(epoch_seconds),
        }
    }

    fn metadata(&self) -> SecretMetadata {
        SecretMetadata {
            arn: Some(self.arn.clone()),
            name: Some(self.name.clone()),
            description: self.description.clone(),
            kms_key_id: None,
            created_date: Some(epoch_seconds(self.created_date)),
            last_changed_date: Some(epoch_seconds(self.last_changed_date)),
            last_accessed_date: self.last_accessed_date.map(epoch_seconds),
            deleted_date: None,
            version_ids_to_stages: self
                .versions
                .iter()
                .filter(|(_, v)| !v.version_stages.is_empty())
                .map(|(k, v)| (k.clone(), v.version_stages.clone()))
                .collect(),
        }
    }
}

/// Process-local store with the same error behaviour as Secrets Manager.
///
/// Secrets are keyed by name; lookups also accept the secret's ARN.
#[derive(Debug)]
pub struct InMemorySecretStore {
    region: String,
    account_id: String,
    secrets: DashMap<String, Secret>,
}

impl Default for InMemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::with_location("us-east-1", "000000000000")
    }

    /// Store whose ARNs carry the given region and account
    pub fn with_location(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            secrets: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    fn arn_for(&self, name: &str) -> String {
        format!(
            "arn:aws:secretsmanager:{}:{}:secret:{}-{}",
            self.region,
            self.account_id,
            name,
            &Uuid::new_v4().simple().to_string()[..6]
        )
    }

    /// Resolve a name or ARN to the map key
    fn key_for(&self, secret_id: &str) -> Option<String> {
        if self.secrets.contains_key(secret_id) {
            return Some(secret_id.to_string());
        }
        self.secrets
            .iter()
            .find(|entry| entry.value().arn == secret_id)
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn list(&self, max_results: Option<i32>) -> Result<Vec<SecretSummary>, StoreError> {
        let limit = match max_results {
            None => usize::MAX,
            Some(n) if (1..=MAX_LIST_RESULTS).contains(&n) => n.unsigned_abs() as usize,
            Some(n) => {
                return Err(StoreError::service(
                    "ListSecrets",
                    format!("MaxResults must be between 1 and {MAX_LIST_RESULTS}, got {n}"),
                ))
            }
        };

        let mut secrets: Vec<SecretSummary> =
            self.secrets.iter().map(|r| r.value().summary()).collect();
        secrets.sort_by(|a, b| a.name.cmp(&b.name));
        secrets.truncate(limit);
        Ok(secrets)
    }

    async fn create(&self, request: CreateSecret) -> Result<CreateSecretOutput, StoreError> {
        let arn = self.arn_for(&request.name);
        match self.secrets.entry(request.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(request.name)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let version_id = Uuid::new_v4().to_string();
                let mut versions = HashMap::new();
                versions.insert(
                    version_id.clone(),
                    SecretVersion {
                        secret_string: request.value,
                        version_stages: vec![AWSCURRENT.to_string()],
                    },
                );

                let secret = Secret {
                    arn: arn.clone(),
                    name: request.name.clone(),
                    description: request.description.filter(|d| !d.is_empty()),
                    versions,
                    current_version_id: version_id.clone(),
                    previous_version_id: None,
                    created_date: now,
                    last_changed_date: now,
                    last_accessed_date: None,
                };
                slot.insert(secret);
                debug!(name = %request.name, "Secret created");

                Ok(CreateSecretOutput {
                    arn: Some(arn),
                    name: Some(request.name),
                    version_id: Some(version_id),
                })
            }
        }
    }

    async fn get_value(&self, secret_id: &str) -> Result<SecretValue, StoreError> {
        let key = self
            .key_for(secret_id)
            .ok_or_else(|| StoreError::NotFound(secret_id.to_string()))?;
        let mut secret = self
            .secrets
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(secret_id.to_string()))?;

        secret.last_accessed_date = Some(Utc::now());

        let value = secret
            .current()
            .map(|v| v.secret_string.clone())
            .ok_or_else(|| StoreError::NotFound(secret_id.to_string()))?;

        Ok(SecretValue {
            arn: Some(secret.arn.clone()),
            name: Some(secret.name.clone()),
            version_id: Some(secret.current_version_id.clone()),
            secret_string: Some(value),
        })
    }

    async fn put_value(
        &self,
        request: PutSecretValue,
    ) -> Result<PutSecretValueOutput, StoreError> {
        let key = self
            .key_for(&request.secret_id)
            .ok_or_else(|| StoreError::NotFound(request.secret_id.clone()))?;
        let mut secret = self
            .secrets
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(request.secret_id.clone()))?;

        let now = Utc::now();
        let new_version_id = Uuid::new_v4().to_string();

        // Clone the IDs we need before mutating
        let current_vid = secret.current_version_id.clone();
        let prev_vid = secret.previous_version_id.clone();

        // Move current to previous
        if let Some(current_version) = secret.versions.get_mut(&current_vid) {
            current_version.version_stages.retain(|s| s != AWSCURRENT);
            current_version.version_stages.push(AWSPREVIOUS.to_string());
        }
        if let Some(pvid) = prev_vid {
            if let Some(prev_version) = secret.versions.get_mut(&pvid) {
                prev_version.version_stages.retain(|s| s != AWSPREVIOUS);
            }
        }
        // Versions without a staging label are unreachable
        secret.versions.retain(|_, v| !v.version_stages.is_empty());
        secret.previous_version_id = Some(current_vid);

        secret.versions.insert(
            new_version_id.clone(),
            SecretVersion {
                secret_string: request.value,
                version_stages: vec![AWSCURRENT.to_string()],
            },
        );
        secret.current_version_id = new_version_id.clone();
        secret.last_changed_date = now;
        debug!(name = %secret.name, version_id = %new_version_id, "Secret value stored");

        Ok(PutSecretValueOutput {
            arn: Some(secret.arn.clone()),
            name: Some(secret.name.clone()),
            version_id: Some(new_version_id),
            version_stages: vec![AWSCURRENT.to_string()],
        })
    }

    async fn describe(&self, secret_id: &str) -> Result<SecretMetadata, StoreError> {
        self.key_for(secret_id)
            .and_then(|key| self.secrets.get(&key).map(|s| s.metadata()))
            .ok_or_else(|| StoreError::NotFound(secret_id.to_string()))
    }
}

#[allow(clippy::cast_precision_loss)]
fn epoch_seconds(date: DateTime<Utc>) -> f64 {
    date.timestamp() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str, value: &str) -> CreateSecret {
        CreateSecret {
            name: name.to_string(),
            value: value.to_string(),
            description: Some("Test secret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_secret() {
        let store = InMemorySecretStore::new();

        let created = store
            .create(create_request("my-secret", "secret-value"))
            .await
            .unwrap();
        assert_eq!(created.name.as_deref(), Some("my-secret"));
        assert!(created.version_id.is_some());

        let value = store.get_value("my-secret").await.unwrap();
        assert_eq!(value.secret_string.as_deref(), Some("secret-value"));
        assert_eq!(value.version_id, created.version_id);
    }

    #[tokio::test]
    async fn test_get_by_arn() {
        let store = InMemorySecretStore::with_location("eu-west-1", "123456789012");
        let created = store.create(create_request("db-pw", "x")).await.unwrap();

        let arn = created.arn.unwrap();
        assert!(arn.starts_with("arn:aws:secretsmanager:eu-west-1:123456789012:secret:db-pw-"));

        let value = store.get_value(&arn).await.unwrap();
        assert_eq!(value.secret_string.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_put_value_rotates_versions() {
        let store = InMemorySecretStore::new();
        let first = store.create(create_request("my-secret", "value-1")).await.unwrap();

        let put = store
            .put_value(PutSecretValue {
                secret_id: "my-secret".to_string(),
                value: "value-2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(put.version_stages, vec![AWSCURRENT.to_string()]);

        let current = store.get_value("my-secret").await.unwrap();
        assert_eq!(current.secret_string.as_deref(), Some("value-2"));

        let metadata = store.describe("my-secret").await.unwrap();
        let first_id = first.version_id.unwrap();
        assert_eq!(
            metadata.version_ids_to_stages.get(&first_id),
            Some(&vec![AWSPREVIOUS.to_string()])
        );
        assert_eq!(
            metadata.version_ids_to_stages.get(&put.version_id.unwrap()),
            Some(&vec![AWSCURRENT.to_string()])
        );
    }

    #[tokio::test]
    async fn test_third_value_drops_oldest_stage() {
        let store = InMemorySecretStore::new();
        store.create(create_request("s", "1")).await.unwrap();
        for value in ["2", "3"] {
            store
                .put_value(PutSecretValue {
                    secret_id: "s".to_string(),
                    value: value.to_string(),
                })
                .await
                .unwrap();
        }

        let metadata = store.describe("s").await.unwrap();
        assert_eq!(metadata.version_ids_to_stages.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_rotation_keeps_two_versions() {
        let store = InMemorySecretStore::new();
        store.create(create_request("s", "0")).await.unwrap();
        for i in 1..=20 {
            store
                .put_value(PutSecretValue {
                    secret_id: "s".to_string(),
                    value: i.to_string(),
                })
                .await
                .unwrap();
        }

        let secret = store.secrets.get("s").unwrap();
        assert_eq!(secret.versions.len(), 2);
        assert_eq!(
            secret.current().map(|v| v.secret_string.as_str()),
            Some("20")
        );
        let previous = secret.previous_version_id.as_ref().unwrap();
        assert_eq!(secret.versions[previous].secret_string, "19");
    }

    #[tokio::test]
    async fn test_duplicate_secret_fails() {
        let store = InMemorySecretStore::new();
        store.create(create_request("my-secret", "a")).await.unwrap();

        let result = store.create(create_request("my-secret", "b")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_secret_fails() {
        let store = InMemorySecretStore::new();

        assert!(matches!(
            store.get_value("nonexistent").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.describe("nonexistent").await,
            Err(StoreError::NotFound(_))
        ));
        let put = store
            .put_value(PutSecretValue {
                secret_id: "nonexistent".to_string(),
                value: "v".to_string(),
            })
            .await;
        assert!(matches!(put, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_respects_max_results() {
        let store = InMemorySecretStore::new();
        for name in ["c", "a", "b"] {
            store.create(create_request(name, "v")).await.unwrap();
        }

        let all = store.list(None).await.unwrap();
        let names: Vec<_> = all.iter().filter_map(|s| s.name.as_deref()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let limited = store.list(Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);

        assert!(matches!(
            store.list(Some(0)).await,
            Err(StoreError::Service { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_description_is_dropped() {
        let store = InMemorySecretStore::new();
        store
            .create(CreateSecret {
                name: "n".to_string(),
                value: "v".to_string(),
                description: Some(String::new()),
            })
            .await
            .unwrap();

        let metadata = store.describe("n").await.unwrap();
        assert_eq!(metadata.description, None);
    }
}
