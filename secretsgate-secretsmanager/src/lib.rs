//! Secrets Manager facade for secretsgate
//!
//! Exposes list, create, get-value, update-value and describe over HTTP and
//! forwards each one to a [`SecretStore`]:
//! - [`AwsSecretStore`] talks to AWS Secrets Manager through the SDK
//! - [`InMemorySecretStore`] keeps secrets in process for local runs and tests

mod aws;
pub mod handlers;
mod memory;
pub mod probe;
mod store;

#[cfg(test)]
mod fake;

pub use aws::{AwsSecretStore, AwsStoreOptions};
pub use handlers::{router, SecretsState};
pub use memory::InMemorySecretStore;
pub use probe::{probe, Probe};
pub use store::{
    CreateSecret, CreateSecretOutput, PutSecretValue, PutSecretValueOutput, SecretMetadata,
    SecretStore, SecretSummary, SecretValue, StoreError,
};
