//! Existence probe
//!
//! Decides whether a secret exists by describing it. Used by create to refuse
//! duplicates and by describe to shape its response. The probe and whatever
//! follows it are separate remote calls, so the answer can be stale by the
//! time it is acted on.

use tracing::debug;

use crate::store::{SecretMetadata, SecretStore, StoreError};

pub const SECRET_NAME_NULL: &str = "secret name is null";
pub const SECRET_NOT_FOUND: &str = "secret not found";

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    Found(SecretMetadata),
    /// Blank name; no remote call was made
    InvalidName,
    NotFound,
    /// The describe call failed for a reason other than not-found
    Failed(String),
}

impl Probe {
    pub fn found(&self) -> Option<&SecretMetadata> {
        match self {
            Self::Found(metadata) => Some(metadata),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Empty when found, otherwise why the secret is absent
    pub fn error_message(&self) -> String {
        match self {
            Self::Found(_) => String::new(),
            Self::InvalidName => SECRET_NAME_NULL.to_string(),
            Self::NotFound => SECRET_NOT_FOUND.to_string(),
            Self::Failed(message) => message.clone(),
        }
    }
}

/// Describe `name` and classify the result
pub async fn probe(store: &dyn SecretStore, name: &str) -> Probe {
    if name.trim().is_empty() {
        return Probe::InvalidName;
    }

    match store.describe(name).await {
        Ok(metadata) => Probe::Found(metadata),
        Err(StoreError::NotFound(_)) => {
            debug!(name = %name, "probe: secret absent");
            Probe::NotFound
        }
        Err(e) => {
            debug!(name = %name, error = %e, "probe failed");
            Probe::Failed(e.description())
        }
    }
}
