//! Test server management

use portpicker::pick_unused_port;
use secretsgate::create_router;
use secretsgate_secretsmanager::{InMemorySecretStore, SecretStore, SecretsState};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{SecretsGateClient, STARTUP_TIMEOUT_SECS};

/// Errors that can occur with the test server
#[derive(Debug, Error)]
pub enum TestError {
    #[error("No available port found")]
    NoPortAvailable,

    #[error("Failed to start server: {0}")]
    StartFailed(#[from] std::io::Error),

    #[error("Server startup timed out")]
    StartupTimeout,
}

/// A secretsgate router served on a local port
pub struct TestServer {
    port: u16,
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by a fresh in-memory store
    pub async fn start() -> Result<Self, TestError> {
        Self::start_with_store(Arc::new(InMemorySecretStore::new())).await
    }

    /// Start a server backed by `store`
    pub async fn start_with_store(store: Arc<dyn SecretStore>) -> Result<Self, TestError> {
        let port = pick_unused_port().ok_or(TestError::NoPortAvailable)?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let app = create_router(Arc::new(SecretsState::new(store)));

        info!(port = port, "Starting secretsgate test server");

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{port}"),
            shutdown: Some(shutdown),
            handle,
        };
        server.wait_ready().await?;
        Ok(server)
    }

    async fn wait_ready(&self) -> Result<(), TestError> {
        let health = format!("{}/health", self.base_url);
        let start = std::time::Instant::now();

        while start.elapsed() < Duration::from_secs(STARTUP_TIMEOUT_SECS) {
            if let Ok(response) = reqwest::get(&health).await {
                if response.status().is_success() {
                    info!(port = self.port, "secretsgate ready");
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Err(TestError::StartupTimeout)
    }

    /// Get the base URL
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Get the port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a client for this server
    pub fn client(&self) -> SecretsGateClient {
        SecretsGateClient::new(self.base_url.clone())
    }

    /// Stop the server and wait for it to finish
    pub async fn stop(mut self) {
        info!("Stopping secretsgate test server");
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.abort();
    }
}
