//! Test utilities for secretsgate
//!
//! Runs the full secretsgate router in-process on a free port and provides a
//! typed HTTP client for it:
//!
//! ```rust,no_run
//! use secretsgate_test::TestServer;
//!
//! #[tokio::test]
//! async fn test_create() {
//!     let server = TestServer::start().await.unwrap();
//!     let client = server.client();
//!
//!     let reply = client.create_secret("db-pw", "s3cr3t", None).await.unwrap();
//!     assert!(reply.status.is_success());
//! }
//! ```

pub mod client;
pub mod server;

pub use client::{ClientError, Reply, SecretsGateClient};
pub use server::{TestError, TestServer};

/// Timeout for waiting on the server
pub const STARTUP_TIMEOUT_SECS: u64 = 10;
