//! secretsgate - HTTP facade over AWS Secrets Manager
//!
//! Wires configuration, the secret store backend and the HTTP router together.
//! The binary in `main.rs` adds argument parsing, logging and the server loop.

pub mod config;
pub mod router;

pub use config::{Config, Overrides, StoreConfig, StoreKind};
pub use router::{build_state, create_router};
