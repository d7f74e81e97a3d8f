//! Core types for secretsgate
//!
//! This crate provides the error taxonomy and request identifiers used by
//! every secretsgate service crate.

pub mod error;
pub mod request_id;

pub use error::{ApiError, ErrorCode};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
