//! # Warehouse Error Types Module
//!
//! This module defines the error type returned by every warehouse client
//! operation. Transport and status failures never escape the client as
//! anything other than a `WarehouseError`.

use thiserror::Error;

/// Failure of a call to the warehouse service
#[derive(Debug, Clone, Error)]
pub enum WarehouseError {
    /// The service answered 404 for the requested resource
    #[error("Not found: {0}")]
    NotFound(String),
    /// The service answered with a non-success status
    #[error("Warehouse service returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Connection, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl WarehouseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WarehouseError::NotFound(_))
    }
}

impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WarehouseError::Decode(err.to_string())
        } else {
            WarehouseError::Transport(err.to_string())
        }
    }
}
