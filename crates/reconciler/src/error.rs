//! Error types for reconciler operations.

use database::DatabaseError;
use thiserror::Error;
use wb_api::WbError;

/// Errors that can occur during reconciliation and reply handling.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    /// Store operation failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] WbError),
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The front-end transport rejected the notification.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
