//! Error types for the request store

use matching_core::{RelationshipId, RelationshipStatus, RequestId, UserId};
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors
#[derive(Error, Debug)]
pub enum Error {
    /// Matching core error (validation, config)
    #[error("Matching error: {0}")]
    Core(#[from] matching_core::Error),

    /// Document failed boundary validation
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Request not found
    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    /// Owner already has an active request
    #[error("User {0} already has an active request")]
    DuplicateActiveRequest(UserId),

    /// A live relationship already links the two requests
    #[error("Relationship already exists: {0}")]
    DuplicateRelationship(RelationshipId),

    /// Requests do not form a direct match
    #[error("Requests {0} and {1} do not match")]
    NotMatching(RequestId, RequestId),

    /// Status change not allowed from the current status
    #[error("Invalid transition from {from}: {reason}")]
    InvalidTransition {
        /// Current status
        from: RelationshipStatus,
        /// What was attempted
        reason: String,
    },

    /// Caller is not the party allowed to act
    #[error("User {0} may not act on relationship {1}")]
    NotAuthorized(UserId, RelationshipId),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
