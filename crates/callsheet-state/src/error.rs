//! Error types for callsheet-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

/// Errors returned by the storage traits.
///
/// A bulk write that fails with any of these leaves the store unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend rejected or failed the operation
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A reassignment referenced a contact that is not stored
    #[error("contact not found: {contact_id}")]
    ContactNotFound { contact_id: String },

    /// A reassignment referenced an agent that is not stored
    #[error("agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    /// A row could not be converted to or from its stored form
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
