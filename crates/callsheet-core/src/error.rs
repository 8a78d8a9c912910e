//! Engine error taxonomy.
//!
//! Every ingestion or rebalance failure maps to exactly one variant, and each
//! variant has a stable reason code for callers that translate errors into
//! responses.

use callsheet_state::StorageError;

use crate::tabular::TabularFormat;

/// Errors produced by ingestion, validation and distribution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unsupported file format {extension:?}: expected csv, xls or xlsx")]
    UnsupportedFormat { extension: String },

    #[error("document has no data rows")]
    EmptyDocument,

    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("no valid rows: every row lacks a first name or phone")]
    NoValidData,

    #[error("cannot assign contacts to an empty agent pool")]
    EmptyAgentPool,

    #[error("no agents available for redistribution")]
    NoAgents,

    #[error("no contacts to redistribute")]
    NoContacts,

    #[error("failed to decode {format} document: {reason}")]
    Decode {
        format: TabularFormat,
        reason: String,
    },

    #[error("invalid agent name: {0:?}")]
    InvalidAgentName(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Stable snake_case reason code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnsupportedFormat { .. } => "unsupported_format",
            EngineError::EmptyDocument => "empty_document",
            EngineError::MissingColumns { .. } => "missing_columns",
            EngineError::NoValidData => "no_valid_data",
            EngineError::EmptyAgentPool => "empty_agent_pool",
            EngineError::NoAgents => "no_agents",
            EngineError::NoContacts => "no_contacts",
            EngineError::Decode { .. } => "decode_error",
            EngineError::InvalidAgentName(_) => "invalid_agent_name",
            EngineError::Storage(_) => "storage_error",
            EngineError::Io(_) => "io_error",
        }
    }

    /// Whether the caller can fix the situation and try again.
    ///
    /// Only an empty pool qualifies: provisioning agents makes the same call
    /// succeed. Nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::EmptyAgentPool | EngineError::NoAgents)
    }

    pub(crate) fn decode(format: TabularFormat, reason: impl std::fmt::Display) -> Self {
        EngineError::Decode {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = EngineError::MissingColumns {
            columns: vec!["FirstName".to_string(), "Phone".to_string()],
        };
        assert_eq!(err.to_string(), "missing required columns: FirstName, Phone");
        assert_eq!(err.code(), "missing_columns");
    }

    #[test]
    fn test_decode_error_keeps_cause() {
        let err = EngineError::decode(TabularFormat::Spreadsheet, "invalid zip header");
        let msg = err.to_string();
        assert!(msg.contains("xlsx"));
        assert!(msg.contains("invalid zip header"));
        assert_eq!(err.code(), "decode_error");
    }

    #[test]
    fn test_only_empty_pool_is_retryable() {
        assert!(EngineError::EmptyAgentPool.is_retryable());
        assert!(EngineError::NoAgents.is_retryable());
        assert!(!EngineError::NoContacts.is_retryable());
        assert!(!EngineError::NoValidData.is_retryable());
        assert!(!EngineError::Storage(StorageError::Backend("down".into())).is_retryable());
    }

    #[test]
    fn test_storage_error_surfaces_unchanged() {
        let err: EngineError = StorageError::Backend("write rejected".into()).into();
        assert_eq!(err.to_string(), "storage error: storage backend failure: write rejected");
    }
}
