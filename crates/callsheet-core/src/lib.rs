//! Callsheet Core Library
//!
//! Turns uploaded contact spreadsheets into agent work queues: decode a
//! csv/xls/xlsx file, check its columns, normalize rows into contacts, make
//! sure a large enough agent pool exists, and hand contacts out round-robin.
//! A separate rebalance path evens out an existing assignment.
//!
//! Storage lives behind the `callsheet_state` traits; everything here except
//! [`DistributionService`] is a pure function.

pub mod agent_pool;
pub mod batch;
pub mod config;
pub mod distribution;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod schema;
pub mod service;
pub mod tabular;
pub mod telemetry;

pub use agent_pool::{
    ensure_pool, placeholder_agents, PoolDecision, DEFAULT_MIN_AGENTS,
    DEFAULT_PLACEHOLDER_PREFIX,
};

pub use batch::{digest_bytes, join_agents, DigestReader, DistributedContact, DistributionBatch};

pub use config::{ConfigError, EngineConfig, UploadMode};

pub use distribution::{assign, quota_sizes, rebalance, AgentQuota, RebalancePlan};

pub use error::{EngineError, Result};

pub use metrics::METRICS;

pub use normalize::{normalize, normalize_row, Normalized, Normalizer};

pub use obs::{
    batch_span, emit_operation_failed, emit_pool_provisioned, emit_rebalance_completed,
    emit_upload_completed, emit_upload_started,
};

pub use schema::{validate_headers, FIRST_NAME_COLUMN, NOTES_COLUMN, PHONE_COLUMN};

pub use service::{DistributionService, RebalanceReport, UploadOutcome};

pub use tabular::{decode, open, Row, RowStream, Table, TabularFormat};

pub use telemetry::init_tracing;

pub use callsheet_state::{
    AgentId, AgentRecord, Assignment, ContactId, ContactRecord, MemoryRoster, RosterStore,
    StorageError, SurrealRoster,
};

/// Callsheet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
