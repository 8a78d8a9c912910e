//! Callsheet-State: SurrealDB Backend for Callsheet
//!
//! This crate provides the persistence layer for the contact distribution
//! engine. It owns every read and write of the agent pool and the contact
//! ledger, so the engine above it can stay a set of pure functions.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: ordered reads and all-or-nothing bulk writes.
//!
//! ## Key Components
//!
//! - `AgentRegistry` / `ContactLedger`: backend-agnostic storage traits
//! - `MemoryRoster`: in-memory fake satisfying both traits (tests)
//! - `SurrealRoster`: SurrealDB implementation (mem, surrealkv or remote)

mod error;
pub mod fakes;
mod handle;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_roster;

pub use error::{StateError, StorageError};
pub use fakes::MemoryRoster;
pub use handle::{CloudConfig, ConnectTarget};
pub use schema::{AgentId, AgentRecord, Assignment, ContactId, ContactRecord};
pub use storage_traits::{AgentRegistry, ContactLedger, RosterStore, StorageResult};
pub use surreal_roster::SurrealRoster;

/// Result type for callsheet-state operations
pub type Result<T> = std::result::Result<T, StateError>;
