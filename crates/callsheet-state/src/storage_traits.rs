//! Storage trait definitions for Callsheet
//!
//! These traits define the narrow interface the distribution engine uses:
//! - `AgentRegistry`: the ordered agent pool
//! - `ContactLedger`: the ordered contact set and its agent bindings
//!
//! All traits are async and backend-agnostic. An in-memory fake is provided
//! for testing via the `fakes` module.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::schema::{AgentRecord, Assignment, ContactRecord};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// The agent pool.
///
/// Guarantees:
/// - `list_agents` returns agents in registration order.
/// - `replace_agents` is all-or-nothing: afterwards the pool is exactly the
///   given set, in the given order, or the call failed and nothing changed.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// All agents, in registration order.
    async fn list_agents(&self) -> StorageResult<Vec<AgentRecord>>;

    /// Register one agent at the end of the pool order.
    async fn insert_agent(&self, agent: AgentRecord) -> StorageResult<AgentRecord>;

    /// Replace the whole pool with `agents`.
    async fn replace_agents(&self, agents: Vec<AgentRecord>) -> StorageResult<()>;
}

/// The contact set.
///
/// Guarantees:
/// - `list_contacts` returns contacts in insertion order.
/// - Every write is a single batch: it either applies entirely or not at all.
/// - `bulk_reassign` changes only `agent_id`; it fails with
///   `ContactNotFound` / `AgentNotFound` before writing anything if any id in
///   the batch is unknown.
#[async_trait]
pub trait ContactLedger: Send + Sync {
    /// All contacts, in insertion order.
    async fn list_contacts(&self) -> StorageResult<Vec<ContactRecord>>;

    /// Replace the whole contact set with `contacts`.
    async fn replace_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()>;

    /// Append `contacts` after the existing ones.
    async fn append_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()>;

    /// Rebind each listed contact to its new agent.
    async fn bulk_reassign(&self, assignments: &[Assignment]) -> StorageResult<()>;
}

/// A backend that stores both the agent pool and the contact set.
pub trait RosterStore: AgentRegistry + ContactLedger {}

impl<T: AgentRegistry + ContactLedger> RosterStore for T {}
