//! Schema definitions for Callsheet SurrealDB tables
//!
//! Tables:
//! - agents: The agent pool, in registration order
//! - contacts: Normalized contact rows and the agent each is bound to
//!
//! The public records carry no storage ordinal. Rows written to SurrealDB are
//! wrapped in `DbAgentRow` / `DbContactRow`, which add the `ordinal` column
//! that keeps listing order stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime as SurrealDatetime;
use uuid::Uuid;

/// Unique identifier of an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Generate a new random AgentId
    pub fn new() -> Self {
        AgentId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a contact row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub String);

impl ContactId {
    /// Generate a new random ContactId
    pub fn new() -> Self {
        ContactId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A worker that owns a subset of contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    /// Display name
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl AgentRecord {
    /// Create a new agent with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Create the synthetic agent `"{prefix} {number}"`
    pub fn placeholder(prefix: &str, number: usize) -> Self {
        Self::new(format!("{} {}", prefix, number))
    }
}

/// One person to call.
///
/// `agent_id` is `None` until the row has been distributed. Reassignment only
/// ever touches `agent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: ContactId,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub agent_id: Option<AgentId>,
}

impl ContactRecord {
    /// Create an unassigned contact with a fresh id
    pub fn new(
        first_name: impl Into<String>,
        phone: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: ContactId::new(),
            first_name: first_name.into(),
            phone: phone.into(),
            notes: notes.into(),
            agent_id: None,
        }
    }

    /// Return a copy bound to `agent`
    pub fn assigned_to(mut self, agent: &AgentId) -> Self {
        self.agent_id = Some(agent.clone());
        self
    }
}

/// A single contact → agent binding in a bulk reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub contact_id: ContactId,
    pub agent_id: AgentId,
}

// ---------------------------------------------------------------------------
// Stored rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbAgentRow {
    pub agent_id: String,
    pub name: String,
    pub ordinal: i64,
    pub created_at: SurrealDatetime,
}

impl DbAgentRow {
    pub(crate) fn from_record(record: &AgentRecord, ordinal: i64) -> Self {
        Self {
            agent_id: record.id.0.clone(),
            name: record.name.clone(),
            ordinal,
            created_at: SurrealDatetime::from(record.created_at),
        }
    }

    pub(crate) fn into_record(self) -> AgentRecord {
        AgentRecord {
            id: AgentId(self.agent_id),
            name: self.name,
            created_at: DateTime::<Utc>::from(self.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbContactRow {
    pub contact_id: String,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub agent_id: Option<String>,
    pub ordinal: i64,
}

impl DbContactRow {
    pub(crate) fn from_record(record: &ContactRecord, ordinal: i64) -> Self {
        Self {
            contact_id: record.id.0.clone(),
            first_name: record.first_name.clone(),
            phone: record.phone.clone(),
            notes: record.notes.clone(),
            agent_id: record.agent_id.as_ref().map(|a| a.0.clone()),
            ordinal,
        }
    }

    pub(crate) fn into_record(self) -> ContactRecord {
        ContactRecord {
            id: ContactId(self.contact_id),
            first_name: self.first_name,
            phone: self.phone,
            notes: self.notes,
            agent_id: self.agent_id.map(AgentId),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DbAssignmentRow {
    pub contact_id: String,
    pub agent_id: String,
}

impl From<&Assignment> for DbAssignmentRow {
    fn from(assignment: &Assignment) -> Self {
        Self {
            contact_id: assignment.contact_id.0.clone(),
            agent_id: assignment.agent_id.0.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name() {
        let agent = AgentRecord::placeholder("Agent", 3);
        assert_eq!(agent.name, "Agent 3");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
        assert_ne!(ContactId::new(), ContactId::new());
    }

    #[test]
    fn test_contact_row_preserves_fields() {
        let agent = AgentId::new();
        let contact = ContactRecord::new("Ann", "555-1", "call after 5").assigned_to(&agent);
        let row = DbContactRow::from_record(&contact, 7);
        assert_eq!(row.ordinal, 7);
        assert_eq!(row.agent_id.as_deref(), Some(agent.as_str()));
        assert_eq!(row.into_record(), contact);
    }

    #[test]
    fn test_unassigned_contact_serializes_null_agent() {
        let contact = ContactRecord::new("Bob", "555-3", "");
        let json = serde_json::to_string(&contact).expect("serialize");
        assert!(json.contains("\"agent_id\":null"));
    }
}
