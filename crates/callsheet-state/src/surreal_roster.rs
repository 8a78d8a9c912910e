//! SurrealDB-backed roster
//!
//! Implements both [`AgentRegistry`] and [`ContactLedger`] over the `agents`
//! and `contacts` tables. Multi-row writes run inside a single
//! `BEGIN/COMMIT TRANSACTION` block so they apply entirely or not at all.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::handle::{connect, CloudConfig, ConnectTarget};
use crate::migrations;
use crate::schema::{
    AgentRecord, Assignment, ContactRecord, DbAgentRow, DbAssignmentRow, DbContactRow,
};
use crate::storage_traits::{AgentRegistry, ContactLedger, StorageResult};

const REPLACE_AGENTS: &str = r#"
    BEGIN TRANSACTION;
    DELETE agents;
    FOR $row IN $rows { CREATE agents CONTENT $row; };
    COMMIT TRANSACTION;
"#;

const REPLACE_CONTACTS: &str = r#"
    BEGIN TRANSACTION;
    DELETE contacts;
    FOR $row IN $rows { CREATE contacts CONTENT $row; };
    COMMIT TRANSACTION;
"#;

const APPEND_CONTACTS: &str = r#"
    BEGIN TRANSACTION;
    FOR $row IN $rows { CREATE contacts CONTENT $row; };
    COMMIT TRANSACTION;
"#;

const REASSIGN_CONTACTS: &str = r#"
    BEGIN TRANSACTION;
    FOR $row IN $rows {
        UPDATE contacts SET agent_id = $row.agent_id WHERE contact_id = $row.contact_id;
    };
    COMMIT TRANSACTION;
"#;

#[derive(Debug, Deserialize)]
struct OrdinalRow {
    ordinal: i64,
}

#[derive(Debug, Deserialize)]
struct AgentIdRow {
    agent_id: String,
}

#[derive(Debug, Deserialize)]
struct ContactIdRow {
    contact_id: String,
}

/// SurrealDB-backed implementation of [`AgentRegistry`] and [`ContactLedger`].
#[derive(Clone)]
pub struct SurrealRoster {
    db: Surreal<Any>,
}

impl SurrealRoster {
    /// Open `target` and make sure the roster tables exist.
    pub async fn open(target: &ConnectTarget) -> crate::Result<Self> {
        let db = connect(target).await?;
        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        Self::open(&ConnectTarget::Memory).await
    }

    /// Connect to an explicit URL (`mem://`, `surrealkv://path`, `ws://host`).
    pub async fn connect(url: &str) -> crate::Result<Self> {
        Self::open(&ConnectTarget::Url(url.to_string())).await
    }

    /// Connect with explicit remote credentials.
    pub async fn connect_cloud(config: CloudConfig) -> crate::Result<Self> {
        Self::open(&ConnectTarget::Cloud(config)).await
    }

    /// Connect to whatever [`ConnectTarget::from_env`] resolves.
    pub async fn from_env() -> crate::Result<Self> {
        Self::open(&ConnectTarget::from_env()).await
    }

    // -- private helpers -----------------------------------------------------

    /// Ordinal one past the current maximum in `table`, or 0 when empty.
    async fn next_ordinal(&self, table: &'static str) -> StorageResult<i64> {
        let mut res = self
            .db
            .query(format!(
                "SELECT ordinal FROM {} ORDER BY ordinal DESC LIMIT 1",
                table
            ))
            .await?;
        let rows: Vec<OrdinalRow> = res.take(0)?;
        Ok(rows.first().map(|r| r.ordinal + 1).unwrap_or(0))
    }

    async fn known_agent_ids(&self) -> StorageResult<HashSet<String>> {
        let mut res = self.db.query("SELECT agent_id FROM agents").await?;
        let rows: Vec<AgentIdRow> = res.take(0)?;
        Ok(rows.into_iter().map(|r| r.agent_id).collect())
    }

    async fn known_contact_ids(&self) -> StorageResult<HashSet<String>> {
        let mut res = self.db.query("SELECT contact_id FROM contacts").await?;
        let rows: Vec<ContactIdRow> = res.take(0)?;
        Ok(rows.into_iter().map(|r| r.contact_id).collect())
    }

    async fn write_contact_rows(&self, sql: &str, rows: Vec<DbContactRow>) -> StorageResult<()> {
        self.db
            .query(sql.to_string())
            .bind(("rows", rows))
            .await?
            .check()?;
        Ok(())
    }
}

#[async_trait]
impl AgentRegistry for SurrealRoster {
    #[instrument(skip(self))]
    async fn list_agents(&self) -> StorageResult<Vec<AgentRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM agents ORDER BY ordinal ASC")
            .await?;
        let rows: Vec<DbAgentRow> = res.take(0)?;
        Ok(rows.into_iter().map(DbAgentRow::into_record).collect())
    }

    #[instrument(skip(self, agent), fields(agent_id = %agent.id))]
    async fn insert_agent(&self, agent: AgentRecord) -> StorageResult<AgentRecord> {
        let ordinal = self.next_ordinal("agents").await?;
        let row = DbAgentRow::from_record(&agent, ordinal);

        let created: Option<DbAgentRow> = self.db.create("agents").content(row).await?;
        let created = created
            .ok_or_else(|| StorageError::Backend("Failed to create agent".to_string()))?;

        debug!("Agent registered at ordinal {}", ordinal);
        Ok(created.into_record())
    }

    #[instrument(skip(self, agents), fields(count = agents.len()))]
    async fn replace_agents(&self, agents: Vec<AgentRecord>) -> StorageResult<()> {
        let rows: Vec<DbAgentRow> = agents
            .iter()
            .enumerate()
            .map(|(i, a)| DbAgentRow::from_record(a, i as i64))
            .collect();

        self.db
            .query(REPLACE_AGENTS)
            .bind(("rows", rows))
            .await?
            .check()?;

        info!("Agent pool replaced ({} agents)", agents.len());
        Ok(())
    }
}

#[async_trait]
impl ContactLedger for SurrealRoster {
    #[instrument(skip(self))]
    async fn list_contacts(&self) -> StorageResult<Vec<ContactRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM contacts ORDER BY ordinal ASC")
            .await?;
        let rows: Vec<DbContactRow> = res.take(0)?;
        Ok(rows.into_iter().map(DbContactRow::into_record).collect())
    }

    #[instrument(skip(self, contacts), fields(count = contacts.len()))]
    async fn replace_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()> {
        let rows = contacts
            .iter()
            .enumerate()
            .map(|(i, c)| DbContactRow::from_record(c, i as i64))
            .collect();
        self.write_contact_rows(REPLACE_CONTACTS, rows).await
    }

    #[instrument(skip(self, contacts), fields(count = contacts.len()))]
    async fn append_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()> {
        let start = self.next_ordinal("contacts").await?;
        let rows = contacts
            .iter()
            .enumerate()
            .map(|(i, c)| DbContactRow::from_record(c, start + i as i64))
            .collect();
        self.write_contact_rows(APPEND_CONTACTS, rows).await
    }

    #[instrument(skip(self, assignments), fields(count = assignments.len()))]
    async fn bulk_reassign(&self, assignments: &[Assignment]) -> StorageResult<()> {
        let contacts = self.known_contact_ids().await?;
        let agents = self.known_agent_ids().await?;

        for assignment in assignments {
            if !contacts.contains(assignment.contact_id.as_str()) {
                return Err(StorageError::ContactNotFound {
                    contact_id: assignment.contact_id.0.clone(),
                });
            }
            if !agents.contains(assignment.agent_id.as_str()) {
                return Err(StorageError::AgentNotFound {
                    agent_id: assignment.agent_id.0.clone(),
                });
            }
        }

        let rows: Vec<DbAssignmentRow> = assignments.iter().map(DbAssignmentRow::from).collect();
        self.db
            .query(REASSIGN_CONTACTS)
            .bind(("rows", rows))
            .await?
            .check()?;

        debug!("Reassigned {} contacts", assignments.len());
        Ok(())
    }
}
