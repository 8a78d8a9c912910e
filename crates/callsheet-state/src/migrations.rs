//! Schema initialization for the roster tables

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::debug;

use crate::error::StateError;

const SCHEMA: &str = r#"
    -- Agent pool
    DEFINE TABLE IF NOT EXISTS agents SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS agent_id ON agents TYPE string;
    DEFINE FIELD IF NOT EXISTS name ON agents TYPE string;
    DEFINE FIELD IF NOT EXISTS ordinal ON agents TYPE int;
    DEFINE FIELD IF NOT EXISTS created_at ON agents TYPE datetime;
    DEFINE INDEX IF NOT EXISTS idx_agent_id ON agents FIELDS agent_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS idx_agent_ordinal ON agents FIELDS ordinal;

    -- Contacts
    DEFINE TABLE IF NOT EXISTS contacts SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS contact_id ON contacts TYPE string;
    DEFINE FIELD IF NOT EXISTS first_name ON contacts TYPE string;
    DEFINE FIELD IF NOT EXISTS phone ON contacts TYPE string;
    DEFINE FIELD IF NOT EXISTS notes ON contacts TYPE string;
    DEFINE FIELD IF NOT EXISTS agent_id ON contacts TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS ordinal ON contacts TYPE int;
    DEFINE INDEX IF NOT EXISTS idx_contact_id ON contacts FIELDS contact_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS idx_contact_ordinal ON contacts FIELDS ordinal;
    DEFINE INDEX IF NOT EXISTS idx_contact_agent ON contacts FIELDS agent_id;
"#;

/// Define the `agents` and `contacts` tables. Safe to run on every connect.
pub(crate) async fn init_schema(db: &Surreal<Any>) -> crate::Result<()> {
    debug!("Initializing roster schema");

    db.query(SCHEMA)
        .await
        .and_then(|response| response.check())
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;

    debug!("Schema initialized successfully");
    Ok(())
}
