//! The distribution service: decode → validate → normalize → pool → assign
//! → persist, and the rebalance path over stored data.
//!
//! Pipeline stages are pure functions from the sibling modules. The service
//! adds the storage round trips and serializes every read-compute-write
//! sequence behind one async mutex, so two uploads (or an upload and a
//! rebalance) never interleave their pool checks and writes.

use std::io::Read;
use std::sync::Arc;

use callsheet_state::{AgentRecord, AgentRegistry, ContactLedger, RosterStore};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{instrument, Instrument};

use crate::agent_pool::{ensure_pool, PoolDecision};
use crate::batch::{join_agents, DigestReader, DistributedContact, DistributionBatch};
use crate::config::{EngineConfig, UploadMode};
use crate::distribution::{assign, rebalance, AgentQuota};
use crate::error::{EngineError, Result};
use crate::metrics::METRICS;
use crate::normalize::{Normalized, Normalizer};
use crate::obs;
use crate::schema::validate_headers;
use crate::tabular::{self, TabularFormat};

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    /// SHA-256 hex of the uploaded bytes
    pub batch_digest: String,
    pub source_name: String,
    pub format: TabularFormat,
    /// The persisted batch, each contact with its agent's name
    pub contacts: Vec<DistributedContact>,
    /// Pool the batch was assigned over
    pub agents: Vec<AgentRecord>,
    /// Rows skipped for a blank first name or phone
    pub dropped_rows: usize,
    /// Whether the stored pool was below the floor and got replaced
    pub pool_replaced: bool,
}

/// Result of a successful rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebalanceReport {
    pub total_contacts: usize,
    pub total_agents: usize,
    pub base: usize,
    pub remainder: usize,
    pub moved: usize,
    pub quotas: Vec<AgentQuota>,
}

impl RebalanceReport {
    pub fn summary(&self) -> String {
        format!(
            "Redistributed {} contacts across {} agents ({} each, {} with one extra, {} moved)",
            self.total_contacts, self.total_agents, self.base, self.remainder, self.moved
        )
    }
}

/// A fully read upload, before any storage access.
struct DecodedUpload {
    digest: String,
    format: TabularFormat,
    normalized: Normalized,
}

/// Ingestion and distribution over a [`RosterStore`].
pub struct DistributionService {
    store: Arc<dyn RosterStore>,
    config: EngineConfig,
    write_gate: Mutex<()>,
}

impl DistributionService {
    pub fn new(store: Arc<dyn RosterStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            write_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest a complete in-memory file.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        self.upload_reader(file_name, bytes).await
    }

    /// Ingest a file from a reader.
    ///
    /// Delimited text is decoded as it streams; spreadsheets are buffered.
    /// Nothing is written unless the whole file decodes, has the required
    /// columns and yields at least one contact.
    pub async fn upload_reader<R>(&self, file_name: &str, source: R) -> Result<UploadOutcome>
    where
        R: Read + Send,
    {
        let span = obs::batch_span(file_name);
        let result = async move {
            obs::emit_upload_started(file_name);
            let decoded = read_upload(file_name, source)?;
            tracing::Span::current().record("batch", &decoded.digest[..12]);
            self.distribute(file_name, decoded).await
        }
        .instrument(span)
        .await;

        if let Err(err) = &result {
            obs::emit_operation_failed("upload", err.code(), err);
        }
        result
    }

    async fn distribute(&self, file_name: &str, decoded: DecodedUpload) -> Result<UploadOutcome> {
        let _gate = self.write_gate.lock().await;

        let current = self.store.list_agents().await?;
        let decision = ensure_pool(
            current,
            self.config.min_agents,
            &self.config.placeholder_prefix,
        );
        let pool_replaced = decision.is_replacement();
        if let PoolDecision::Replace { agents, discarded } = &decision {
            self.store.replace_agents(agents.clone()).await?;
            METRICS.add_placeholder_agents(agents.len());
            obs::emit_pool_provisioned(discarded.len(), agents.len());
        }
        let agents = decision.into_agents();

        let contacts = assign(decoded.normalized.contacts, &agents)?;
        match self.config.upload_mode {
            UploadMode::Replace => self.store.replace_contacts(contacts.clone()).await?,
            UploadMode::Append => self.store.append_contacts(contacts.clone()).await?,
        }

        let batch = DistributionBatch {
            digest: decoded.digest,
            source_name: file_name.to_string(),
            contacts,
            agents,
        };
        let dropped_rows = decoded.normalized.dropped;
        METRICS.record_upload(batch.contacts.len(), dropped_rows);
        obs::emit_upload_completed(
            batch.short_digest(),
            batch.contacts.len(),
            batch.agents.len(),
            dropped_rows,
        );

        Ok(UploadOutcome {
            contacts: batch.pairs(),
            batch_digest: batch.digest,
            source_name: batch.source_name,
            format: decoded.format,
            agents: batch.agents,
            dropped_rows,
            pool_replaced,
        })
    }

    /// Register one agent at the end of the pool.
    #[instrument(skip(self))]
    pub async fn add_agent(&self, name: &str) -> Result<AgentRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidAgentName(name.to_string()));
        }
        let _gate = self.write_gate.lock().await;
        let agent = self.store.insert_agent(AgentRecord::new(name)).await?;
        tracing::info!(event = "agent.added", agent_id = %agent.id, name = %agent.name);
        Ok(agent)
    }

    /// The pool, in registration order.
    pub async fn agents(&self) -> Result<Vec<AgentRecord>> {
        Ok(self.store.list_agents().await?)
    }

    /// Every stored contact with its agent's name.
    pub async fn distributed_contacts(&self) -> Result<Vec<DistributedContact>> {
        let contacts = self.store.list_contacts().await?;
        if contacts.is_empty() {
            return Err(EngineError::NoContacts);
        }
        let agents = self.store.list_agents().await?;
        Ok(join_agents(contacts, &agents))
    }

    /// Evenly repartition all stored contacts over the current pool.
    ///
    /// The pool floor is not applied here.
    #[instrument(skip(self))]
    pub async fn rebalance(&self) -> Result<RebalanceReport> {
        let result = self.rebalance_locked().await;
        if let Err(err) = &result {
            obs::emit_operation_failed("rebalance", err.code(), err);
        }
        result
    }

    async fn rebalance_locked(&self) -> Result<RebalanceReport> {
        let _gate = self.write_gate.lock().await;

        let agents = self.store.list_agents().await?;
        let contacts = self.store.list_contacts().await?;
        let plan = rebalance(&contacts, &agents)?;
        self.store.bulk_reassign(&plan.assignments).await?;

        METRICS.inc_rebalances();
        obs::emit_rebalance_completed(
            plan.total_contacts,
            plan.total_agents,
            plan.base,
            plan.moved,
        );

        Ok(RebalanceReport {
            total_contacts: plan.total_contacts,
            total_agents: plan.total_agents,
            base: plan.base,
            remainder: plan.remainder,
            moved: plan.moved,
            quotas: plan.quotas,
        })
    }
}

fn read_upload<R: Read>(file_name: &str, source: R) -> Result<DecodedUpload> {
    let mut reader = DigestReader::new(source);

    let (format, normalized) = {
        let mut rows = tabular::open(file_name, &mut reader)?;
        validate_headers(rows.headers())?;
        let format = rows.format();
        let mut normalizer = Normalizer::new();
        for row in &mut rows {
            normalizer.push(&row?);
        }
        (format, normalizer.finish())
    };

    // digest covers the whole payload, including anything after the last row
    std::io::copy(&mut reader, &mut std::io::sink())?;
    let normalized = normalized.require_contacts()?;

    Ok(DecodedUpload {
        digest: reader.hex_digest(),
        format,
        normalized,
    })
}
