//! Distribution batches and upload digests.
//!
//! A batch is the set of contacts produced by one upload together with the
//! pool snapshot they were assigned over. It lives only for the duration of
//! the upload; the digest ties its log lines together.

use std::collections::HashMap;
use std::io::Read;

use callsheet_state::{AgentId, AgentRecord, ContactRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// A contact together with the display name of the agent it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributedContact {
    #[serde(flatten)]
    pub contact: ContactRecord,
    /// `None` if unassigned or bound to an agent no longer in the pool
    pub agent_name: Option<String>,
}

/// Join contacts with the agent names in `agents`.
pub fn join_agents(contacts: Vec<ContactRecord>, agents: &[AgentRecord]) -> Vec<DistributedContact> {
    let names: HashMap<&AgentId, &str> = agents.iter().map(|a| (&a.id, a.name.as_str())).collect();
    contacts
        .into_iter()
        .map(|contact| {
            let agent_name = contact
                .agent_id
                .as_ref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
            DistributedContact {
                contact,
                agent_name,
            }
        })
        .collect()
}

/// One upload's assigned contacts and the pool they were assigned over.
#[derive(Debug, Clone)]
pub struct DistributionBatch {
    /// SHA-256 hex of the uploaded bytes
    pub digest: String,
    pub source_name: String,
    pub contacts: Vec<ContactRecord>,
    pub agents: Vec<AgentRecord>,
}

impl DistributionBatch {
    /// Short form of the digest (first 12 hex chars).
    pub fn short_digest(&self) -> &str {
        &self.digest[..12.min(self.digest.len())]
    }

    /// Every (contact, agent) pair of the batch.
    pub fn pairs(&self) -> Vec<DistributedContact> {
        join_agents(self.contacts.clone(), &self.agents)
    }
}

/// SHA-256 hex of a complete payload.
pub fn digest_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reader adapter that hashes everything read through it.
pub struct DigestReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> DigestReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Hex digest of the bytes read so far.
    pub fn hex_digest(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
