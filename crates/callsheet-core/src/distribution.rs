//! Contact distribution.
//!
//! Two pure functions over `(contacts, agents)`:
//!
//! - [`assign`]: fresh round-robin placement. Contact `i` goes to
//!   `agents[i % P]`.
//! - [`rebalance`]: balanced repartition of an existing set. The first
//!   `C % P` agents take `C / P + 1` contacts, the rest take `C / P`, and
//!   contacts are consumed in their stored order.
//!
//! Neither touches storage; the caller applies the result as one batch.

use callsheet_state::{AgentId, AgentRecord, Assignment, ContactRecord};
use serde::Serialize;

use crate::error::{EngineError, Result};

/// Bind every contact to `agents[i % agents.len()]`.
pub fn assign(contacts: Vec<ContactRecord>, agents: &[AgentRecord]) -> Result<Vec<ContactRecord>> {
    if agents.is_empty() {
        return Err(EngineError::EmptyAgentPool);
    }

    Ok(contacts
        .into_iter()
        .enumerate()
        .map(|(i, contact)| contact.assigned_to(&agents[i % agents.len()].id))
        .collect())
}

/// How many contacts one agent holds after a rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentQuota {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub count: usize,
}

/// Result of [`rebalance`]: the full reassignment plus the numbers behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalancePlan {
    /// One entry per contact, in contact order
    pub assignments: Vec<Assignment>,
    /// One entry per agent, in pool order
    pub quotas: Vec<AgentQuota>,
    pub total_contacts: usize,
    pub total_agents: usize,
    /// `total_contacts / total_agents`
    pub base: usize,
    /// `total_contacts % total_agents`; this many agents get `base + 1`
    pub remainder: usize,
    /// Contacts whose agent differs from before
    pub moved: usize,
}

/// Per-agent counts for `total` items over `agents` slots, larger shares first.
pub fn quota_sizes(total: usize, agents: usize) -> Vec<usize> {
    if agents == 0 {
        return Vec::new();
    }
    let base = total / agents;
    let remainder = total % agents;
    (0..agents)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Repartition `contacts` over `agents` in balanced, order-preserving blocks.
pub fn rebalance(contacts: &[ContactRecord], agents: &[AgentRecord]) -> Result<RebalancePlan> {
    if agents.is_empty() {
        return Err(EngineError::NoAgents);
    }
    if contacts.is_empty() {
        return Err(EngineError::NoContacts);
    }

    let total_contacts = contacts.len();
    let total_agents = agents.len();
    let sizes = quota_sizes(total_contacts, total_agents);

    let mut assignments = Vec::with_capacity(total_contacts);
    let mut moved = 0;
    let mut remaining = contacts.iter();
    for (agent, &size) in agents.iter().zip(&sizes) {
        for contact in remaining.by_ref().take(size) {
            if contact.agent_id.as_ref() != Some(&agent.id) {
                moved += 1;
            }
            assignments.push(Assignment {
                contact_id: contact.id.clone(),
                agent_id: agent.id.clone(),
            });
        }
    }

    let quotas = agents
        .iter()
        .zip(&sizes)
        .map(|(agent, &count)| AgentQuota {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            count,
        })
        .collect();

    Ok(RebalancePlan {
        assignments,
        quotas,
        total_contacts,
        total_agents,
        base: total_contacts / total_agents,
        remainder: total_contacts % total_agents,
        moved,
    })
}
