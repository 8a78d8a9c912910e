//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryRoster`, which satisfies both `AgentRegistry` and
//! `ContactLedger` without any external dependencies.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::schema::{AgentRecord, Assignment, ContactRecord};
use crate::storage_traits::*;

#[derive(Debug, Default)]
struct RosterState {
    agents: Vec<AgentRecord>,
    contacts: Vec<ContactRecord>,
}

/// In-memory roster backed by two ordered `Vec`s behind one lock.
///
/// `fail_next_write` makes the next write return `StorageError::Backend`
/// without touching state, to exercise error propagation.
#[derive(Debug, Default)]
pub struct MemoryRoster {
    state: Mutex<RosterState>,
    fail_next_write: AtomicBool,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the roster with an existing pool.
    pub fn with_agents(agents: Vec<AgentRecord>) -> Self {
        let roster = Self::default();
        roster.lock().agents = agents;
        roster
    }

    /// Arrange for the next write call to fail.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_injected_failure(&self) -> StorageResult<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RosterState> {
        // poisoned only by a panicking test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AgentRegistry for MemoryRoster {
    async fn list_agents(&self) -> StorageResult<Vec<AgentRecord>> {
        Ok(self.lock().agents.clone())
    }

    async fn insert_agent(&self, agent: AgentRecord) -> StorageResult<AgentRecord> {
        self.check_injected_failure()?;
        self.lock().agents.push(agent.clone());
        Ok(agent)
    }

    async fn replace_agents(&self, agents: Vec<AgentRecord>) -> StorageResult<()> {
        self.check_injected_failure()?;
        self.lock().agents = agents;
        Ok(())
    }
}

#[async_trait]
impl ContactLedger for MemoryRoster {
    async fn list_contacts(&self) -> StorageResult<Vec<ContactRecord>> {
        Ok(self.lock().contacts.clone())
    }

    async fn replace_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()> {
        self.check_injected_failure()?;
        self.lock().contacts = contacts;
        Ok(())
    }

    async fn append_contacts(&self, contacts: Vec<ContactRecord>) -> StorageResult<()> {
        self.check_injected_failure()?;
        self.lock().contacts.extend(contacts);
        Ok(())
    }

    async fn bulk_reassign(&self, assignments: &[Assignment]) -> StorageResult<()> {
        self.check_injected_failure()?;
        let mut state = self.lock();

        let known_agents: HashSet<&str> = state.agents.iter().map(|a| a.id.as_str()).collect();
        let positions: HashMap<String, usize> = state
            .contacts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.0.clone(), i))
            .collect();

        let mut planned = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let pos = *positions.get(assignment.contact_id.as_str()).ok_or_else(|| {
                StorageError::ContactNotFound {
                    contact_id: assignment.contact_id.0.clone(),
                }
            })?;
            if !known_agents.contains(assignment.agent_id.as_str()) {
                return Err(StorageError::AgentNotFound {
                    agent_id: assignment.agent_id.0.clone(),
                });
            }
            planned.push((pos, assignment.agent_id.clone()));
        }

        for (pos, agent_id) in planned {
            state.contacts[pos].agent_id = Some(agent_id);
        }
        Ok(())
    }
}
