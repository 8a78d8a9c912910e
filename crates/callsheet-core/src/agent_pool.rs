//! Agent pool floor enforcement.
//!
//! Before a batch is distributed the pool must hold at least `min_agents`
//! agents. An undersized pool is not topped up: it is discarded and replaced
//! wholesale by synthetic agents named `"{prefix} 1"..="{prefix} N"`. Manual
//! agents already at or above the floor are never touched.

use callsheet_state::AgentRecord;

/// Default pool floor.
pub const DEFAULT_MIN_AGENTS: usize = 5;
/// Default display-name prefix for synthetic agents.
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "Agent";

/// What `ensure_pool` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolDecision {
    /// The pool met the floor and is used as is.
    Keep(Vec<AgentRecord>),
    /// The pool was below the floor. `agents` must be persisted (replacing
    /// every existing agent) before distribution runs against them.
    Replace {
        agents: Vec<AgentRecord>,
        discarded: Vec<AgentRecord>,
    },
}

impl PoolDecision {
    /// The agents to distribute over.
    pub fn agents(&self) -> &[AgentRecord] {
        match self {
            PoolDecision::Keep(agents) => agents,
            PoolDecision::Replace { agents, .. } => agents,
        }
    }

    pub fn into_agents(self) -> Vec<AgentRecord> {
        match self {
            PoolDecision::Keep(agents) => agents,
            PoolDecision::Replace { agents, .. } => agents,
        }
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self, PoolDecision::Replace { .. })
    }
}

/// Decide the pool for the next distribution.
///
/// `min_agents` is clamped to at least 1.
pub fn ensure_pool(current: Vec<AgentRecord>, min_agents: usize, prefix: &str) -> PoolDecision {
    let floor = min_agents.max(1);
    if current.len() >= floor {
        return PoolDecision::Keep(current);
    }

    PoolDecision::Replace {
        agents: placeholder_agents(floor, prefix),
        discarded: current,
    }
}

/// `count` fresh synthetic agents numbered from 1.
pub fn placeholder_agents(count: usize, prefix: &str) -> Vec<AgentRecord> {
    (1..=count)
        .map(|n| AgentRecord::placeholder(prefix, n))
        .collect()
}
