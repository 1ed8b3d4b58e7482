//! Agent Marker Inserter
//!
//! Emits an introduction banner before the first turn of every contiguous
//! run of turns owned by the same agent. Turns without an agent label do
//! not break a run.

use crate::roster::{self, AgentId, AgentRosterEntry};
use crate::script::Turn;

/// Introduction shown before turn `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentBanner {
    pub index: usize,
    /// Label as written in the script
    pub label: String,
    pub agent: AgentId,
    /// Roster metadata; the placeholder entry for unknown labels
    pub entry: &'static AgentRosterEntry,
}

impl AgentBanner {
    pub fn new(index: usize, label: &str) -> Self {
        let agent = AgentId::from_label(label);
        Self {
            index,
            label: label.to_string(),
            agent,
            entry: agent.entry(),
        }
    }

    /// Name to display: the roster name, or the script label for agents
    /// the roster does not know.
    pub fn display_name(&self) -> &str {
        if self.agent.is_known() {
            self.entry.name
        } else {
            &self.label
        }
    }

    pub fn description(&self) -> &'static str {
        self.entry.description
    }

    pub fn reasoning(&self) -> &'static str {
        self.entry.reasoning
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerInserter {
    last_shown: Option<String>,
}

impl MarkerInserter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Banner to show before `turn`, if its agent differs from the last
    /// agent that was introduced. Label spellings of one roster agent count
    /// as the same agent.
    pub fn banner_for(&mut self, index: usize, turn: &Turn) -> Option<AgentBanner> {
        let label = turn.agent_label()?;
        if self
            .last_shown
            .as_deref()
            .is_some_and(|last| roster::same_agent(last, label))
        {
            return None;
        }
        self.last_shown = Some(label.to_string());
        Some(AgentBanner::new(index, label))
    }

    pub fn last_shown(&self) -> Option<&str> {
        self.last_shown.as_deref()
    }

    pub fn reset(&mut self) {
        self.last_shown = None;
    }
}

/// Turn indices that receive a banner when `turns` plays through.
pub fn banner_indices(turns: &[Turn]) -> Vec<usize> {
    let mut inserter = MarkerInserter::new();
    turns
        .iter()
        .enumerate()
        .filter_map(|(index, turn)| inserter.banner_for(index, turn).map(|b| b.index))
        .collect()
}
