//! Agent Activity Panel
//!
//! Passive consumer of the sequencer's active-agent reports. Statuses are
//! derived from roster order: entries listed before the active agent count
//! as completed. That assumes the roster order matches the workflow; a
//! script that returns to an earlier agent will show later agents as
//! pending again.

use super::sequencer::SessionStatus;
use crate::roster::{AgentId, AgentRosterEntry};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Completed,
    Active,
    Pending,
}

/// One panel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentActivity {
    pub entry: &'static AgentRosterEntry,
    pub status: AgentStatus,
}

/// Classify every roster entry against the active agent label.
pub fn classify_agents(
    roster: &'static [AgentRosterEntry],
    active_label: Option<&str>,
    status: SessionStatus,
) -> Vec<AgentActivity> {
    let active = active_label.map(AgentId::from_label);
    let active_position = active.and_then(|id| roster.iter().position(|e| e.id == id));

    roster
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let status = if status == SessionStatus::Completed {
                AgentStatus::Completed
            } else if active_position == Some(position) {
                AgentStatus::Active
            } else if active_position.is_some_and(|active| position < active) {
                AgentStatus::Completed
            } else {
                AgentStatus::Pending
            };
            AgentActivity { entry, status }
        })
        .collect()
}

/// Remembers the last agent the sequencer reported.
#[derive(Debug, Clone)]
pub struct AgentActivityPanel {
    roster: &'static [AgentRosterEntry],
    active: Option<String>,
}

impl AgentActivityPanel {
    pub fn new(roster: &'static [AgentRosterEntry]) -> Self {
        Self {
            roster,
            active: None,
        }
    }

    pub fn on_agent_activity_changed(&mut self, label: Option<&str>) {
        self.active = label.map(str::to_string);
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn statuses(&self, status: SessionStatus) -> Vec<AgentActivity> {
        classify_agents(self.roster, self.active(), status)
    }
}

impl Default for AgentActivityPanel {
    fn default() -> Self {
        Self::new(&crate::roster::ROSTER)
    }
}
