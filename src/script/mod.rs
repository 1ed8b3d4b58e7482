//! Scenario Scripts
//!
//! A script is a finite, ordered, immutable list of dialogue turns. Scripts
//! come from the built-in scenario set or from JSON files:
//!
//! ```json
//! {
//!   "id": "lost-card",
//!   "title": "Lost card",
//!   "turns": [
//!     { "speaker": "customer", "text": "I lost my card.", "delay_ms": 400 },
//!     { "speaker": "agent", "agent": "Intake Agent", "text": "Let's block it.", "delay_ms": 600 }
//!   ]
//! }
//! ```

mod library;
pub mod scenarios;

pub use library::ScenarioLibrary;

use crate::errors::ScriptError;
use crate::roster::AgentId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Who is speaking in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The bank customer (or demo user)
    #[serde(alias = "user")]
    Customer,
    /// One of the simulated agents
    Agent,
    /// Closing metrics card, rendered instead of a chat bubble
    Summary,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Customer => write!(f, "customer"),
            Speaker::Agent => write!(f, "agent"),
            Speaker::Summary => write!(f, "summary"),
        }
    }
}

/// One figure on the summary card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Structured metrics block carried by summary turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub title: String,
    #[serde(default)]
    pub metrics: Vec<SummaryMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl SummaryPayload {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            metrics: Vec::new(),
            outcome: None,
        }
    }

    pub fn metric(mut self, label: &str, value: &str) -> Self {
        self.metrics.push(SummaryMetric {
            label: label.to_string(),
            value: value.to_string(),
            detail: None,
        });
        self
    }

    pub fn outcome(mut self, outcome: &str) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }
}

/// One scripted utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    #[serde(default)]
    pub text: String,
    /// Owning agent label; only meaningful for agent turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Wait before the typing animation starts, counted from the moment
    /// the turn becomes current
    #[serde(rename = "delay_ms", with = "duration_ms", default)]
    pub initial_delay: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryPayload>,
}

impl Turn {
    pub fn customer(text: &str, delay_ms: u64) -> Self {
        Self {
            speaker: Speaker::Customer,
            text: text.to_string(),
            agent: None,
            initial_delay: Duration::from_millis(delay_ms),
            summary: None,
        }
    }

    pub fn agent(label: &str, text: &str, delay_ms: u64) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.to_string(),
            agent: Some(label.to_string()),
            initial_delay: Duration::from_millis(delay_ms),
            summary: None,
        }
    }

    pub fn summary(payload: SummaryPayload, delay_ms: u64) -> Self {
        Self {
            speaker: Speaker::Summary,
            text: payload.title.clone(),
            agent: None,
            initial_delay: Duration::from_millis(delay_ms),
            summary: Some(payload),
        }
    }

    /// The agent label, if this turn is owned by an agent.
    pub fn agent_label(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Typed agent id; `None` for turns without an agent label.
    pub fn agent_id(&self) -> Option<AgentId> {
        self.agent_label().map(AgentId::from_label)
    }

    /// Length used by the typing-rate model.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Non-fatal problems found by [`Script::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptWarning {
    AgentOnNonAgentTurn { index: usize },
    MissingAgentLabel { index: usize },
    UnknownAgent { index: usize, label: String },
    SummaryOnNonSummaryTurn { index: usize },
    SummaryWithoutPayload { index: usize },
}

impl std::fmt::Display for ScriptWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptWarning::AgentOnNonAgentTurn { index } => {
                write!(f, "turn {}: agent label on a non-agent turn", index)
            }
            ScriptWarning::MissingAgentLabel { index } => {
                write!(f, "turn {}: agent turn without an agent label", index)
            }
            ScriptWarning::UnknownAgent { index, label } => {
                write!(f, "turn {}: agent '{}' is not in the roster", index, label)
            }
            ScriptWarning::SummaryOnNonSummaryTurn { index } => {
                write!(f, "turn {}: summary payload on a non-summary turn", index)
            }
            ScriptWarning::SummaryWithoutPayload { index } => {
                write!(f, "turn {}: summary turn without a metrics block", index)
            }
        }
    }
}

/// The ordered turns of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub turns: Vec<Turn>,
}

impl Script {
    pub fn new(id: &str, title: &str, turns: Vec<Turn>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            turns,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    /// Parse a script from JSON. `origin` names the source in errors.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(content).map_err(|e| ScriptError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load a script file. A missing `id` defaults to the file stem.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut script = Self::from_json_str(&content, &path.display().to_string())?;
        if script.id.is_empty() {
            script.id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if script.title.is_empty() {
            script.title = script.id.clone();
        }
        Ok(script)
    }

    /// Stricter check used by `validate`: an empty script plays fine but is
    /// almost certainly an authoring mistake.
    pub fn ensure_not_empty(&self) -> Result<(), ScriptError> {
        if self.is_empty() {
            return Err(ScriptError::Empty(self.id.clone()));
        }
        Ok(())
    }

    /// Authoring problems that playback tolerates.
    pub fn lint(&self) -> Vec<ScriptWarning> {
        let mut warnings = Vec::new();
        for (index, turn) in self.turns.iter().enumerate() {
            match (turn.speaker, turn.agent_label()) {
                (Speaker::Agent, None) => warnings.push(ScriptWarning::MissingAgentLabel { index }),
                (Speaker::Agent, Some(label)) => {
                    if !AgentId::from_label(label).is_known() {
                        warnings.push(ScriptWarning::UnknownAgent {
                            index,
                            label: label.to_string(),
                        });
                    }
                }
                (_, Some(_)) => warnings.push(ScriptWarning::AgentOnNonAgentTurn { index }),
                (_, None) => {}
            }
            match (turn.speaker, &turn.summary) {
                (Speaker::Summary, None) => {
                    warnings.push(ScriptWarning::SummaryWithoutPayload { index })
                }
                (Speaker::Summary, Some(_)) => {}
                (_, Some(_)) => warnings.push(ScriptWarning::SummaryOnNonSummaryTurn { index }),
                (_, None) => {}
            }
        }
        warnings
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
