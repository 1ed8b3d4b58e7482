//! Agent Roster
//!
//! Static directory of the simulated agents. Scripts refer to agents by
//! label; every label resolves to an [`AgentId`], unknown labels included,
//! and every id resolves to a [`AgentRosterEntry`].

use serde::Serialize;

/// Known agents, in the fixed display order of the activity panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentId {
    Intake,
    TransactionAnalysis,
    FraudDetection,
    PolicyCompliance,
    Resolution,
    CustomerCommunication,
    /// Label not present in the roster
    Unknown,
}

impl AgentId {
    /// Resolve a script label. Matches the display name, the short name or
    /// the kebab-case id, ignoring case. Never fails.
    pub fn from_label(label: &str) -> Self {
        let wanted = label.trim();
        ROSTER
            .iter()
            .find(|entry| {
                entry.name.eq_ignore_ascii_case(wanted)
                    || entry.short_name.eq_ignore_ascii_case(wanted)
                    || entry.slug.eq_ignore_ascii_case(wanted)
            })
            .map(|entry| entry.id)
            .unwrap_or(AgentId::Unknown)
    }

    /// Roster entry for this id; [`AgentId::Unknown`] gets the placeholder.
    pub fn entry(self) -> &'static AgentRosterEntry {
        ROSTER
            .iter()
            .find(|entry| entry.id == self)
            .unwrap_or(&UNKNOWN_AGENT)
    }

    /// Position in the roster display order, `None` for unknown agents.
    pub fn position(self) -> Option<usize> {
        ROSTER.iter().position(|entry| entry.id == self)
    }

    pub fn is_known(self) -> bool {
        self != AgentId::Unknown
    }
}

/// Color keys used by the hosts to pick a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentColor {
    Blue,
    Purple,
    Red,
    Amber,
    Green,
    Teal,
    Gray,
}

/// Read-only directory entry for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRosterEntry {
    pub id: AgentId,
    pub slug: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: AgentColor,
    /// Shown in the introduction banner the first time the agent speaks
    pub reasoning: &'static str,
}

/// The roster in workflow order.
pub static ROSTER: [AgentRosterEntry; 6] = [
    AgentRosterEntry {
        id: AgentId::Intake,
        slug: "intake",
        name: "Intake Agent",
        short_name: "Intake",
        description: "Captures the dispute, verifies identity and classifies the claim",
        icon: "\u{1f4e5}", // inbox tray
        color: AgentColor::Blue,
        reasoning: "A new dispute needs a verified customer, an account, and a claim \
                    category before anything else can happen.",
    },
    AgentRosterEntry {
        id: AgentId::TransactionAnalysis,
        slug: "transaction-analysis",
        name: "Transaction Analysis Agent",
        short_name: "Transactions",
        description: "Pulls the disputed transaction and the surrounding account history",
        icon: "\u{1f4ca}", // bar chart
        color: AgentColor::Purple,
        reasoning: "The claim references specific charges, so the ledger, merchant \
                    records and recent spending pattern have to be examined.",
    },
    AgentRosterEntry {
        id: AgentId::FraudDetection,
        slug: "fraud-detection",
        name: "Fraud Detection Agent",
        short_name: "Fraud",
        description: "Scores the activity against device, location and behaviour signals",
        icon: "\u{1f6e1}", // shield
        color: AgentColor::Red,
        reasoning: "The transaction pattern deviates from the customer's profile; a \
                    fraud assessment decides whether the card is compromised.",
    },
    AgentRosterEntry {
        id: AgentId::PolicyCompliance,
        slug: "policy-compliance",
        name: "Policy Compliance Agent",
        short_name: "Compliance",
        description: "Checks network rules, regulatory timelines and bank policy",
        icon: "\u{2696}", // scales
        color: AgentColor::Amber,
        reasoning: "Any credit or chargeback must satisfy card-network reason codes \
                    and the regulatory response deadlines.",
    },
    AgentRosterEntry {
        id: AgentId::Resolution,
        slug: "resolution",
        name: "Resolution Agent",
        short_name: "Resolution",
        description: "Decides the outcome and issues credits, chargebacks and card actions",
        icon: "\u{2705}", // check mark
        color: AgentColor::Green,
        reasoning: "Evidence and policy checks are complete, so the dispute can be \
                    decided and the account actions executed.",
    },
    AgentRosterEntry {
        id: AgentId::CustomerCommunication,
        slug: "customer-communication",
        name: "Customer Communication Agent",
        short_name: "Comms",
        description: "Explains the outcome and next steps in plain language",
        icon: "\u{1f4ac}", // speech balloon
        color: AgentColor::Teal,
        reasoning: "The customer should hear the outcome, the timeline and what to \
                    expect next, in one clear message.",
    },
];

/// Placeholder used for labels that are not in the roster.
pub static UNKNOWN_AGENT: AgentRosterEntry = AgentRosterEntry {
    id: AgentId::Unknown,
    slug: "agent",
    name: "Agent",
    short_name: "Agent",
    description: "Specialist agent",
    icon: "\u{1f916}", // robot
    color: AgentColor::Gray,
    reasoning: "Handing over to a specialist for the next step.",
};

/// Look up an entry by script label, falling back to the placeholder.
pub fn lookup(label: &str) -> &'static AgentRosterEntry {
    AgentId::from_label(label).entry()
}

/// Whether two script labels name the same agent. Roster agents compare by
/// id; labels outside the roster compare by trimmed text, ignoring case.
pub fn same_agent(a: &str, b: &str) -> bool {
    match (AgentId::from_label(a), AgentId::from_label(b)) {
        (AgentId::Unknown, AgentId::Unknown) => a.trim().eq_ignore_ascii_case(b.trim()),
        (x, y) => x == y,
    }
}
