//! Scripted Conversation Playback
//!
//! Plays an ordered script one turn at a time with human-like pacing:
//! - [`TranscriptSequencer`]: owns the session and advances turn by turn
//! - [`TurnRenderer`]: per-turn waiting → typing → revealed pipeline
//! - [`MarkerInserter`]: one agent-introduction banner per run of agent turns
//! - [`PlaybackController`]: transport (play/pause/restart/speed/scenario)
//! - [`AgentActivityPanel`]: completed/active/pending per roster entry
//! - [`Stage`]: wires the above to one [`Scheduler`] and a transcript view
//! - [`PlaybackRuntime`]: drives a stage from a tokio task in real time
//!
//! Everything runs on one logical event queue; every suspend point is a
//! cancellable scheduler timer tagged with the session epoch that owns it.

pub mod controller;
pub mod marker;
pub mod panel;
pub mod runtime;
pub mod scheduler;
pub mod sequencer;
pub mod stage;
pub mod timing;
pub mod transcript;
pub mod turn;

pub use controller::{PlaybackController, TransportState};
pub use marker::{banner_indices, AgentBanner, MarkerInserter};
pub use panel::{classify_agents, AgentActivity, AgentActivityPanel, AgentStatus};
pub use runtime::{Command, PlaybackHandle, PlaybackRuntime};
pub use scheduler::Scheduler;
pub use sequencer::{SessionStatus, TranscriptSequencer};
pub use stage::{Stage, StageSnapshot};
pub use timing::Speed;
pub use transcript::{Transcript, TranscriptEntry, TurnView};
pub use turn::{TurnPhase, TurnRenderer, TurnStep};

use crate::script::Turn;

/// Every callback the playback core can have pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// A step of the in-flight turn's pipeline
    Turn {
        epoch: u64,
        index: usize,
        step: TurnStep,
    },
    /// Agent handoff pause before turn `index` starts
    Settle { epoch: u64, index: usize },
    /// Delay between the final reveal and the completion signal
    Cooldown { epoch: u64 },
    /// Controller auto-stop after completion, tagged with the transport
    /// activation it belongs to
    AutoStop { activation: u64 },
}

impl Timer {
    /// Session epoch for sequencer-owned timers.
    pub fn epoch(&self) -> Option<u64> {
        match *self {
            Timer::Turn { epoch, .. } | Timer::Settle { epoch, .. } | Timer::Cooldown { epoch } => {
                Some(epoch)
            }
            Timer::AutoStop { .. } => None,
        }
    }
}

/// Observable output of the playback core, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A new session began at turn 0
    SessionStarted {
        epoch: u64,
        scenario: String,
        turns: usize,
    },
    /// The active agent changed; `None` clears it
    AgentActivityChanged { label: Option<String> },
    /// Agent introduction shown before turn `banner.index`
    BannerInserted(AgentBanner),
    /// The in-flight turn entered a new phase
    TurnPhaseChanged { index: usize, phase: TurnPhase },
    /// A turn finished its reveal and grace period
    TurnRevealed { index: usize, turn: Turn },
    /// The session reached the end of its script
    SessionCompleted { epoch: u64 },
    /// The session was torn down; all progress is gone
    SessionAborted { epoch: u64 },
    /// Transport state changed
    TransportChanged(TransportState),
    /// The controller stopped playback after completion
    AutoStopped,
}
