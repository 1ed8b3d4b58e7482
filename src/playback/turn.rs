//! Turn Renderer
//!
//! Per-turn timing pipeline: `Waiting → Typing → Revealed`, then a grace
//! period before the sequencer is told the turn is done. Summary turns skip
//! `Typing`. Each phase schedules exactly one timer; the renderer only acts
//! on the timer matching its current phase.

use super::scheduler::Scheduler;
use super::timing::{typing_duration, Speed, REVEAL_GRACE};
use super::Timer;
use crate::script::{Speaker, Turn};
use crate::telemetry::preview;
use serde::Serialize;
use tracing::debug;

/// Visible lifecycle of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// Current but not yet shown
    Waiting,
    /// Typing indicator shown, no text
    Typing,
    /// Full text (or summary card) shown
    Revealed,
}

/// Which wait of the pipeline a timer ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnStep {
    /// Initial delay elapsed
    Wait,
    /// Typing animation elapsed
    Type,
    /// Post-reveal grace elapsed
    Grace,
}

/// Result of feeding a timer to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnProgress {
    /// Moved to a new visible phase
    Entered(TurnPhase),
    /// Grace elapsed; the sequencer should advance
    Finished,
    /// Timer does not match the current phase
    Ignored,
}

/// Pipeline state of the in-flight turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRenderer {
    epoch: u64,
    index: usize,
    speaker: Speaker,
    phase: TurnPhase,
}

impl TurnRenderer {
    /// Enter `Waiting` and schedule the initial delay.
    pub fn begin(
        epoch: u64,
        index: usize,
        turn: &Turn,
        speed: Speed,
        sched: &mut Scheduler<Timer>,
    ) -> Self {
        let wait = speed.scale(turn.initial_delay);
        sched.schedule(
            wait,
            Timer::Turn {
                epoch,
                index,
                step: TurnStep::Wait,
            },
        );
        debug!(epoch, index, wait_ms = wait.as_millis() as u64, "Turn waiting");
        Self {
            epoch,
            index,
            speaker: turn.speaker,
            phase: TurnPhase::Waiting,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Handle an elapsed pipeline timer for this turn.
    pub fn on_timer(
        &mut self,
        step: TurnStep,
        turn: &Turn,
        speed: Speed,
        sched: &mut Scheduler<Timer>,
    ) -> TurnProgress {
        match (self.phase, step) {
            (TurnPhase::Waiting, TurnStep::Wait) => {
                match typing_duration(self.speaker, turn.text_len(), speed) {
                    Some(typing) => {
                        self.phase = TurnPhase::Typing;
                        self.schedule(TurnStep::Type, typing, sched);
                        debug!(
                            epoch = self.epoch,
                            index = self.index,
                            typing_ms = typing.as_millis() as u64,
                            "Turn typing"
                        );
                    }
                    None => self.reveal(turn, speed, sched),
                }
                TurnProgress::Entered(self.phase)
            }
            (TurnPhase::Typing, TurnStep::Type) => {
                self.reveal(turn, speed, sched);
                TurnProgress::Entered(self.phase)
            }
            (TurnPhase::Revealed, TurnStep::Grace) => TurnProgress::Finished,
            _ => TurnProgress::Ignored,
        }
    }

    fn reveal(&mut self, turn: &Turn, speed: Speed, sched: &mut Scheduler<Timer>) {
        self.phase = TurnPhase::Revealed;
        self.schedule(TurnStep::Grace, speed.scale(REVEAL_GRACE), sched);
        debug!(
            epoch = self.epoch,
            index = self.index,
            text = %preview(&turn.text, 48),
            "Turn revealed"
        );
    }

    fn schedule(&self, step: TurnStep, after: std::time::Duration, sched: &mut Scheduler<Timer>) {
        sched.schedule(
            after,
            Timer::Turn {
                epoch: self.epoch,
                index: self.index,
                step,
            },
        );
    }
}
