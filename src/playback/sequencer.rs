//! Transcript Sequencer
//!
//! Owns at most one playback session and steps it through its script one
//! turn at a time. Turn `k + 1` never starts before turn `k` has finished
//! its grace period. Every timer the sequencer or its turn renderer
//! schedules carries the session epoch; a timer from another epoch, or one
//! that fires after teardown, is dropped without touching state.

use super::marker::MarkerInserter;
use super::scheduler::Scheduler;
use super::timing::{Speed, COMPLETION_COOLDOWN, HANDOFF_SETTLE};
use super::turn::{TurnPhase, TurnProgress, TurnRenderer};
use super::{PlaybackEvent, Timer};
use crate::roster;
use crate::script::Script;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Working state of one run through a script.
#[derive(Debug, Clone)]
struct PlaybackSession {
    script: Arc<Script>,
    /// Fully revealed turns, front to back, no gaps
    revealed: Vec<usize>,
    /// Turn in its waiting/typing phase; the script length once completed
    current: usize,
    active_agent: Option<String>,
    status: SessionStatus,
    renderer: Option<TurnRenderer>,
    markers: MarkerInserter,
    completion_signalled: bool,
}

impl PlaybackSession {
    fn new(script: Arc<Script>) -> Self {
        Self {
            script,
            revealed: Vec::new(),
            current: 0,
            active_agent: None,
            status: SessionStatus::Running,
            renderer: None,
            markers: MarkerInserter::new(),
            completion_signalled: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct TranscriptSequencer {
    /// Identity of the live (or most recent) session
    epoch: u64,
    session: Option<PlaybackSession>,
    events: Vec<PlaybackEvent>,
}

impl TranscriptSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `script` and start turn 0.
    ///
    /// Ignored if a session is already running this same script. Any other
    /// session is torn down first. An empty script completes immediately.
    /// Returns whether a session was started.
    pub fn start(
        &mut self,
        script: Arc<Script>,
        speed: Speed,
        sched: &mut Scheduler<Timer>,
    ) -> bool {
        let already_running = self.session.as_ref().is_some_and(|s| {
            s.status == SessionStatus::Running && Arc::ptr_eq(&s.script, &script)
        });
        if already_running {
            debug!(epoch = self.epoch, "Session already running, start ignored");
            return false;
        }
        self.abort(sched);

        self.epoch += 1;
        let epoch = self.epoch;
        info!(epoch, scenario = %script.id, turns = script.len(), "Session started");
        self.events.push(PlaybackEvent::SessionStarted {
            epoch,
            scenario: script.id.clone(),
            turns: script.len(),
        });

        let mut session = PlaybackSession::new(script);
        if session.script.is_empty() {
            session.status = SessionStatus::Completed;
            session.completion_signalled = true;
            self.session = Some(session);
            info!(epoch, "Empty script, session completed");
            self.events.push(PlaybackEvent::SessionCompleted { epoch });
            return true;
        }

        let first_agent = session.script.turns[0].agent.clone();
        self.session = Some(session);
        if let Some(label) = first_agent {
            self.set_active_agent(Some(label));
        }
        self.begin_turn(0, speed, sched);
        true
    }

    /// Discard the session and cancel every timer it owns. No-op when idle.
    pub fn abort(&mut self, sched: &mut Scheduler<Timer>) {
        let Some(session) = self.session.take() else {
            return;
        };
        let epoch = self.epoch;
        let cancelled = sched.cancel_where(|timer| timer.epoch() == Some(epoch));
        info!(
            epoch,
            cancelled,
            revealed = session.revealed.len(),
            "Session aborted"
        );
        if session.active_agent.is_some() {
            self.events.push(PlaybackEvent::AgentActivityChanged { label: None });
        }
        self.events.push(PlaybackEvent::SessionAborted { epoch });
    }

    /// Apply an elapsed timer. Timers from other epochs are ignored.
    pub fn handle_timer(&mut self, timer: Timer, speed: Speed, sched: &mut Scheduler<Timer>) {
        let Some(epoch) = timer.epoch() else {
            return;
        };
        if epoch != self.epoch || self.session.is_none() {
            debug!(timer_epoch = epoch, epoch = self.epoch, "Stale timer ignored");
            return;
        }

        match timer {
            Timer::Turn { index, step, .. } => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let script = Arc::clone(&session.script);
                let (Some(renderer), Some(turn)) = (
                    session.renderer.as_mut().filter(|r| r.index() == index),
                    script.get(index),
                ) else {
                    debug!(epoch, index, "Timer for a turn that is not in flight");
                    return;
                };
                match renderer.on_timer(step, turn, speed, sched) {
                    TurnProgress::Entered(phase) => {
                        self.events
                            .push(PlaybackEvent::TurnPhaseChanged { index, phase });
                    }
                    TurnProgress::Finished => self.on_turn_revealed(index, speed, sched),
                    TurnProgress::Ignored => {
                        debug!(epoch, index, ?step, "Timer does not match turn phase");
                    }
                }
            }
            Timer::Settle { index, .. } => {
                let ready = self.session.as_ref().is_some_and(|s| {
                    s.status == SessionStatus::Running && s.current == index && s.renderer.is_none()
                });
                if ready {
                    self.begin_turn(index, speed, sched);
                }
            }
            Timer::Cooldown { .. } => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if session.status == SessionStatus::Completed && !session.completion_signalled {
                    session.completion_signalled = true;
                    info!(epoch, "Session completed");
                    self.events.push(PlaybackEvent::SessionCompleted { epoch });
                }
            }
            Timer::AutoStop { .. } => {}
        }
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    // === Turn flow ===

    fn begin_turn(&mut self, index: usize, speed: Speed, sched: &mut Scheduler<Timer>) {
        let epoch = self.epoch;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let script = Arc::clone(&session.script);
        let Some(turn) = script.get(index) else {
            return;
        };
        if let Some(banner) = session.markers.banner_for(index, turn) {
            debug!(epoch, index, agent = %banner.label, "Agent banner inserted");
            self.events.push(PlaybackEvent::BannerInserted(banner));
        }
        session.current = index;
        session.renderer = Some(TurnRenderer::begin(epoch, index, turn, speed, sched));
        self.events.push(PlaybackEvent::TurnPhaseChanged {
            index,
            phase: TurnPhase::Waiting,
        });
    }

    /// Called when the turn renderer finishes a turn's grace period.
    fn on_turn_revealed(&mut self, index: usize, speed: Speed, sched: &mut Scheduler<Timer>) {
        let epoch = self.epoch;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.status != SessionStatus::Running {
            return;
        }
        session.renderer = None;
        session.revealed.push(index);
        let script = Arc::clone(&session.script);
        self.events.push(PlaybackEvent::TurnRevealed {
            index,
            turn: script.turns[index].clone(),
        });

        let next = index + 1;
        if next >= script.len() {
            session.current = script.len();
            session.status = SessionStatus::Completed;
            let cooldown = speed.scale(COMPLETION_COOLDOWN);
            sched.schedule(cooldown, Timer::Cooldown { epoch });
            debug!(epoch, cooldown_ms = cooldown.as_millis() as u64, "Final turn revealed");
            self.set_active_agent(None);
            return;
        }

        session.current = next;
        let handoff = script.turns[next].agent_label().filter(|label| {
            !session
                .active_agent
                .as_deref()
                .is_some_and(|active| roster::same_agent(active, label))
        });
        match handoff {
            Some(label) => {
                let settle = speed.scale(HANDOFF_SETTLE);
                sched.schedule(settle, Timer::Settle { epoch, index: next });
                debug!(
                    epoch,
                    index = next,
                    agent = label,
                    settle_ms = settle.as_millis() as u64,
                    "Agent handoff"
                );
                self.set_active_agent(Some(label.to_string()));
            }
            None => self.begin_turn(next, speed, sched),
        }
    }

    fn set_active_agent(&mut self, label: Option<String>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.active_agent == label {
            return;
        }
        session.active_agent = label.clone();
        self.events
            .push(PlaybackEvent::AgentActivityChanged { label });
    }

    // === Accessors ===

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Idle)
    }

    /// Turn currently waiting or typing; the script length once completed;
    /// `None` without a session.
    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.current)
    }

    pub fn revealed(&self) -> &[usize] {
        self.session
            .as_ref()
            .map(|s| s.revealed.as_slice())
            .unwrap_or(&[])
    }

    pub fn active_agent(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.active_agent.as_deref())
    }

    pub fn script(&self) -> Option<&Arc<Script>> {
        self.session.as_ref().map(|s| &s.script)
    }

    /// Index and phase of the turn in flight.
    pub fn current_phase(&self) -> Option<(usize, TurnPhase)> {
        self.session
            .as_ref()
            .and_then(|s| s.renderer.as_ref())
            .map(|r| (r.index(), r.phase()))
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
