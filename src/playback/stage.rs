//! Stage
//!
//! The container around the playback core. Owns the scheduler and routes
//! between the pieces, each of which has a single writer:
//! - transport changes go through the [`PlaybackController`]
//! - after each change the stage reconciles the sequencer with
//!   `session_active`: off aborts, a new activation aborts and restarts
//! - sequencer events update the agent panel and the transcript view, and
//!   completion is forwarded to the controller's auto-stop

use super::controller::{PlaybackController, TransportState};
use super::panel::{AgentActivity, AgentActivityPanel};
use super::runtime::Command;
use super::scheduler::Scheduler;
use super::sequencer::{SessionStatus, TranscriptSequencer};
use super::timing::{Speed, DEFAULT_SPEED_STEPS};
use super::transcript::{Transcript, TranscriptEntry};
use super::{PlaybackEvent, Timer};
use crate::config::PlaybackConfig;
use crate::errors::{DisputecastError, Result};
use crate::script::ScenarioLibrary;
use std::time::Duration;
use tracing::{debug, warn};

/// Owned, read-only picture of the stage for hosts.
#[derive(Debug, Clone)]
pub struct StageSnapshot {
    pub transport: TransportState,
    pub status: SessionStatus,
    pub scenario_title: String,
    pub epoch: u64,
    pub current_index: Option<usize>,
    pub revealed: Vec<usize>,
    pub total_turns: usize,
    pub active_agent: Option<String>,
    pub agents: Vec<AgentActivity>,
    pub entries: Vec<TranscriptEntry>,
    /// Turn showing the typing indicator
    pub typing: Option<usize>,
    /// Virtual time since the stage was created
    pub elapsed: Duration,
}

impl StageSnapshot {
    /// Fraction of turns revealed, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_turns == 0 {
            return if self.status == SessionStatus::Completed { 1.0 } else { 0.0 };
        }
        self.revealed.len() as f64 / self.total_turns as f64
    }
}

pub struct Stage {
    library: ScenarioLibrary,
    controller: PlaybackController,
    sequencer: TranscriptSequencer,
    panel: AgentActivityPanel,
    transcript: Transcript,
    scheduler: Scheduler<Timer>,
    speed_steps: Vec<f64>,
    /// Last transport activation the sequencer was started for
    seen_activation: u64,
    events: Vec<PlaybackEvent>,
}

impl Stage {
    pub fn new(library: ScenarioLibrary, config: &PlaybackConfig) -> Result<Self> {
        let scenario = match &config.default_scenario {
            Some(id) if library.contains(id) => id.clone(),
            Some(id) => return Err(DisputecastError::UnknownScenario(id.clone())),
            None => library
                .first()
                .map(|s| s.id.clone())
                .ok_or_else(|| DisputecastError::Config("no scenarios available".into()))?,
        };

        let mut speed_steps: Vec<f64> = config
            .speed_steps
            .iter()
            .copied()
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| Speed::new(s).get())
            .collect();
        if speed_steps.is_empty() {
            speed_steps = DEFAULT_SPEED_STEPS.to_vec();
        }
        speed_steps.sort_by(|a, b| a.total_cmp(b));
        speed_steps.dedup();

        let mut stage = Self {
            library,
            controller: PlaybackController::new(&scenario, Speed::new(config.default_speed)),
            sequencer: TranscriptSequencer::new(),
            panel: AgentActivityPanel::default(),
            transcript: Transcript::new(),
            scheduler: Scheduler::new(),
            speed_steps,
            seen_activation: 0,
            events: Vec::new(),
        };
        if config.autoplay {
            stage.toggle_play_pause();
        }
        Ok(stage)
    }

    // === Transport ===

    /// Select and auto-start a scenario. Rejected while playing or when the
    /// id is not in the library.
    pub fn select_scenario(&mut self, id: &str) -> bool {
        if !self.library.contains(id) {
            warn!(scenario = id, "Unknown scenario");
            return false;
        }
        if !self.controller.select_scenario(id) {
            return false;
        }
        self.transport_changed();
        true
    }

    /// Select by 0-based menu position.
    pub fn select_nth(&mut self, position: usize) -> bool {
        match self.library.nth(position) {
            Some(script) => self.select_scenario(&script.id),
            None => false,
        }
    }

    pub fn toggle_play_pause(&mut self) {
        self.controller.toggle_play_pause();
        self.transport_changed();
    }

    pub fn restart(&mut self) {
        self.controller.restart();
        self.transport_changed();
    }

    pub fn set_speed(&mut self, multiplier: f64) -> Speed {
        let speed = self.controller.set_speed(multiplier);
        self.transport_changed();
        speed
    }

    /// Next configured speed above the current one.
    pub fn speed_up(&mut self) -> Speed {
        let current = self.controller.speed().get();
        match self.speed_steps.iter().copied().find(|s| *s > current) {
            Some(next) => self.set_speed(next),
            None => self.controller.speed(),
        }
    }

    /// Next configured speed below the current one.
    pub fn slow_down(&mut self) -> Speed {
        let current = self.controller.speed().get();
        match self.speed_steps.iter().copied().rev().find(|s| *s < current) {
            Some(next) => self.set_speed(next),
            None => self.controller.speed(),
        }
    }

    /// Apply a host command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SelectScenario(id) => {
                self.select_scenario(&id);
            }
            Command::SelectNth(position) => {
                self.select_nth(position);
            }
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::Restart => self.restart(),
            Command::SetSpeed(multiplier) => {
                self.set_speed(multiplier);
            }
            Command::SpeedUp => {
                self.speed_up();
            }
            Command::SlowDown => {
                self.slow_down();
            }
        }
    }

    // === Time ===

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    /// Advance virtual time by `by`, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration) {
        let target = self.scheduler.now().saturating_add(by);
        self.advance_to(target);
    }

    /// Advance virtual time to `time`, firing every timer that falls due.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some(timer) = self.scheduler.pop_until(time) {
            self.dispatch(timer);
        }
        self.scheduler.advance_to(time);
    }

    /// Fire timers until nothing is pending: the session ran out and the
    /// controller auto-stopped, or nothing was playing.
    pub fn run_until_idle(&mut self) {
        while let Some(timer) = self.scheduler.pop_next() {
            self.dispatch(timer);
        }
    }

    // === Observation ===

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn transport(&self) -> &TransportState {
        self.controller.state()
    }

    pub fn sequencer(&self) -> &TranscriptSequencer {
        &self.sequencer
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn panel(&self) -> &AgentActivityPanel {
        &self.panel
    }

    pub fn library(&self) -> &ScenarioLibrary {
        &self.library
    }

    pub fn snapshot(&self) -> StageSnapshot {
        let transport = self.controller.state().clone();
        let script = self
            .sequencer
            .script()
            .cloned()
            .or_else(|| self.library.get(&transport.selected_scenario));
        let status = self.sequencer.status();
        StageSnapshot {
            scenario_title: script.as_ref().map(|s| s.title.clone()).unwrap_or_default(),
            total_turns: script.as_ref().map(|s| s.len()).unwrap_or(0),
            status,
            epoch: self.sequencer.epoch(),
            current_index: self.sequencer.current_index(),
            revealed: self.sequencer.revealed().to_vec(),
            active_agent: self.panel.active().map(str::to_string),
            agents: self.panel.statuses(status),
            entries: self.transcript.entries().to_vec(),
            typing: self.transcript.typing(),
            elapsed: self.scheduler.now(),
            transport,
        }
    }

    // === Wiring ===

    fn dispatch(&mut self, timer: Timer) {
        match timer {
            Timer::AutoStop { activation } => {
                if self.controller.on_auto_stop(activation) {
                    self.events.push(PlaybackEvent::AutoStopped);
                    self.transport_changed();
                }
            }
            other => {
                let speed = self.controller.speed();
                self.sequencer.handle_timer(other, speed, &mut self.scheduler);
                self.pump();
            }
        }
    }

    fn transport_changed(&mut self) {
        self.events
            .push(PlaybackEvent::TransportChanged(self.controller.state().clone()));
        self.reconcile();
    }

    /// Bring the sequencer in line with the transport signal.
    fn reconcile(&mut self) {
        let state = self.controller.state();
        let active = state.session_active();
        let activation = state.activation;
        let speed = state.speed;
        let scenario = state.selected_scenario.clone();

        if !active {
            self.sequencer.abort(&mut self.scheduler);
        } else if activation != self.seen_activation {
            self.seen_activation = activation;
            debug!(activation, scenario = %scenario, "Starting fresh session");
            match self.library.get(&scenario) {
                Some(script) => {
                    self.sequencer.abort(&mut self.scheduler);
                    self.sequencer.start(script, speed, &mut self.scheduler);
                }
                None => warn!(scenario = %scenario, "Selected scenario missing from library"),
            }
        }
        self.pump();
    }

    /// Route sequencer events to the panel, the transcript and the controller.
    fn pump(&mut self) {
        for event in self.sequencer.drain_events() {
            match &event {
                PlaybackEvent::AgentActivityChanged { label } => {
                    self.panel.on_agent_activity_changed(label.as_deref());
                }
                PlaybackEvent::SessionCompleted { .. } => {
                    self.controller.on_session_completed(&mut self.scheduler);
                }
                _ => {}
            }
            let script = self.sequencer.script().map(|s| s.as_ref());
            self.transcript.apply(&event, script);
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::turn::TurnPhase;
    use crate::script::{Script, Turn};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn library() -> ScenarioLibrary {
        let mut library = ScenarioLibrary::new();
        library
            .insert(Script::new(
                "five",
                "Five turns",
                vec![
                    Turn::customer("one", 100),
                    Turn::agent("Intake Agent", "two", 100),
                    Turn::agent("Fraud Detection Agent", "three", 100),
                    Turn::customer("four", 100),
                    Turn::agent("Resolution Agent", "five", 100),
                ],
            ))
            .unwrap();
        library.insert(Script::new("empty", "Empty", vec![])).unwrap();
        library
    }

    fn stage() -> Stage {
        Stage::new(library(), &PlaybackConfig::default()).unwrap()
    }

    fn advance_until_revealed(stage: &mut Stage, count: usize) {
        while stage.sequencer().revealed().len() < count {
            let next = stage.next_deadline().expect("playback stalled");
            stage.advance_to(next);
        }
    }

    #[test]
    fn test_new_stage_is_idle() {
        let stage = stage();
        let snap = stage.snapshot();
        assert!(!snap.transport.is_playing);
        assert_eq!(snap.status, SessionStatus::Idle);
        assert_eq!(snap.transport.selected_scenario, "five");
        assert_eq!(snap.total_turns, 5);
        assert!(stage.next_deadline().is_none());
    }

    #[test]
    fn test_unknown_default_scenario_rejected() {
        let config = PlaybackConfig {
            default_scenario: Some("missing".into()),
            ..Default::default()
        };
        assert!(matches!(
            Stage::new(library(), &config),
            Err(DisputecastError::UnknownScenario(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_autoplay_starts_session() {
        let config = PlaybackConfig {
            autoplay: true,
            ..Default::default()
        };
        let stage = Stage::new(library(), &config).unwrap();
        assert_eq!(stage.sequencer().status(), SessionStatus::Running);
    }

    #[test]
    fn test_full_run_reveals_all_and_autostops() {
        let mut stage = stage();
        assert!(stage.select_scenario("five"));
        stage.run_until_idle();

        let events = stage.drain_events();
        let revealed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::TurnRevealed { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(revealed, vec![0, 1, 2, 3, 4]);
        assert!(events.contains(&PlaybackEvent::AutoStopped));

        // auto-stop tears the session down
        let snap = stage.snapshot();
        assert!(!snap.transport.is_playing);
        assert_eq!(snap.status, SessionStatus::Idle);
        assert!(snap.entries.is_empty());
    }

    #[test]
    fn test_completion_cooldown_then_unscaled_autostop() {
        let mut stage = stage();
        stage.set_speed(2.0);
        stage.select_scenario("five");
        advance_until_revealed(&mut stage, 5);
        let final_reveal = stage.now();
        stage.drain_events();

        stage.advance(ms(499));
        assert!(stage.drain_events().is_empty());
        stage.advance(ms(1));
        assert!(stage
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::SessionCompleted { .. })));
        assert_eq!(stage.now() - final_reveal, ms(500));

        stage.advance(ms(1999));
        assert!(stage.transport().is_playing);
        stage.advance(ms(1));
        assert!(!stage.transport().is_playing);
    }

    #[test]
    fn test_pause_is_reset() {
        let mut stage = stage();
        stage.select_scenario("five");
        advance_until_revealed(&mut stage, 2);
        assert_eq!(stage.sequencer().revealed(), &[0, 1]);

        stage.toggle_play_pause(); // pause
        assert_eq!(stage.sequencer().status(), SessionStatus::Idle);
        assert_eq!(stage.sequencer().current_index(), None);
        assert!(stage.transcript().entries().is_empty());
        assert!(stage.next_deadline().is_none());

        stage.toggle_play_pause(); // resume
        assert_eq!(stage.sequencer().current_index(), Some(0));
        assert!(stage.sequencer().revealed().is_empty());
        assert_eq!(stage.sequencer().epoch(), 2);
    }

    #[test]
    fn test_pause_during_handoff_settle_cancels_it() {
        let mut stage = stage();
        stage.select_scenario("five");
        // turn 0 is a customer turn, so turn 1 waits out the Intake handoff
        advance_until_revealed(&mut stage, 1);
        assert_eq!(stage.sequencer().current_phase(), None);
        assert!(stage
            .scheduler
            .iter()
            .any(|(_, t)| matches!(t, Timer::Settle { epoch: 1, index: 1 })));

        stage.toggle_play_pause(); // pause
        assert!(stage.next_deadline().is_none());
        stage.toggle_play_pause(); // resume
        stage.drain_events();

        // past where the cancelled settle would have started turn 1
        stage.advance(ms(800));
        let events = stage.drain_events();
        assert!(!events.iter().any(|e| matches!(
            e,
            PlaybackEvent::TurnPhaseChanged { index: 1, .. } | PlaybackEvent::TurnRevealed { .. }
        )));
        assert_eq!(stage.sequencer().epoch(), 2);
        assert!(stage.sequencer().revealed().is_empty());
        assert_eq!(
            stage.sequencer().current_phase(),
            Some((0, TurnPhase::Revealed))
        );
    }

    #[test]
    fn test_pause_during_completion_cooldown_cancels_it() {
        let mut stage = stage();
        stage.select_scenario("five");
        advance_until_revealed(&mut stage, 5);
        assert!(stage
            .scheduler
            .iter()
            .any(|(_, t)| matches!(t, Timer::Cooldown { epoch: 1 })));

        stage.toggle_play_pause(); // pause
        stage.drain_events();
        stage.run_until_idle();
        let events = stage.drain_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::SessionCompleted { .. })));
        assert!(!events.contains(&PlaybackEvent::AutoStopped));
        assert!(stage.transport().is_playing);
        assert!(stage.transport().pause_requested);

        // the next session completes under its own epoch only
        stage.toggle_play_pause(); // resume
        stage.run_until_idle();
        let completed: Vec<u64> = stage
            .drain_events()
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::SessionCompleted { epoch } => Some(*epoch),
                _ => None,
            })
            .collect();
        assert_eq!(completed, vec![2]);
        assert!(!stage.transport().is_playing);
    }

    #[test]
    fn test_restart_while_playing_recreates_session() {
        let mut stage = stage();
        stage.select_scenario("five");
        advance_until_revealed(&mut stage, 1);
        stage.restart();
        assert_eq!(stage.sequencer().epoch(), 2);
        assert!(stage.sequencer().revealed().is_empty());
        assert_eq!(stage.sequencer().current_phase(), Some((0, TurnPhase::Waiting)));
    }

    #[test]
    fn test_select_rejected_while_playing() {
        let mut stage = stage();
        stage.select_scenario("five");
        assert!(!stage.select_scenario("empty"));
        assert_eq!(stage.transport().selected_scenario, "five");
        assert!(!stage.select_scenario("does-not-exist"));
    }

    #[test]
    fn test_empty_scenario_completes_and_autostops() {
        let mut stage = stage();
        stage.select_scenario("empty");
        assert_eq!(stage.sequencer().status(), SessionStatus::Completed);
        assert!(stage
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::SessionCompleted { .. })));

        stage.advance(ms(2000));
        assert!(!stage.transport().is_playing);
    }

    #[test]
    fn test_panel_tracks_active_agent() {
        let mut stage = stage();
        stage.select_scenario("five");
        advance_until_revealed(&mut stage, 1);
        // turn 1 (Intake) is next; its agent is reported before the settle
        assert_eq!(stage.panel().active(), Some("Intake Agent"));

        advance_until_revealed(&mut stage, 2);
        assert_eq!(stage.panel().active(), Some("Fraud Detection Agent"));
        let snap = stage.snapshot();
        assert_eq!(snap.active_agent.as_deref(), Some("Fraud Detection Agent"));
    }

    #[test]
    fn test_speed_steps() {
        let mut stage = stage();
        assert_eq!(stage.speed_up().get(), 1.5);
        assert_eq!(stage.speed_up().get(), 2.0);
        assert_eq!(stage.speed_up().get(), 2.0);
        stage.set_speed(1.0);
        assert_eq!(stage.slow_down().get(), 0.5);
        assert_eq!(stage.slow_down().get(), 0.25);
        assert_eq!(stage.slow_down().get(), 0.25);
    }

    #[test]
    fn test_speed_steps_below_floor_merge_into_it() {
        let config = PlaybackConfig {
            speed_steps: vec![0.05, 0.1, 0.25, 1.0],
            ..Default::default()
        };
        let mut stage = Stage::new(library(), &config).unwrap();
        assert_eq!(stage.speed_steps, vec![0.25, 1.0]);
        assert_eq!(stage.slow_down().get(), 0.25);
        assert_eq!(stage.slow_down().get(), 0.25);
    }

    #[test]
    fn test_speed_change_applies_to_next_wait() {
        let mut stage = stage();
        stage.select_scenario("five");
        // turn 0 wait of 100ms was scheduled at 1x
        assert_eq!(stage.next_deadline(), Some(ms(100)));
        stage.set_speed(2.0);
        assert_eq!(stage.next_deadline(), Some(ms(100)));
        stage.advance_to(ms(100));
        // "one": 3 chars * 20ms = 60ms at 1x, 30ms at 2x
        assert_eq!(stage.next_deadline(), Some(ms(130)));
    }

    #[test]
    fn test_typing_visible_in_snapshot() {
        let mut stage = stage();
        stage.select_scenario("five");
        stage.advance(ms(100));
        let snap = stage.snapshot();
        assert_eq!(snap.typing, Some(0));
        assert!(snap.progress() < f64::EPSILON);
    }
}
