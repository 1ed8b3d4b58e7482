//! Playback Controller
//!
//! Sole writer of the transport state. The sequencer only ever observes
//! the derived `session_active` signal and the `activation` counter.

use super::scheduler::Scheduler;
use super::timing::{Speed, AUTO_STOP_DELAY};
use super::Timer;
use serde::Serialize;
use tracing::{debug, info};

/// Global transport state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportState {
    pub is_playing: bool,
    pub pause_requested: bool,
    pub speed: Speed,
    pub selected_scenario: String,
    /// Bumped whenever playback should (re)start from turn 0
    pub activation: u64,
}

impl TransportState {
    /// The one signal the sequencer follows: a session exists exactly
    /// while this is true.
    pub fn session_active(&self) -> bool {
        self.is_playing && !self.pause_requested
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: TransportState,
}

impl PlaybackController {
    pub fn new(scenario: &str, speed: Speed) -> Self {
        Self {
            state: TransportState {
                is_playing: false,
                pause_requested: false,
                speed,
                selected_scenario: scenario.to_string(),
                activation: 0,
            },
        }
    }

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn speed(&self) -> Speed {
        self.state.speed
    }

    /// Select and auto-start a scenario. Rejected while playing.
    pub fn select_scenario(&mut self, id: &str) -> bool {
        if self.state.is_playing {
            debug!(scenario = id, "Scenario change rejected while playing");
            return false;
        }
        self.state.selected_scenario = id.to_string();
        self.activate();
        info!(scenario = id, "Scenario selected");
        true
    }

    /// Start when stopped; otherwise flip the pause request.
    pub fn toggle_play_pause(&mut self) {
        if !self.state.is_playing {
            self.activate();
        } else if self.state.pause_requested {
            // resuming starts a fresh session
            self.activate();
        } else {
            self.state.pause_requested = true;
        }
        debug!(
            playing = self.state.is_playing,
            paused = self.state.pause_requested,
            "Play/pause toggled"
        );
    }

    /// Play the selected scenario again from turn 0.
    pub fn restart(&mut self) {
        self.activate();
        info!(scenario = %self.state.selected_scenario, "Playback restarted");
    }

    /// Takes effect on the next scheduled wait; pending waits keep the
    /// speed they were scheduled with.
    pub fn set_speed(&mut self, multiplier: f64) -> Speed {
        self.state.speed = Speed::new(multiplier);
        debug!(speed = self.state.speed.get(), "Speed changed");
        self.state.speed
    }

    /// Schedule the auto-stop that follows session completion.
    pub fn on_session_completed(&mut self, sched: &mut Scheduler<Timer>) {
        debug!(activation = self.state.activation, "Auto-stop scheduled");
        sched.schedule(
            AUTO_STOP_DELAY,
            Timer::AutoStop {
                activation: self.state.activation,
            },
        );
    }

    /// Apply an auto-stop timer. Ignored if playback was restarted since
    /// the timer was scheduled. Returns whether playback stopped.
    pub fn on_auto_stop(&mut self, activation: u64) -> bool {
        if activation != self.state.activation || !self.state.is_playing {
            debug!(activation, current = self.state.activation, "Stale auto-stop ignored");
            return false;
        }
        self.state.is_playing = false;
        self.state.pause_requested = false;
        info!("Playback stopped after completion");
        true
    }

    fn activate(&mut self) {
        self.state.is_playing = true;
        self.state.pause_requested = false;
        self.state.activation += 1;
    }
}
