//! Playback timing model
//!
//! Every delay in a session is one of the fixed constants below, scaled by
//! the speed multiplier in effect when the wait is scheduled. The controller
//! auto-stop is the only unscaled delay.

use crate::script::Speaker;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Customer typing rate
pub const CUSTOMER_MS_PER_CHAR: u64 = 20;
/// Longest customer typing animation
pub const CUSTOMER_TYPING_CAP: Duration = Duration::from_millis(1200);
/// Agent typing rate
pub const AGENT_MS_PER_CHAR: u64 = 15;
/// Longest agent typing animation
pub const AGENT_TYPING_CAP: Duration = Duration::from_millis(800);
/// Pause inserted when the active agent changes between turns
pub const HANDOFF_SETTLE: Duration = Duration::from_millis(800);
/// Time a revealed turn stays on screen before the next one starts
pub const REVEAL_GRACE: Duration = Duration::from_millis(700);
/// Delay between the final reveal and the completion signal
pub const COMPLETION_COOLDOWN: Duration = Duration::from_millis(1000);
/// Controller delay between completion and stopping; not speed-scaled
pub const AUTO_STOP_DELAY: Duration = Duration::from_millis(2000);

/// Slowest supported speed; also the substitute for invalid multipliers.
pub const MIN_SPEED: f64 = 0.25;
/// Speeds offered by the speed up / slow down controls.
pub const DEFAULT_SPEED_STEPS: [f64; 5] = [0.25, 0.5, 1.0, 1.5, 2.0];

/// Positive playback speed multiplier, never below [`MIN_SPEED`].
///
/// Zero, negative and non-finite values are replaced by [`MIN_SPEED`], and
/// positive values below it are raised to it, so no wait grows past four
/// times its base duration.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    pub const NORMAL: Speed = Speed(1.0);

    pub fn new(multiplier: f64) -> Self {
        if multiplier.is_finite() && multiplier > 0.0 {
            Self(multiplier.max(MIN_SPEED))
        } else {
            Self(MIN_SPEED)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// `base / multiplier`, rounded to the nearest nanosecond.
    pub fn scale(self, base: Duration) -> Duration {
        // float -> int casts saturate, so huge results clamp instead of wrapping
        Duration::from_nanos((base.as_nanos() as f64 / self.0).round() as u64)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f64> for Speed {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Speed> for f64 {
    fn from(value: Speed) -> Self {
        value.0
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Unscaled typing animation length for a turn, `None` for summary turns
/// which skip the typing phase.
pub fn base_typing_duration(speaker: Speaker, text_len: usize) -> Option<Duration> {
    let (per_char, cap) = match speaker {
        Speaker::Customer => (CUSTOMER_MS_PER_CHAR, CUSTOMER_TYPING_CAP),
        Speaker::Agent => (AGENT_MS_PER_CHAR, AGENT_TYPING_CAP),
        Speaker::Summary => return None,
    };
    let raw = Duration::from_millis(per_char.saturating_mul(text_len as u64));
    Some(raw.min(cap))
}

/// Typing animation length at `speed`.
pub fn typing_duration(speaker: Speaker, text_len: usize, speed: Speed) -> Option<Duration> {
    base_typing_duration(speaker, text_len).map(|d| speed.scale(d))
}
