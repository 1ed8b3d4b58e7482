//! Disputecast - Scripted Multi-Agent Dispute Walkthrough
//!
//! Plays a pre-written conversation between a bank customer and a team of
//! simulated agents with human-like pacing:
//!
//! - **Script**: scenario library of immutable, ordered dialogue turns
//! - **Playback**: turn sequencer, per-turn typing pipeline, agent banners
//! - **Transport**: play/pause/restart/speed/scenario selection
//! - **Agent panel**: completed/active/pending status for every roster entry
//! - **Hosts**: ratatui terminal UI and a plain line-by-line transcript
//!
//! # Quick Start
//!
//! ```ignore
//! use disputecast::playback::Stage;
//! use disputecast::script::ScenarioLibrary;
//! use std::time::Duration;
//!
//! let mut stage = Stage::new(ScenarioLibrary::builtin(), &Default::default())?;
//! stage.select_scenario("unauthorized-charge");
//! stage.toggle_play_pause();
//! stage.advance(Duration::from_secs(5));
//! println!("{:?}", stage.snapshot().status);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

// ─── Core ──────────────────────────────────────────────────────────
pub mod playback;
pub mod roster;
pub mod script;

// ─── Application ───────────────────────────────────────────────────
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod output;
pub mod tui;

pub use observability::telemetry;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask every host loop (TUI, plain transcript) to wind down.
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Whether a shutdown signal has been received.
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
