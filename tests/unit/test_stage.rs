//! Stage wiring: transport, reconciliation, panel and transcript.

use disputecast::config::PlaybackConfig;
use disputecast::playback::{
    AgentStatus, PlaybackEvent, SessionStatus, Stage, TranscriptEntry, TurnPhase,
};
use disputecast::script::ScenarioLibrary;
use std::time::Duration;

fn builtin_stage() -> Stage {
    Stage::new(ScenarioLibrary::builtin(), &PlaybackConfig::default()).unwrap()
}

#[test]
fn test_default_selection_is_first_builtin() {
    let stage = builtin_stage();
    assert_eq!(stage.transport().selected_scenario, "unauthorized-charge");
    assert!(!stage.transport().is_playing);
}

#[test]
fn test_each_builtin_plays_to_auto_stop() {
    for (position, id) in ["unauthorized-charge", "duplicate-charge", "undelivered-goods"]
        .iter()
        .enumerate()
    {
        let mut stage = builtin_stage();
        assert!(stage.select_nth(position));
        assert_eq!(stage.transport().selected_scenario, *id);
        let total = stage.snapshot().total_turns;
        stage.run_until_idle();

        let events = stage.drain_events();
        let revealed = events
            .iter()
            .filter(|e| matches!(e, PlaybackEvent::TurnRevealed { .. }))
            .count();
        assert_eq!(revealed, total, "{}", id);
        // auto-stop tears the session down
        assert!(matches!(events.last(), Some(PlaybackEvent::SessionAborted { .. })));
        assert!(events.contains(&PlaybackEvent::AutoStopped));
    }
}

#[test]
fn test_every_agent_completed_when_session_completes() {
    let mut stage = builtin_stage();
    stage.toggle_play_pause();
    while stage.sequencer().status() != SessionStatus::Completed {
        let next = stage.next_deadline().unwrap();
        stage.advance_to(next);
    }
    let snap = stage.snapshot();
    assert!(snap.agents.iter().all(|a| a.status == AgentStatus::Completed));
    assert_eq!(snap.active_agent, None);
    assert_eq!(snap.progress(), 1.0);
}

#[test]
fn test_transcript_shows_banners_before_agent_turns() {
    let mut stage = builtin_stage();
    stage.toggle_play_pause();
    stage.advance(Duration::from_secs(20));

    let entries = stage.snapshot().entries;
    for (i, entry) in entries.iter().enumerate() {
        if let TranscriptEntry::Banner(banner) = entry {
            match entries.get(i + 1) {
                Some(TranscriptEntry::Turn(view)) => assert_eq!(view.index, banner.index),
                other => panic!("banner not followed by its turn: {:?}", other),
            }
        }
    }
    assert!(entries.iter().any(|e| matches!(e, TranscriptEntry::Banner(_))));
}

#[test]
fn test_pause_then_resume_starts_over() {
    let mut stage = builtin_stage();
    stage.toggle_play_pause();
    stage.advance(Duration::from_secs(8));
    assert!(!stage.sequencer().revealed().is_empty());

    stage.toggle_play_pause();
    let snap = stage.snapshot();
    assert!(snap.transport.pause_requested);
    assert_eq!(snap.status, SessionStatus::Idle);
    assert!(snap.entries.is_empty());
    assert!(snap.agents.iter().all(|a| a.status == AgentStatus::Pending));

    stage.toggle_play_pause();
    assert!(stage.sequencer().revealed().is_empty());
    assert_eq!(stage.sequencer().current_phase(), Some((0, TurnPhase::Waiting)));
}

#[test]
fn test_restart_during_cooldown_ignores_old_auto_stop() {
    let mut stage = builtin_stage();
    stage.select_nth(1);
    while stage.sequencer().status() != SessionStatus::Completed {
        let next = stage.next_deadline().unwrap();
        stage.advance_to(next);
    }
    // completion + auto-stop window
    stage.advance(Duration::from_millis(1500));
    stage.restart();
    stage.advance(Duration::from_millis(2500));
    assert!(stage.transport().is_playing);
    assert_eq!(stage.sequencer().status(), SessionStatus::Running);
}

#[test]
fn test_unknown_scenario_is_rejected() {
    let mut stage = builtin_stage();
    assert!(!stage.select_scenario("lost-card"));
    assert!(!stage.transport().is_playing);
}
