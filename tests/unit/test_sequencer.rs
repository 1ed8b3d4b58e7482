//! Sequencer behaviour over a bare scheduler
//!
//! Tests cover:
//! - Reveal order and handoff pacing
//! - Banner placement
//! - Stale timers after teardown
//! - Speed captured at schedule time

use disputecast::playback::{
    PlaybackEvent, Scheduler, SessionStatus, Speed, Timer, TranscriptSequencer, TurnPhase,
};
use disputecast::script::{Script, SummaryPayload, Turn};
use std::sync::Arc;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn dispute() -> Arc<Script> {
    Arc::new(Script::new(
        "dispute",
        "Dispute",
        vec![
            Turn::customer("There is a charge I don't recognise", 300),
            Turn::agent("Intake Agent", "Let me open a case", 300),
            Turn::agent("Intake Agent", "Case opened", 300),
            Turn::agent("Fraud Detection Agent", "Checking signals", 300),
            Turn::customer("Thanks", 300),
            Turn::summary(SummaryPayload::new("Resolved").metric("Credit", "$20"), 300),
        ],
    ))
}

/// Fire every timer, recording (virtual time, event) pairs.
fn run_all(
    seq: &mut TranscriptSequencer,
    sched: &mut Scheduler<Timer>,
    speed: Speed,
) -> Vec<(Duration, PlaybackEvent)> {
    let mut log: Vec<(Duration, PlaybackEvent)> = seq
        .drain_events()
        .into_iter()
        .map(|e| (sched.now(), e))
        .collect();
    while let Some(timer) = sched.pop_next() {
        seq.handle_timer(timer, speed, sched);
        let now = sched.now();
        log.extend(seq.drain_events().into_iter().map(|e| (now, e)));
    }
    log
}

#[test]
fn test_every_turn_revealed_once_in_order() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    let log = run_all(&mut seq, &mut sched, Speed::NORMAL);

    let revealed: Vec<usize> = log
        .iter()
        .filter_map(|(_, e)| match e {
            PlaybackEvent::TurnRevealed { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(revealed, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(seq.status(), SessionStatus::Completed);
    assert_eq!(seq.current_index(), Some(6));
}

#[test]
fn test_reveal_times_strictly_increase() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    let log = run_all(&mut seq, &mut sched, Speed::NORMAL);

    let times: Vec<Duration> = log
        .iter()
        .filter(|(_, e)| matches!(e, PlaybackEvent::TurnRevealed { .. }))
        .map(|(t, _)| *t)
        .collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_banners_once_per_agent_run() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    let log = run_all(&mut seq, &mut sched, Speed::NORMAL);

    let banners: Vec<(usize, String)> = log
        .iter()
        .filter_map(|(_, e)| match e {
            PlaybackEvent::BannerInserted(b) => Some((b.index, b.label.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        banners,
        vec![
            (1, "Intake Agent".to_string()),
            (3, "Fraud Detection Agent".to_string())
        ]
    );
}

#[test]
fn test_summary_turn_skips_typing() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    let log = run_all(&mut seq, &mut sched, Speed::NORMAL);

    let phases: Vec<TurnPhase> = log
        .iter()
        .filter_map(|(_, e)| match e {
            PlaybackEvent::TurnPhaseChanged { index: 5, phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![TurnPhase::Waiting, TurnPhase::Revealed]);
}

#[test]
fn test_completion_signalled_after_scaled_cooldown() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    let speed = Speed::new(0.5);
    seq.start(dispute(), speed, &mut sched);
    let log = run_all(&mut seq, &mut sched, speed);

    let last_reveal = log
        .iter()
        .filter(|(_, e)| matches!(e, PlaybackEvent::TurnRevealed { .. }))
        .map(|(t, _)| *t)
        .max()
        .unwrap();
    let completed: Vec<Duration> = log
        .iter()
        .filter(|(_, e)| matches!(e, PlaybackEvent::SessionCompleted { .. }))
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(completed, vec![last_reveal + ms(2000)]);
}

#[test]
fn test_abort_cancels_pending_timers() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    if let Some(timer) = sched.pop_next() {
        seq.handle_timer(timer, Speed::NORMAL, &mut sched);
    }
    assert!(!sched.is_empty());

    seq.abort(&mut sched);
    assert!(sched.is_empty());
    assert!(!seq.has_session());
    assert!(seq.revealed().is_empty());
}

#[test]
fn test_timer_from_old_epoch_is_ignored() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    let stale = Timer::Turn {
        epoch: seq.epoch(),
        index: 0,
        step: disputecast::playback::TurnStep::Wait,
    };

    seq.start(dispute(), Speed::NORMAL, &mut sched);
    seq.drain_events();
    seq.handle_timer(stale, Speed::NORMAL, &mut sched);
    assert!(seq.drain_events().is_empty());
    assert_eq!(seq.current_phase(), Some((0, TurnPhase::Waiting)));
}

#[test]
fn test_pending_wait_keeps_speed_it_was_scheduled_with() {
    let mut sched = Scheduler::new();
    let mut seq = TranscriptSequencer::new();
    seq.start(dispute(), Speed::NORMAL, &mut sched);
    // initial delay was scheduled at 1x
    assert_eq!(sched.next_deadline(), Some(ms(300)));

    // the typing wait is scheduled after the speed change
    let timer = sched.pop_next().unwrap();
    seq.handle_timer(timer, Speed::new(2.0), &mut sched);
    // 35 chars * 20ms = 700ms at 1x, 350ms at 2x
    assert_eq!(sched.next_deadline(), Some(ms(650)));
}
