//! The tokio driver, on tokio's paused clock.

use disputecast::config::PlaybackConfig;
use disputecast::playback::{Command, PlaybackEvent, PlaybackRuntime, SessionStatus, Stage};
use disputecast::script::{ScenarioLibrary, Script, Turn};
use std::time::Duration;
use tokio::time::Instant;

fn library() -> ScenarioLibrary {
    let mut library = ScenarioLibrary::new();
    library
        .insert(Script::new(
            "one",
            "One",
            vec![Turn::customer("abc", 100), Turn::customer("def", 100)],
        ))
        .unwrap();
    library
        .insert(Script::new(
            "two",
            "Two",
            vec![Turn::agent("Resolution Agent", "Credited", 100)],
        ))
        .unwrap();
    library
}

fn stage(autoplay: bool) -> Stage {
    let config = PlaybackConfig {
        autoplay,
        ..Default::default()
    };
    Stage::new(library(), &config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_stage_runs_without_commands() {
    let handle = PlaybackRuntime::spawn(stage(true));
    let mut watch = handle.watch();
    let start = Instant::now();

    // wait until auto-stop flips the transport
    loop {
        watch.changed().await.unwrap();
        if !watch.borrow().transport.is_playing {
            break;
        }
    }
    // 100 + 60 + 700 | 100 + 60 + 700 | 1000 | 2000
    assert_eq!(start.elapsed(), Duration::from_millis(4720));
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_speed_applies_to_later_waits() {
    let handle = PlaybackRuntime::spawn(stage(false));
    let mut events = handle.subscribe();
    let start = Instant::now();
    handle.send(Command::SetSpeed(2.0)).await.unwrap();
    handle.send(Command::TogglePlayPause).await.unwrap();

    loop {
        if let PlaybackEvent::SessionCompleted { .. } = events.recv().await.unwrap() {
            break;
        }
    }
    // every wait halved: (50 + 30 + 350) * 2 + 500
    assert_eq!(start.elapsed(), Duration::from_millis(1360));
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_select_while_playing_is_ignored() {
    let handle = PlaybackRuntime::spawn(stage(true));
    handle.select_scenario("two").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.transport.selected_scenario, "one");
    assert_eq!(snap.status, SessionStatus::Running);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_restart_via_handle_begins_new_epoch() {
    let handle = PlaybackRuntime::spawn(stage(true));
    tokio::time::sleep(Duration::from_millis(500)).await;
    let before = handle.snapshot().epoch;
    handle.restart().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.epoch, before + 1);
    assert!(snap.revealed.is_empty());
    let stage = handle.shutdown().await.unwrap();
    assert_eq!(stage.sequencer().epoch(), before + 1);
}

#[test]
fn test_runtime_on_current_thread_with_tokio_test() {
    tokio_test::block_on(async {
        let handle = PlaybackRuntime::spawn(stage(false));
        handle.send(Command::SpeedUp).await.unwrap();
        let stage = handle.shutdown().await.unwrap();
        assert_eq!(stage.transport().speed.get(), 1.5);
    });
}
