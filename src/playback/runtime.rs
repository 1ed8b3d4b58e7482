//! Real-time driver for a [`Stage`].
//!
//! One tokio task owns the stage. It sleeps until the next scheduler
//! deadline, maps tokio time onto the stage's virtual clock, and applies
//! host commands between timers. Snapshots go out on a `watch` channel and
//! events on a `broadcast` channel.

use super::stage::{Stage, StageSnapshot};
use super::PlaybackEvent;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

/// Host input to a running stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectScenario(String),
    /// Select by 0-based library position
    SelectNth(usize),
    TogglePlayPause,
    Restart,
    SetSpeed(f64),
    SpeedUp,
    SlowDown,
}

pub struct PlaybackRuntime;

impl PlaybackRuntime {
    /// Move `stage` onto a new task. Must be called inside a tokio runtime.
    pub fn spawn(stage: Stage) -> PlaybackHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(stage.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(drive(
            stage,
            command_rx,
            snapshot_tx,
            event_tx.clone(),
            cancel.clone(),
        ));

        PlaybackHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
            cancel,
            task,
        }
    }
}

async fn drive(
    mut stage: Stage,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<StageSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
    cancel: CancellationToken,
) -> Stage {
    let origin = Instant::now();
    let base = stage.now();
    let virtual_now = |origin: Instant| base + origin.elapsed();

    publish(&mut stage, &snapshots, &events);
    loop {
        let deadline = stage.next_deadline();
        let wake = deadline.map(|d| origin + d.saturating_sub(base));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Playback runtime cancelled");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("Command channel closed");
                    break;
                };
                stage.advance_to(virtual_now(origin));
                debug!(?command, "Applying command");
                stage.apply(command);
            }
            _ = sleep_until_opt(wake) => {
                // tokio may wake a hair early relative to our virtual clock
                let now = virtual_now(origin).max(deadline.unwrap_or_default());
                stage.advance_to(now);
            }
        }
        publish(&mut stage, &snapshots, &events);
    }
    stage
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn publish(
    stage: &mut Stage,
    snapshots: &watch::Sender<StageSnapshot>,
    events: &broadcast::Sender<PlaybackEvent>,
) {
    snapshots.send_replace(stage.snapshot());
    for event in stage.drain_events() {
        // no subscribers is fine
        let _ = events.send(event);
    }
}

/// Host side of a spawned stage.
pub struct PlaybackHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<StageSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Stage>,
}

impl PlaybackHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .context("Playback runtime is no longer running")
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(Command::TogglePlayPause).await
    }

    pub async fn restart(&self) -> Result<()> {
        self.send(Command::Restart).await
    }

    pub async fn select_scenario(&self, id: &str) -> Result<()> {
        self.send(Command::SelectScenario(id.to_string())).await
    }

    pub async fn set_speed(&self, multiplier: f64) -> Result<()> {
        self.send(Command::SetSpeed(multiplier)).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> StageSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<StageSnapshot> {
        self.snapshots.clone()
    }

    /// Events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task and take the stage back.
    pub async fn shutdown(self) -> Result<Stage> {
        self.cancel.cancel();
        self.task.await.context("Playback task panicked")
    }

    /// Like [`shutdown`](Self::shutdown) but gives up after `timeout`.
    pub async fn shutdown_timeout(self, timeout: Duration) -> Result<Stage> {
        tokio::time::timeout(timeout, self.shutdown())
            .await
            .context("Playback task did not stop in time")?
    }
}
