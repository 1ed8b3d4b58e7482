//! Plain Output
//!
//! Line-by-line rendering for non-interactive use:
//! - `play --plain`: the transcript as turns are revealed
//! - `list`, `roster`, `validate`: tables and lint reports

use crate::playback::{AgentBanner, PlaybackEvent, PlaybackHandle};
use crate::roster::{self, AgentColor, AgentRosterEntry};
use crate::script::{ScenarioLibrary, Script, ScriptWarning, Speaker, SummaryPayload, Turn};
use anyhow::Result;
use colored::*;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// How often the plain loop checks for a shutdown request.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

fn agent_color(color: AgentColor) -> Color {
    match color {
        AgentColor::Blue => Color::BrightBlue,
        AgentColor::Purple => Color::Magenta,
        AgentColor::Red => Color::BrightRed,
        AgentColor::Amber => Color::Yellow,
        AgentColor::Green => Color::BrightGreen,
        AgentColor::Teal => Color::Cyan,
        AgentColor::Gray => Color::White,
    }
}

/// Agent introduction banner.
pub fn format_banner(banner: &AgentBanner) -> String {
    let color = agent_color(banner.entry.color);
    format!(
        "\n{} {} {}\n   {}\n   {}",
        "\u{2500}\u{2500}".color(color),
        banner.entry.icon,
        banner.display_name().color(color).bold(),
        banner.description().dimmed(),
        banner.reasoning().italic().dimmed(),
    )
}

/// Summary card with aligned metrics.
pub fn format_summary(payload: &SummaryPayload) -> String {
    let width = payload
        .metrics
        .iter()
        .map(|m| m.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("\n{} {}", "\u{250f}".yellow(), payload.title.yellow().bold());
    for metric in &payload.metrics {
        out.push_str(&format!(
            "\n{} {:<width$}  {}",
            "\u{2503}".yellow(),
            metric.label.dimmed(),
            metric.value.bold(),
            width = width
        ));
        if let Some(detail) = &metric.detail {
            out.push_str(&format!("  ({})", detail.dimmed()));
        }
    }
    if let Some(outcome) = &payload.outcome {
        out.push_str(&format!("\n{} {}", "\u{2517}".yellow(), outcome.bright_green()));
    }
    out
}

/// One revealed turn.
pub fn format_turn(turn: &Turn) -> String {
    match turn.speaker {
        Speaker::Summary => match &turn.summary {
            Some(payload) => format_summary(payload),
            None => format!("{} {}", "Summary:".yellow().bold(), turn.text),
        },
        Speaker::Customer => format!("{} {}", "Customer:".bright_cyan().bold(), turn.text),
        Speaker::Agent => {
            let (name, color) = match turn.agent_label() {
                Some(label) => {
                    let entry = roster::lookup(label);
                    let name = if entry.id.is_known() { entry.short_name } else { label };
                    (name, agent_color(entry.color))
                }
                None => ("Agent", Color::White),
            };
            format!("{} {}", format!("{}:", name).color(color).bold(), turn.text)
        }
    }
}

/// Text to print for one playback event, if any.
pub fn format_event(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::SessionStarted { scenario, turns, .. } => Some(format!(
            "{} {} ({} turns)",
            "\u{25b6}".bright_green(),
            scenario.bold(),
            turns
        )),
        PlaybackEvent::BannerInserted(banner) => Some(format_banner(banner)),
        PlaybackEvent::TurnRevealed { turn, .. } => Some(format_turn(turn)),
        PlaybackEvent::SessionCompleted { .. } => {
            Some(format!("\n{} Walkthrough complete", "\u{2713}".bright_green()))
        }
        PlaybackEvent::SessionAborted { .. } => {
            Some(format!("{} Playback reset", "\u{25a0}".dimmed()))
        }
        _ => None,
    }
}

/// Start playback and print the transcript until the controller
/// auto-stops, the runtime goes away, or a shutdown is requested.
pub async fn run_plain(handle: &PlaybackHandle) -> Result<()> {
    let mut events = handle.subscribe();
    handle.toggle_play_pause().await?;

    loop {
        if crate::is_shutdown_requested() {
            debug!("Shutdown requested, leaving plain output");
            break;
        }
        let event = match tokio::time::timeout(SHUTDOWN_POLL, events.recv()).await {
            Err(_) => continue,
            Ok(Ok(event)) => event,
            Ok(Err(RecvError::Lagged(skipped))) => {
                warn!(skipped, "Plain output fell behind, events skipped");
                continue;
            }
            Ok(Err(RecvError::Closed)) => break,
        };
        if let Some(text) = format_event(&event) {
            println!("{}", text);
        }
        if event == PlaybackEvent::AutoStopped {
            break;
        }
    }
    Ok(())
}

/// `list`: id, turn count and title per scenario.
pub fn print_scenarios(library: &ScenarioLibrary) {
    let width = library.iter().map(|s| s.id.len()).max().unwrap_or(0);
    for (i, script) in library.iter().enumerate() {
        println!(
            "{} {:<width$}  {:>3} turns  {}",
            format!("{}.", i + 1).dimmed(),
            script.id.bold(),
            script.len(),
            script.title,
            width = width
        );
        if !script.description.is_empty() {
            println!("   {}", script.description.dimmed());
        }
    }
}

fn roster_line(entry: &AgentRosterEntry) -> String {
    let color = agent_color(entry.color);
    format!(
        "{} {}\n   {}",
        entry.icon,
        entry.name.color(color).bold(),
        entry.description.dimmed()
    )
}

/// `roster`: the agent directory in workflow order.
pub fn print_roster() {
    for entry in roster::ROSTER.iter() {
        println!("{}", roster_line(entry));
    }
}

/// `validate`: outcome for one script file.
pub fn print_validation(script: &Script, warnings: &[ScriptWarning]) {
    println!(
        "{} {} ({} turns)",
        "\u{2713}".bright_green(),
        script.id.bold(),
        script.len()
    );
    for warning in warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
}
