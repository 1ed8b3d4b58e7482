//! Transcript view-model
//!
//! What the transcript pane shows, rebuilt from playback events: banners,
//! chat turns in their current phase and summary cards.

use super::marker::AgentBanner;
use super::turn::TurnPhase;
use super::PlaybackEvent;
use crate::script::{Script, Speaker, SummaryPayload};
use chrono::{DateTime, Local};

/// One displayed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnView {
    pub index: usize,
    pub speaker: Speaker,
    pub agent: Option<String>,
    pub text: String,
    pub summary: Option<SummaryPayload>,
    pub phase: TurnPhase,
    pub revealed_at: Option<DateTime<Local>>,
}

impl TurnView {
    /// Text visible right now; nothing until the turn is revealed.
    pub fn visible_text(&self) -> Option<&str> {
        (self.phase == TurnPhase::Revealed).then_some(self.text.as_str())
    }

    pub fn is_typing(&self) -> bool {
        self.phase == TurnPhase::Typing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Banner(AgentBanner),
    Turn(TurnView),
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the view. `script` is the live session's script.
    pub fn apply(&mut self, event: &PlaybackEvent, script: Option<&Script>) {
        match event {
            PlaybackEvent::SessionStarted { .. } | PlaybackEvent::SessionAborted { .. } => {
                self.clear();
            }
            PlaybackEvent::BannerInserted(banner) => {
                self.entries.push(TranscriptEntry::Banner(banner.clone()));
            }
            PlaybackEvent::TurnPhaseChanged { index, phase } => {
                if let Some(view) = self.turn_mut(*index) {
                    view.phase = *phase;
                    if *phase == TurnPhase::Revealed {
                        view.revealed_at = Some(Local::now());
                    }
                    return;
                }
                let Some(turn) = script.and_then(|s| s.get(*index)) else {
                    return;
                };
                self.entries.push(TranscriptEntry::Turn(TurnView {
                    index: *index,
                    speaker: turn.speaker,
                    agent: turn.agent.clone(),
                    text: turn.text.clone(),
                    summary: turn.summary.clone(),
                    phase: *phase,
                    revealed_at: None,
                }));
            }
            _ => {}
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Index of the turn showing the typing indicator.
    pub fn typing(&self) -> Option<usize> {
        self.turns().find(|t| t.is_typing()).map(|t| t.index)
    }

    pub fn turns(&self) -> impl Iterator<Item = &TurnView> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Turn(view) => Some(view),
            TranscriptEntry::Banner(_) => None,
        })
    }

    pub fn banners(&self) -> impl Iterator<Item = &AgentBanner> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Banner(banner) => Some(banner),
            TranscriptEntry::Turn(_) => None,
        })
    }

    fn turn_mut(&mut self, index: usize) -> Option<&mut TurnView> {
        self.entries.iter_mut().rev().find_map(|entry| match entry {
            TranscriptEntry::Turn(view) if view.index == index => Some(view),
            _ => None,
        })
    }
}
