//! Disputecast TUI Application
//!
//! Key handling and rendering over the latest [`StageSnapshot`].

use super::widgets::{agent_lines, transcript_lines};
use super::{split_layout, standard_layout, TuiPalette};
use crate::config::UiConfig;
use crate::playback::{Command, SessionStatus, StageSnapshot};
use crate::script::ScenarioLibrary;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// One row of the scenario picker
#[derive(Debug, Clone)]
struct ScenarioItem {
    id: String,
    title: String,
    turns: usize,
}

pub struct App {
    pub snapshot: StageSnapshot,
    scenarios: Vec<ScenarioItem>,
    palette: TuiPalette,
    show_timestamps: bool,
    /// Lines scrolled up from the bottom of the transcript
    pub scroll: usize,
    pub show_help: bool,
    /// Transient hint shown in the status bar
    pub notice: Option<String>,
    tick: u64,
}

impl App {
    pub fn new(snapshot: StageSnapshot, library: &ScenarioLibrary, ui: &UiConfig) -> Self {
        let scenarios = library
            .iter()
            .map(|s| ScenarioItem {
                id: s.id.clone(),
                title: s.title.clone(),
                turns: s.len(),
            })
            .collect();
        Self {
            snapshot,
            scenarios,
            palette: TuiPalette::from_theme(&ui.theme),
            show_timestamps: ui.show_timestamps,
            scroll: 0,
            show_help: false,
            notice: None,
            tick: 0,
        }
    }

    pub fn update(&mut self, snapshot: StageSnapshot) {
        if snapshot.epoch != self.snapshot.epoch {
            self.scroll = 0;
        }
        self.snapshot = snapshot;
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Map a key press to a transport command.
    pub fn on_key(&mut self, code: KeyCode) -> Option<Command> {
        self.notice = None;
        match code {
            KeyCode::Char(' ') => Some(Command::TogglePlayPause),
            KeyCode::Char('r') => Some(Command::Restart),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::SpeedUp),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(Command::SlowDown),
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                None
            }
            KeyCode::Char(c @ '1'..='9') => {
                let position = (c as usize) - ('1' as usize);
                if position >= self.scenarios.len() {
                    return None;
                }
                if self.snapshot.transport.is_playing {
                    self.notice = Some("Stop playback to switch scenarios".to_string());
                    return None;
                }
                Some(Command::SelectNth(position))
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::End => {
                self.scroll = 0;
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = standard_layout(frame.area());
        self.render_header(frame, chunks[0]);

        let (left, right) = split_layout(chunks[1], 68);
        self.render_transcript(frame, left);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(3)])
            .split(right);
        self.render_agents(frame, side[0]);
        self.render_scenarios(frame, side[1]);

        self.render_status_bar(frame, chunks[2]);

        if self.show_help {
            self.render_help(frame, frame.area());
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = if self.snapshot.scenario_title.is_empty() {
            " Disputecast ".to_string()
        } else {
            format!(" Disputecast \u{00b7} {} ", self.snapshot.scenario_title)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border_style())
            .title(Span::styled(title, self.palette.title_style()));
        let progress = format!(
            " {}/{} turns",
            self.snapshot.revealed.len(),
            self.snapshot.total_turns
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Span::styled(progress, self.palette.muted_style())),
            inner,
        );
    }

    fn render_transcript(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border_style())
            .title(" Conversation ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = transcript_lines(
            &self.snapshot.entries,
            self.tick,
            self.show_timestamps,
            &self.palette,
        );
        if lines.is_empty() {
            let hint = match self.snapshot.status {
                SessionStatus::Idle if self.snapshot.transport.pause_requested => {
                    "Paused. Press space to play from the start."
                }
                _ => "Press space to start the walkthrough.",
            };
            lines.push(Line::from(Span::styled(hint, self.palette.muted_style())));
        }

        // stick to the bottom unless scrolled up
        let height = inner.height as usize;
        let bottom = lines.len().saturating_sub(height);
        let offset = bottom.saturating_sub(self.scroll);
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((offset.min(u16::MAX as usize) as u16, 0));
        frame.render_widget(paragraph, inner);
    }

    fn render_agents(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border_style())
            .title(" Agents ");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(agent_lines(&self.snapshot.agents, &self.palette)),
            inner,
        );
    }

    fn render_scenarios(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.border_style())
            .title(" Scenarios ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .scenarios
            .iter()
            .enumerate()
            .take(9)
            .map(|(i, item)| {
                let text = format!("{} {} ({})", i + 1, item.title, item.turns);
                if item.id == self.snapshot.transport.selected_scenario {
                    Line::from(Span::styled(text, self.palette.selected_style()))
                } else {
                    Line::from(Span::raw(text))
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let transport = &self.snapshot.transport;
        let state = if !transport.is_playing {
            "\u{25a0} Stopped"
        } else if transport.pause_requested {
            "\u{23f8} Paused"
        } else {
            "\u{25b6} Playing"
        };
        let mut text = format!(" {} \u{2502} {} \u{2502} ", state, transport.speed);
        match &self.notice {
            Some(notice) => text.push_str(notice),
            None => text.push_str(
                "space play/pause \u{2502} r restart \u{2502} +/- speed \u{2502} 1-9 scenario \u{2502} ? help \u{2502} q quit",
            ),
        }
        frame.render_widget(Paragraph::new(text).style(self.palette.muted_style()), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let width = 52.min(area.width.saturating_sub(4));
        let height = 12.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 3;
        let popup = Rect::new(x, y, width, height);

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.title_style())
            .title(" Keys ");
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let lines = vec![
            Line::from("space   play / pause (resume restarts)"),
            Line::from("r       restart from the first turn"),
            Line::from("+ / -   faster / slower"),
            Line::from("1-9     pick a scenario (while stopped)"),
            Line::from("\u{2191} / \u{2193}   scroll the conversation"),
            Line::from("end     jump to latest"),
            Line::from("?       toggle this help"),
            Line::from("q       quit"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
