//! Disputecast Terminal UI
//!
//! ratatui host for a [`PlaybackHandle`]: transcript pane, agent panel,
//! scenario list and status bar.

mod app;
mod widgets;

pub use app::App;
pub use widgets::{agent_lines, transcript_lines, typing_indicator};

use crate::config::UiConfig;
use crate::playback::PlaybackHandle;
use crate::roster::AgentColor;
use crate::script::ScenarioLibrary;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    Terminal,
};
use std::io::{self, Stdout};
use tracing::info;

/// Key poll timeout; also the redraw cadence of the typing indicator.
const POLL_MS: u64 = 120;

/// Colors for the TUI. `mono` drops every foreground color.
#[derive(Debug, Clone, Copy, Default)]
pub struct TuiPalette {
    pub mono: bool,
}

impl TuiPalette {
    pub const NAVY: Color = Color::Rgb(30, 58, 95);
    pub const SLATE: Color = Color::Rgb(100, 116, 139);
    pub const SKY: Color = Color::Rgb(125, 180, 230);
    pub const MINT: Color = Color::Rgb(110, 200, 150);
    pub const GOLD: Color = Color::Rgb(230, 185, 90);
    pub const SNOW: Color = Color::Rgb(241, 245, 249);

    pub fn from_theme(theme: &str) -> Self {
        Self {
            mono: matches!(theme.to_lowercase().as_str(), "mono" | "monochrome" | "none"),
        }
    }

    fn fg(&self, color: Color) -> Style {
        if self.mono {
            Style::default()
        } else {
            Style::default().fg(color)
        }
    }

    pub fn agent_color(color: AgentColor) -> Color {
        match color {
            AgentColor::Blue => Color::Rgb(96, 165, 250),
            AgentColor::Purple => Color::Rgb(167, 139, 250),
            AgentColor::Red => Color::Rgb(248, 113, 113),
            AgentColor::Amber => Color::Rgb(251, 191, 36),
            AgentColor::Green => Color::Rgb(74, 222, 128),
            AgentColor::Teal => Color::Rgb(45, 212, 191),
            AgentColor::Gray => Self::SLATE,
        }
    }

    pub fn agent_style(&self, color: AgentColor) -> Style {
        self.fg(Self::agent_color(color))
    }

    pub fn title_style(&self) -> Style {
        self.fg(Self::GOLD).add_modifier(Modifier::BOLD)
    }

    pub fn customer_style(&self) -> Style {
        self.fg(Self::SKY).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        if self.mono {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
                .bg(Self::NAVY)
                .fg(Self::SNOW)
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn success_style(&self) -> Style {
        self.fg(Self::MINT)
    }

    pub fn value_style(&self) -> Style {
        self.fg(Self::SNOW).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        self.fg(Self::SLATE)
    }

    pub fn border_style(&self) -> Style {
        self.fg(Self::SLATE)
    }
}

/// Terminal wrapper for TUI operations
pub struct TuiTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiTerminal {
    /// Create and initialize the terminal
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Restore terminal to normal state
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TuiTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Header, main content, status bar
pub fn standard_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Transcript on the left, panels on the right
pub fn split_layout(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent),
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Read next terminal event with timeout
pub fn read_event(timeout_ms: u64) -> Result<Option<Event>> {
    if event::poll(std::time::Duration::from_millis(timeout_ms))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Check for specific key press
pub fn is_key(event: &Event, key: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(
        event,
        Event::Key(k) if k.code == key && k.modifiers == modifiers
    )
}

/// Check for quit keys (q, Esc, Ctrl+C)
pub fn is_quit(event: &Event) -> bool {
    is_key(event, KeyCode::Char('q'), KeyModifiers::NONE)
        || is_key(event, KeyCode::Esc, KeyModifiers::NONE)
        || is_key(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
}

/// Run the interactive player until the user quits or a shutdown signal
/// arrives. Needs the multi-threaded tokio runtime.
pub async fn run(handle: &PlaybackHandle, library: &ScenarioLibrary, ui: &UiConfig) -> Result<()> {
    let mut terminal = TuiTerminal::new()?;
    let mut app = App::new(handle.snapshot(), library, ui);
    info!("TUI started");

    loop {
        if crate::is_shutdown_requested() {
            break;
        }
        app.update(handle.snapshot());
        terminal.terminal().draw(|frame| app.render(frame))?;

        let event = tokio::task::block_in_place(|| read_event(POLL_MS))?;
        if let Some(event) = event {
            if is_quit(&event) {
                break;
            }
            if let Event::Key(key) = event {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = app.on_key(key.code) {
                        handle.send(command).await?;
                    }
                }
            }
        }
        app.tick();
    }

    terminal.restore()?;
    info!("TUI stopped");
    Ok(())
}
