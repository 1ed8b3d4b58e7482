//! Line builders for the transcript pane and the agent panel.

use super::TuiPalette;
use crate::playback::{
    AgentActivity, AgentBanner, AgentStatus, TranscriptEntry, TurnPhase, TurnView,
};
use crate::roster::{self, AgentColor};
use crate::script::{Speaker, SummaryPayload};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

/// Frames of the three-dot typing indicator.
const TYPING_FRAMES: [&str; 3] = [
    "\u{25cf}\u{00b7}\u{00b7}",
    "\u{00b7}\u{25cf}\u{00b7}",
    "\u{00b7}\u{00b7}\u{25cf}",
];

pub fn typing_indicator(tick: u64) -> &'static str {
    TYPING_FRAMES[(tick % TYPING_FRAMES.len() as u64) as usize]
}

/// Pad `s` with spaces to `width` display columns.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

fn speaker_name(view: &TurnView) -> String {
    match view.speaker {
        Speaker::Customer => "Customer".to_string(),
        Speaker::Summary => "Summary".to_string(),
        Speaker::Agent => match view.agent.as_deref() {
            Some(label) => {
                let entry = roster::lookup(label);
                if entry.id.is_known() {
                    entry.short_name.to_string()
                } else {
                    label.to_string()
                }
            }
            None => "Agent".to_string(),
        },
    }
}

fn speaker_style(view: &TurnView, palette: &TuiPalette) -> Style {
    match view.speaker {
        Speaker::Customer => palette.customer_style(),
        Speaker::Summary => palette.title_style(),
        Speaker::Agent => {
            let color = view
                .agent
                .as_deref()
                .map(|label| roster::lookup(label).color)
                .unwrap_or(AgentColor::Gray);
            palette.agent_style(color).add_modifier(Modifier::BOLD)
        }
    }
}

fn banner_lines(banner: &AgentBanner, palette: &TuiPalette) -> Vec<Line<'static>> {
    let style = palette.agent_style(banner.entry.color).add_modifier(Modifier::BOLD);
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "\u{2500}\u{2500} {} {} \u{2500}\u{2500}",
                banner.entry.icon,
                banner.display_name()
            ),
            style,
        )),
        Line::from(Span::styled(format!("   {}", banner.description()), palette.muted_style())),
        Line::from(Span::styled(
            format!("   {}", banner.reasoning()),
            palette.muted_style().add_modifier(Modifier::ITALIC),
        )),
    ]
}

fn summary_lines(payload: &SummaryPayload, palette: &TuiPalette) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("\u{250f} {}", payload.title), palette.title_style())),
    ];
    let label_width = payload
        .metrics
        .iter()
        .map(|m| m.label.width())
        .max()
        .unwrap_or(0);
    for metric in &payload.metrics {
        let mut spans = vec![
            Span::styled("\u{2503} ".to_string(), palette.border_style()),
            Span::styled(pad_to_width(&metric.label, label_width), palette.muted_style()),
            Span::raw("  "),
            Span::styled(metric.value.clone(), palette.value_style()),
        ];
        if let Some(detail) = &metric.detail {
            spans.push(Span::styled(format!("  ({})", detail), palette.muted_style()));
        }
        lines.push(Line::from(spans));
    }
    if let Some(outcome) = &payload.outcome {
        lines.push(Line::from(vec![
            Span::styled("\u{2517} ".to_string(), palette.border_style()),
            Span::styled(outcome.clone(), palette.success_style()),
        ]));
    }
    lines
}

fn turn_lines(
    view: &TurnView,
    tick: u64,
    show_timestamps: bool,
    palette: &TuiPalette,
) -> Vec<Line<'static>> {
    let mut prefix = Vec::new();
    if show_timestamps {
        if let Some(at) = view.revealed_at {
            prefix.push(Span::styled(format!("{} ", at.format("%H:%M:%S")), palette.muted_style()));
        }
    }
    prefix.push(Span::styled(format!("{}: ", speaker_name(view)), speaker_style(view, palette)));

    match view.phase {
        TurnPhase::Waiting => Vec::new(),
        TurnPhase::Typing => {
            prefix.push(Span::styled(typing_indicator(tick).to_string(), palette.muted_style()));
            vec![Line::from(prefix)]
        }
        TurnPhase::Revealed => {
            if let Some(payload) = &view.summary {
                return summary_lines(payload, palette);
            }
            let mut text = view.text.lines();
            let first = text.next().unwrap_or_default();
            prefix.push(Span::raw(first.to_string()));
            let mut lines = vec![Line::from(prefix)];
            lines.extend(text.map(|rest| Line::from(format!("  {}", rest))));
            lines
        }
    }
}

/// Everything the transcript pane shows, in order.
pub fn transcript_lines(
    entries: &[TranscriptEntry],
    tick: u64,
    show_timestamps: bool,
    palette: &TuiPalette,
) -> Vec<Line<'static>> {
    entries
        .iter()
        .flat_map(|entry| match entry {
            TranscriptEntry::Banner(banner) => banner_lines(banner, palette),
            TranscriptEntry::Turn(view) => turn_lines(view, tick, show_timestamps, palette),
        })
        .collect()
}

/// One row per roster entry: status glyph, icon, short name.
pub fn agent_lines(agents: &[AgentActivity], palette: &TuiPalette) -> Vec<Line<'static>> {
    agents
        .iter()
        .map(|activity| {
            let (glyph, style) = match activity.status {
                AgentStatus::Completed => ("\u{2714}", palette.success_style()),
                AgentStatus::Active => (
                    "\u{25b6}",
                    palette.agent_style(activity.entry.color).add_modifier(Modifier::BOLD),
                ),
                AgentStatus::Pending => ("\u{25cb}", palette.muted_style()),
            };
            Line::from(vec![
                Span::styled(format!("{} ", glyph), style),
                Span::raw(format!("{} ", activity.entry.icon)),
                Span::styled(activity.entry.short_name.to_string(), style),
            ])
        })
        .collect()
}
