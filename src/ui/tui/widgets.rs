//! Landing page widgets
//!
//! Falling emoji, the icon prompt, splash payloads and the revealed content.

use super::TuiPalette;
use crate::config::ContentConfig;
use crate::sequencing::{IntroView, Particle};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Particles falling linearly from the top edge over their lifetime
pub struct FallingField<'a> {
    particles: &'a [Particle],
    now: Duration,
}

impl<'a> FallingField<'a> {
    pub fn new(particles: &'a [Particle], now: Duration) -> Self {
        Self { particles, now }
    }
}

impl Widget for FallingField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for particle in self.particles {
            let glyph_width = particle.symbol.width().max(1) as u16;
            if glyph_width > area.width {
                continue;
            }
            let offset = (particle.horizontal_position / 100.0 * area.width as f64) as u16;
            let x = (area.x + offset).min(area.right() - glyph_width);

            let row = (particle.progress(self.now) * area.height as f64) as u16;
            let y = area.y + row.min(area.height - 1);

            buf.set_string(x, y, &particle.symbol, Style::default());
        }
    }
}

/// "Pick one" prompt with the cycling highlight
pub struct ChoicePrompt<'a> {
    view: &'a IntroView,
}

impl<'a> ChoicePrompt<'a> {
    pub fn new(view: &'a IntroView) -> Self {
        Self { view }
    }
}

impl Widget for ChoicePrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut icons = Vec::new();
        let mut keys = Vec::new();
        for (i, choice) in self.view.choices.iter().enumerate() {
            let style = if i == self.view.selection_highlight_index {
                TuiPalette::highlight_style()
            } else {
                Style::default()
            };
            icons.push(Span::styled(format!("  {}  ", choice), style));
            keys.push(Span::styled(
                format!("{:^width$}", i + 1, width = choice.width() + 4),
                TuiPalette::muted_style(),
            ));
        }

        let lines = vec![
            Line::from(Span::styled("pick one", TuiPalette::title_style())),
            Line::default(),
            Line::from(icons),
            Line::from(keys),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(framed())
            .render(area, buf);
    }
}

/// Payload of the current splash step
pub struct StepPayload<'a> {
    payload: &'a str,
    step: usize,
    total: usize,
}

impl<'a> StepPayload<'a> {
    pub fn new(payload: &'a str, step: usize, total: usize) -> Self {
        Self {
            payload,
            step,
            total,
        }
    }
}

impl Widget for StepPayload<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(self.payload, TuiPalette::title_style())),
            Line::default(),
            Line::from(Span::styled(
                format!("{}/{}", self.step, self.total),
                TuiPalette::muted_style(),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(framed())
            .render(area, buf);
    }
}

/// Title, blurb and links shown once the intro is over
pub struct MainContent<'a> {
    content: &'a ContentConfig,
}

impl<'a> MainContent<'a> {
    pub fn new(content: &'a ContentConfig) -> Self {
        Self { content }
    }
}

impl Widget for MainContent<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled(
                self.content.title.as_str(),
                TuiPalette::title_style(),
            )),
            Line::from(Span::styled(
                self.content.subtitle.as_str(),
                TuiPalette::muted_style(),
            )),
            Line::default(),
            Line::from(self.content.blurb.as_str()),
            Line::default(),
        ];
        // one link per line, URL in full so the terminal can pick it up
        lines.extend(self.content.links.iter().map(|link| {
            Line::from(vec![
                Span::styled(link.label.as_str(), TuiPalette::link_style()),
                Span::raw(": "),
                Span::styled(link.url.as_str(), TuiPalette::muted_style()),
            ])
        }));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(framed())
            .render(area, buf);
    }
}

fn framed() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(TuiPalette::frame_style())
}

/// Rectangle of at most `width` x `height` centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width.min(area.width)),
            Constraint::Fill(1),
        ])
        .split(vertical[1]);
    horizontal[1]
}

/// Render a help bar with key hints
pub fn render_help_bar(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default()
                .fg(TuiPalette::PARCHMENT)
                .bg(TuiPalette::GOLD_DARK)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!(" {}", action), TuiPalette::muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
