//! Terminal front end
//!
//! Renders a landing page with ratatui: falling emoji in the background, the
//! intro prompt or step payload in a gilded frame, then the main content.
//! The page is advanced on every frame from a wall clock started at mount.

mod widgets;

pub use widgets::{centered_rect, render_help_bar, ChoicePrompt, FallingField, MainContent, StepPayload};

use crate::config::{Config, ContentConfig};
use crate::errors::CoinfallError;
use crate::sequencing::{IntroPhase, LandingPage, PageEvent, PageView};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

/// Redraw interval
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Gilded-frame palette
pub struct TuiPalette;

impl TuiPalette {
    pub const GOLD: Color = Color::Rgb(234, 179, 8);
    pub const GOLD_DARK: Color = Color::Rgb(202, 138, 4);
    pub const GOLD_LIGHT: Color = Color::Rgb(253, 224, 71);
    pub const PARCHMENT: Color = Color::Rgb(254, 250, 224);
    pub const INK: Color = Color::Rgb(31, 41, 55);
    pub const MUTED: Color = Color::Rgb(128, 128, 128);

    pub fn title_style() -> Style {
        Style::default()
            .fg(Self::GOLD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style() -> Style {
        Style::default()
            .bg(Self::GOLD_LIGHT)
            .fg(Self::INK)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style() -> Style {
        Style::default().fg(Self::MUTED)
    }

    pub fn link_style() -> Style {
        Style::default()
            .fg(Self::GOLD_DARK)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn frame_style() -> Style {
        Style::default().fg(Self::GOLD_DARK)
    }
}

/// Terminal wrapper for TUI operations
pub struct TuiTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiTerminal {
    /// Create and initialize the terminal
    pub fn new() -> Result<Self> {
        enable_raw_mode().map_err(|e| CoinfallError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Restore the terminal before the panic message is printed, otherwise
        // it lands on the alternate screen in raw mode and is lost.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

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

/// Read next terminal event with timeout
pub fn read_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Check for quit keys (q, Esc, Ctrl+C)
pub fn is_quit(event: &Event) -> bool {
    match event {
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            matches!(k.code, KeyCode::Char('q') | KeyCode::Esc)
                || (k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL))
        }
        _ => false,
    }
}

/// Map a key press to an icon choice while the intro awaits one.
///
/// Digits pick by position; Enter or Space takes the highlighted icon.
pub fn choice_for(event: &Event, view: &PageView) -> Option<usize> {
    let intro = view.intro.as_ref()?;
    if intro.phase != IntroPhase::AwaitingChoice {
        return None;
    }
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10)? as usize - 1;
            (index < intro.choices.len()).then_some(index)
        }
        KeyCode::Enter | KeyCode::Char(' ') => Some(intro.selection_highlight_index),
        _ => None,
    }
}

/// Draw one frame of the page
pub fn render_page(frame: &mut Frame, view: &PageView, content: &ContentConfig, total_steps: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Caption
            Constraint::Min(8),    // Stage
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    frame.render_widget(FallingField::new(&view.particles, view.elapsed), chunks[1]);

    let panel = centered_rect(chunks[1], 48, 12);
    let hints: &[(&str, &str)] = match &view.intro {
        Some(intro) => match (intro.phase, intro.payload.as_deref()) {
            (IntroPhase::AwaitingChoice, _) => {
                frame.render_widget(ChoicePrompt::new(intro), panel);
                &[("1-9", "pick"), ("Enter", "pick highlighted"), ("q", "quit")]
            }
            (_, Some(payload)) => {
                frame.render_widget(StepPayload::new(payload, intro.step, total_steps), panel);
                &[("q", "quit")]
            }
            _ => &[("q", "quit")],
        },
        None => {
            if view.main_content_revealed {
                frame.render_widget(MainContent::new(content), panel);
            }
            &[("q", "quit")]
        }
    };

    if view.main_content_revealed {
        frame.render_widget(
            Paragraph::new(Line::from(content.caption.as_str()))
                .alignment(Alignment::Center)
                .style(TuiPalette::muted_style()),
            chunks[0],
        );
    }
    render_help_bar(frame, chunks[2], hints);
}

/// Run the page in the terminal until the user quits
pub fn run_page(config: &Config) -> Result<()> {
    let mut page = LandingPage::from_config(config);
    let mut terminal = TuiTerminal::new()?;

    let origin = Instant::now();
    log_events(&page.mount(Duration::ZERO));

    let result = event_loop(&mut terminal, &mut page, config, origin);

    // Unmount on every exit path so no timer or player outlives the screen
    log_events(&page.unmount());
    terminal.restore()?;
    result
}

fn event_loop(
    terminal: &mut TuiTerminal,
    page: &mut LandingPage,
    config: &Config,
    origin: Instant,
) -> Result<()> {
    let total_steps = config.intro.len();
    loop {
        log_events(&page.advance_to(origin.elapsed()));
        let view = page.view();

        terminal
            .terminal()
            .draw(|frame| render_page(frame, &view, &config.content, total_steps))?;

        let Some(event) = read_event(FRAME_INTERVAL)? else {
            continue;
        };
        if is_quit(&event) {
            return Ok(());
        }
        if let Some(index) = choice_for(&event, &view) {
            match page.on_user_choice(index, origin.elapsed()) {
                Ok(events) => log_events(&events),
                Err(e) => tracing::warn!(error = %e, "Choice rejected"),
            }
        }
    }
}

fn log_events(events: &[PageEvent]) {
    for event in events {
        tracing::debug!("{}", event);
    }
}
