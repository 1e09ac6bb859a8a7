//! Full-screen kiosk display.
//!
//! Takes over the terminal (raw mode, alternate screen, hidden cursor) and
//! draws three regions:
//!
//! ```text
//! ╭ Check-in Kiosk ──────────── http://host/checkin ╮
//! │ Success: Check-in successful                    │
//! ├─────────────────────────────────────────────────┤
//! │ STU456                               08:01:12   │
//! │ STU123                               08:00:03   │
//! ╰─────────────────────────────────────────────────╯
//!  Checked in: 2                          Esc: quit
//! ```
//!
//! The terminal is restored on [`Display::finish`], on drop, and on panic.

use std::io::{self, Stdout};
use std::panic;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::Backend;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph};

use super::{
    Display, DisplayError, Renderer, StatusLine, StatusNotifier, Theme, PLACEHOLDER,
};
use crate::checkin::SessionEntry;

/// Text shown while no notice is visible.
const IDLE_STATUS: &str = "Ready to scan.";

/// Everything the screen shows, independent of the terminal.
#[derive(Debug, Clone)]
pub struct KioskView {
    /// Header title.
    pub title: String,
    /// Endpoint shown in the header.
    pub endpoint: String,
    /// Current notice.
    pub status: StatusLine,
    /// Session log, most recent first.
    pub entries: Vec<SessionEntry>,
    /// Colour palette.
    pub theme: Theme,
}

impl KioskView {
    /// Create an empty view.
    #[must_use]
    pub fn new(title: &str, endpoint: &str, theme: Theme, clear_after: Duration) -> Self {
        Self {
            title: title.to_string(),
            endpoint: endpoint.to_string(),
            status: StatusLine::new(clear_after),
            entries: Vec::new(),
            theme,
        }
    }
}

struct ScreenInner<B: Backend> {
    terminal: Terminal<B>,
    view: KioskView,
}

/// Ratatui display for a dedicated kiosk terminal.
pub struct ScreenDisplay<B: Backend = CrosstermBackend<Stdout>> {
    inner: Mutex<ScreenInner<B>>,
    owns_terminal: bool,
}

impl ScreenDisplay<CrosstermBackend<Stdout>> {
    /// Take over stdout and draw the initial screen.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Io`] if the terminal cannot be set up.
    pub fn open(view: KioskView) -> Result<Self, DisplayError> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));

        // Raw mode may already be on when a later step fails.
        let opened = setup_terminal().and_then(|terminal| Self::with_terminal(terminal, view));
        let mut display = restore_on_error(opened, restore_terminal)?;
        display.owns_terminal = true;
        Ok(display)
    }
}

impl<B: Backend + Send> ScreenDisplay<B> {
    /// Wrap an already prepared terminal, for example a test backend.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Io`] if the first draw fails.
    pub fn with_terminal(terminal: Terminal<B>, view: KioskView) -> Result<Self, DisplayError> {
        let display = Self {
            inner: Mutex::new(ScreenInner { terminal, view }),
            owns_terminal: false,
        };
        display.redraw(&mut display.lock())?;
        Ok(display)
    }

    /// Run `f` against the terminal, for inspecting a test backend.
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(self.lock().terminal.backend())
    }

    fn lock(&self) -> MutexGuard<'_, ScreenInner<B>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn redraw(&self, inner: &mut ScreenInner<B>) -> Result<(), DisplayError> {
        let now = Instant::now();
        let ScreenInner { terminal, view } = inner;
        terminal.draw(|frame| render(frame, view, now))?;
        Ok(())
    }

    fn redraw_or_log(&self, inner: &mut ScreenInner<B>) {
        if let Err(e) = self.redraw(inner) {
            log::warn!("Failed to draw kiosk screen: {}", e);
        }
    }
}

impl<B: Backend + Send> StatusNotifier for ScreenDisplay<B> {
    fn show(&self, message: &str, is_error: bool) {
        let mut inner = self.lock();
        inner.view.status.set(message, is_error, Instant::now());
        self.redraw_or_log(&mut inner);
    }
}

impl<B: Backend + Send> Renderer for ScreenDisplay<B> {
    fn registry_changed(&self, entries: &[SessionEntry]) {
        let mut inner = self.lock();
        inner.view.entries = entries.to_vec();
        self.redraw_or_log(&mut inner);
    }
}

impl<B: Backend + Send> Display for ScreenDisplay<B> {
    fn tick(&self) -> Result<(), DisplayError> {
        let mut inner = self.lock();
        if inner.view.status.expire(Instant::now()) {
            self.redraw(&mut inner)?;
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), DisplayError> {
        if self.owns_terminal {
            restore_terminal();
            let _ = panic::take_hook();
        }
        Ok(())
    }
}

impl<B: Backend> Drop for ScreenDisplay<B> {
    fn drop(&mut self) {
        if self.owns_terminal {
            restore_terminal();
        }
    }
}

/// Draw `view` as of `now`.
pub fn render(frame: &mut Frame, view: &KioskView, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + status
            Constraint::Min(0),    // Session log
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_status(frame, view, now, chunks[0]);
    render_entries(frame, view, chunks[1]);
    render_footer(frame, view, chunks[2]);
}

fn render_status(frame: &mut Frame, view: &KioskView, now: Instant, area: Rect) {
    let theme = &view.theme;
    let line = match view.status.visible(now) {
        Some(status) => {
            let color = if status.is_error {
                theme.danger
            } else {
                theme.success
            };
            Line::from(Span::styled(
                status.message.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(IDLE_STATUS, Style::default().fg(theme.dim))),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.primary))
        .title(Span::styled(
            format!(" {} ", view.title),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ))
        .title(
            Line::from(Span::styled(
                format!(" {} ", view.endpoint),
                Style::default().fg(theme.dim),
            ))
            .right_aligned(),
        );

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_entries(frame: &mut Frame, view: &KioskView, area: Rect) {
    let theme = &view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.primary))
        .title(" Checked in ");

    if view.entries.is_empty() {
        let placeholder = Paragraph::new(PLACEHOLDER)
            .style(Style::default().fg(theme.dim))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = view
        .entries
        .iter()
        .map(|entry| {
            let gap = inner_width
                .saturating_sub(entry.identifier.chars().count() + entry.checked_in_at.chars().count())
                .max(1);
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.identifier.clone(),
                    Style::default().fg(theme.identifier),
                ),
                Span::raw(" ".repeat(gap)),
                Span::styled(entry.checked_in_at.clone(), Style::default().fg(theme.dim)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_footer(frame: &mut Frame, view: &KioskView, area: Rect) {
    let theme = &view.theme;
    let footer = Line::from(vec![
        Span::styled(
            format!(" Checked in: {}", view.entries.len()),
            Style::default().fg(theme.normal),
        ),
        Span::styled("   Esc: quit", Style::default().fg(theme.dim)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, DisplayError> {
    log::debug!("Setting up terminal for kiosk screen");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_on_error<T>(
    result: Result<T, DisplayError>,
    restore: impl FnOnce(),
) -> Result<T, DisplayError> {
    if let Err(e) = &result {
        log::debug!("Kiosk screen setup failed, restoring terminal: {}", e);
        restore();
    }
    result
}

/// Restore the terminal to its original state. Safe to call repeatedly.
fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
}
