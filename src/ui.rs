//! Terminal front-end: draws the current [`Screen`] and maps keys to actions.

use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::{
    app::{App, CameraOverlay, CameraView, Screen, UserAction},
    model::VideoSource,
    theme,
};

const SPINNER_GLYPHS: [&str; 8] = ["|", "/", "-", "\\", "|", "/", "-", "\\"];
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Take over the terminal and run until the user quits.
pub fn run_app(app: &mut App) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let result = app_loop(&mut terminal, app);
    drop(terminal);
    drop(guard);
    app.shutdown();
    result
}

fn app_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let launched = Instant::now();
    app.tick(launched.elapsed());
    terminal.draw(|frame| draw(frame, &app.screen()))?;

    loop {
        let mut should_draw = app.tick(launched.elapsed());

        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.tick(launched.elapsed());
                    if handle_key_event(app, key) {
                        return Ok(());
                    }
                    should_draw = true;
                }
                Event::Resize(_, _) => should_draw = true,
                _ => {}
            }
        }

        if should_draw {
            terminal.draw(|frame| draw(frame, &app.screen()))?;
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    let Some(action) = action_for_key(key.code) else {
        return key.code == KeyCode::Char('q');
    };
    let applied = app.dispatch(action);
    tracing::trace!(?action, applied, "key dispatched");
    false
}

fn action_for_key(code: KeyCode) -> Option<UserAction> {
    match code {
        KeyCode::Char('r') | KeyCode::Char(' ') => Some(UserAction::ToggleRecording),
        KeyCode::Char('p') => Some(UserAction::PickVideo),
        KeyCode::Char('f') => Some(UserAction::FlipCamera),
        KeyCode::Enter => Some(UserAction::CloseModal),
        KeyCode::Esc | KeyCode::Backspace => Some(UserAction::Back),
        _ => None,
    }
}

pub fn spinner_glyph(angle: f32) -> &'static str {
    let step = (angle.rem_euclid(360.0) / 45.0).floor() as usize;
    SPINNER_GLYPHS[step % SPINNER_GLYPHS.len()]
}

pub fn draw(frame: &mut Frame<'_>, screen: &Screen) {
    let area = frame.size();
    match screen {
        Screen::Splash => draw_splash(frame, area),
        Screen::PermissionPending => draw_message(frame, area, "Requesting permissions..."),
        Screen::NoAccess => draw_message(frame, area, "No access to camera or media library"),
        Screen::Camera(view) => draw_camera(frame, area, view),
    }
}

fn draw_splash(frame: &mut Frame<'_>, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(theme::APP_TITLE, theme::splash_title())),
        Line::from(""),
        Line::from("Loading..."),
    ]);
    frame.render_widget(Block::default().style(theme::splash()), area);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(theme::splash()),
        centered_rect(area, area.width, 3),
    );
}

fn draw_message(frame: &mut Frame<'_>, area: Rect, message: &str) {
    frame.render_widget(Block::default().style(theme::camera()), area);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(theme::camera()),
        centered_rect(area, area.width, 1),
    );
}

fn draw_camera(frame: &mut Frame<'_>, area: Rect, view: &CameraView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let title = format!(" Camera: {} ", view.facing.label());
    let viewport = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(theme::camera());
    let inner = viewport.inner(chunks[0]);
    frame.render_widget(viewport, chunks[0]);

    if view.camera_active {
        draw_viewport(frame, inner, &view.overlay);
        draw_controls(frame, chunks[1], view);
    } else {
        frame.render_widget(Block::default().style(theme::camera()), chunks[1]);
    }

    match &view.overlay {
        CameraOverlay::Result { text } => draw_modal(frame, area, text, false),
        CameraOverlay::Failure { reason } => draw_modal(frame, area, reason, true),
        _ => {}
    }
}

fn draw_viewport(frame: &mut Frame<'_>, area: Rect, overlay: &CameraOverlay) {
    let body = match overlay {
        CameraOverlay::Recording { elapsed } => Paragraph::new(format!(
            "REC {:>2}s",
            elapsed.as_secs()
        ))
        .style(theme::recording()),
        CameraOverlay::Processing {
            source,
            spinner_angle,
        } => {
            let origin = match source {
                VideoSource::Camera => "recording",
                VideoSource::Library => "library clip",
            };
            Paragraph::new(Text::from(vec![
                Line::from(spinner_glyph(*spinner_angle)),
                Line::from("Processing..."),
                Line::from(origin),
            ]))
            .style(theme::camera())
        }
        _ => Paragraph::new("").style(theme::camera()),
    };
    frame.render_widget(
        body.alignment(Alignment::Center),
        centered_rect(area, area.width, 3),
    );
}

fn draw_controls(frame: &mut Frame<'_>, area: Rect, view: &CameraView) {
    let record = match view.overlay {
        CameraOverlay::Recording { .. } => "[r] stop",
        _ => "[r] record",
    };
    let hints = format!("[p] library   {record}   [f] flip   [q] quit");
    frame.render_widget(
        Paragraph::new(hints)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
            .style(theme::control_bar(view.controls_enabled)),
        area,
    );
}

fn draw_modal(frame: &mut Frame<'_>, area: Rect, message: &str, failed: bool) {
    let width = area.width.saturating_sub(4).min(40);
    let modal_area = centered_rect(area, width, 6);
    let heading = if failed { "Recognition failed" } else { "Result" };
    let text = Text::from(vec![
        Line::from(Span::styled(message.to_string(), theme::modal_result())),
        Line::from(""),
        Line::from(Span::styled(" Close ", theme::modal_button())),
    ]);
    frame.render_widget(Clear, modal_area);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(heading))
            .style(theme::modal()),
        modal_area,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
