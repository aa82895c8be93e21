use ratatui::style::{Color, Modifier, Style};

pub const APP_TITLE: &str = "SilentTalk";

pub const SPLASH_BACKGROUND: Color = Color::Rgb(0xe7, 0xa1, 0xa7);
pub const SPLASH_TITLE: Color = Color::Rgb(0x1a, 0x3b, 0x5d);
pub const CONTROL_BAR: Color = Color::Rgb(0xee, 0xbd, 0xc1);
pub const CAMERA_BACKGROUND: Color = Color::Black;
pub const RECORDING: Color = Color::Rgb(0xe5, 0x39, 0x35);

pub fn splash() -> Style {
    Style::default().bg(SPLASH_BACKGROUND)
}

pub fn splash_title() -> Style {
    Style::default()
        .fg(SPLASH_TITLE)
        .bg(SPLASH_BACKGROUND)
        .add_modifier(Modifier::BOLD)
}

pub fn camera() -> Style {
    Style::default().fg(Color::White).bg(CAMERA_BACKGROUND)
}

pub fn control_bar(enabled: bool) -> Style {
    let style = Style::default().fg(Color::Black).bg(CONTROL_BAR);
    if enabled {
        style
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

pub fn recording() -> Style {
    Style::default()
        .fg(RECORDING)
        .bg(CAMERA_BACKGROUND)
        .add_modifier(Modifier::BOLD)
}

pub fn modal() -> Style {
    Style::default().fg(Color::Black).bg(Color::White)
}

pub fn modal_result() -> Style {
    modal().add_modifier(Modifier::BOLD)
}

pub fn modal_button() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(CONTROL_BAR)
        .add_modifier(Modifier::BOLD)
}
