use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(15, 18, 24);
pub const SURFACE: Color = Color::Rgb(22, 27, 36);
pub const BORDER: Color = Color::Rgb(48, 58, 74);
pub const TEXT: Color = Color::Rgb(220, 226, 236);
pub const TEXT_DIM: Color = Color::Rgb(120, 132, 150);
pub const ACCENT: Color = Color::Rgb(86, 182, 194);
pub const GREEN: Color = Color::Rgb(110, 176, 104);
pub const AMBER: Color = Color::Rgb(222, 170, 72);
pub const RED: Color = Color::Rgb(214, 92, 92);
/// Background for the highlighted row (today in the timetable).
pub const FILL: Color = Color::Rgb(34, 44, 58);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn highlight() -> Style {
    Style::default().bg(FILL)
}
