use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::StrategyMode;
use crate::timetable::TeachingCalendar;
use crate::tui::theme;
use crate::utils::format::plural;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    division: &str,
    mode: StrategyMode,
    calendar: &TeachingCalendar,
) {
    let today_str = calendar.today.format("%A, %b %d, %Y").to_string();
    let remaining = calendar.days_remaining();

    let title_line = Line::from(vec![
        Span::styled("  hazri  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("attendance planner", theme::accent()),
    ]);

    let remaining_span = if remaining == 0 {
        Span::styled("teaching has ended", theme::red())
    } else {
        Span::styled(
            format!("{} of teaching left", plural(remaining as usize, "day")),
            theme::amber(),
        )
    };

    let info_line = Line::from(vec![
        Span::styled(format!("Division {}", division), theme::bold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(format!("{} {}", mode.symbol(), mode.display_name()), theme::accent()),
        Span::styled("  ·  ", theme::dim()),
        remaining_span,
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today_str, theme::dim()),
    ]);

    let text = vec![title_line, Line::from(""), info_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
