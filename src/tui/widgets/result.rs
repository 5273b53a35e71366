use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::engine::strategy::risk_level;
use crate::models::{CalculationResult, Requirement, RiskLevel};
use crate::tui::theme;
use crate::utils::format::{format_percentage, format_requirement, progress_bar};

pub fn risk_style(risk: RiskLevel) -> Style {
    match risk {
        RiskLevel::Safe => theme::green(),
        RiskLevel::Warning => theme::amber(),
        RiskLevel::Critical => theme::red(),
    }
}

pub fn render(frame: &mut Frame, area: Rect, result: Option<&CalculationResult>) {
    let block = Block::default()
        .title(Span::styled(" Attendance ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let Some(result) = result else {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Enter conducted and attended to begin",
                theme::dim(),
            )),
        ];
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    };

    let risk = risk_level(result.current_percentage, result.target);
    let style = risk_style(risk);
    let bar_width = (area.width.saturating_sub(20) as usize).min(30);

    let bar_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(progress_bar(result.current_percentage, 100.0, bar_width), style),
        Span::styled(
            format!("  {}", format_percentage(result.current_percentage, 2)),
            style.add_modifier(Modifier::BOLD),
        ),
    ]);

    let status_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(risk.as_str(), style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(
                "  ·  target {}  ·  {}/{} effective",
                format_percentage(result.target, 2),
                result.attended,
                result.conducted.saturating_sub(result.no_attendance)
            ),
            theme::dim(),
        ),
    ]);

    let needed_style = match result.lectures_needed {
        Requirement::Count(0) => theme::green(),
        Requirement::Count(_) => theme::amber(),
        Requirement::Unreachable => theme::red(),
    };

    let needed_line = Line::from(vec![
        Span::styled("  Need to attend   ", theme::dim()),
        Span::styled(
            format_requirement(result.lectures_needed),
            needed_style.add_modifier(Modifier::BOLD),
        ),
    ]);

    let missable_line = Line::from(vec![
        Span::styled("  Can miss         ", theme::dim()),
        Span::styled(
            result.lectures_missable.to_string(),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let text = vec![
        Line::from(""),
        bar_line,
        status_line,
        Line::from(""),
        needed_line,
        missable_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
