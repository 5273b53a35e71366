use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::engine::strategy::risk_level;
use crate::models::{GlobalStrategyPlan, Requirement};
use crate::tui::theme;
use crate::tui::widgets::result::risk_style;
use crate::utils::format::{format_percentage, format_requirement, plural};

pub fn render(frame: &mut Frame, area: Rect, plan: Option<&GlobalStrategyPlan>, target: f64) {
    let title = match plan {
        Some(plan) => format!(" Strategy · {} {} ", plan.mode.symbol(), plan.mode.display_name()),
        None => " Strategy ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let Some(plan) = plan else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };
    let summary = &plan.summary;

    let mut lines = vec![Line::from(Span::styled(
        format!("  {}", plan.mode.description()),
        theme::dim(),
    ))];
    lines.push(Line::from(""));

    if summary.required_lectures.is_zero() {
        lines.push(Line::from(Span::styled(
            format!(
                "  ✓ Target met. {} safe to skip.",
                plural(summary.safe_skip_allowance as usize, "lecture")
            ),
            theme::green().add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  Required     ", theme::dim()),
            Span::styled(
                format_requirement(summary.required_lectures),
                theme::amber().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  of {} remaining", summary.total_available_slots),
                theme::dim(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Attend       ", theme::dim()),
            Span::styled(summary.scheduled_count.to_string(), theme::bold()),
            Span::styled(
                format!("  ·  skip {}", summary.skip_count),
                theme::dim(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Recovery     ", theme::dim()),
            Span::styled(plural(summary.days_to_recover as usize, "day"), theme::bold()),
            Span::styled(format!("  ({})", plan.mode.pace_label()), theme::dim()),
        ]));
    }

    let risk = risk_level(summary.projected_percentage, target);
    lines.push(Line::from(vec![
        Span::styled("  Projected    ", theme::dim()),
        Span::styled(
            format_percentage(summary.projected_percentage, 2),
            risk_style(risk).add_modifier(Modifier::BOLD),
        ),
    ]));

    let short_of_slots = match summary.required_lectures {
        Requirement::Count(n) => n as usize > summary.total_available_slots,
        Requirement::Unreachable => true,
    };
    if short_of_slots {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  ⚠ Not enough lectures left to reach the target",
            theme::red(),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
