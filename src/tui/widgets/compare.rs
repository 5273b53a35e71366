use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
    },
    Frame,
};

use crate::engine::compare::{CurvePoint, ModeComparison};
use crate::models::StrategyMode;
use crate::tui::theme;
use crate::utils::format::{format_percentage, format_requirement};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    comparison: Option<&ModeComparison>,
    curve: &[CurvePoint],
    target: f64,
    selected: StrategyMode,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(8)])
        .split(area);

    render_table(frame, chunks[0], comparison, selected);
    render_curve(frame, chunks[1], curve, target);
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    comparison: Option<&ModeComparison>,
    selected: StrategyMode,
) {
    let block = Block::default()
        .title(Span::styled(" Mode Comparison ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::surface());

    let Some(comparison) = comparison else {
        let text = Paragraph::new(Line::from(Span::styled(
            "  Enter your counts on the dashboard first",
            theme::dim(),
        )))
        .block(block);
        frame.render_widget(text, area);
        return;
    };

    if comparison.target_achieved {
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  ✓ Target already met. Every mode leaves the plan empty.",
                theme::green(),
            )),
        ])
        .block(block);
        frame.render_widget(text, area);
        return;
    }

    let header = Row::new(vec!["Mode", "Attend", "Skip", "Days", "Final"])
        .style(theme::accent().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = comparison
        .rows
        .iter()
        .map(|row| {
            let style = if row.mode == selected {
                theme::bold()
            } else {
                theme::dim()
            };
            let final_style = if row.mode == selected {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                style
            };
            Row::new(vec![
                Cell::from(format!("{} {}", row.mode.symbol(), row.mode.display_name())),
                Cell::from(row.scheduled.to_string()),
                Cell::from(row.skip.to_string()),
                Cell::from(row.days.to_string()),
                Cell::from(Span::styled(format_percentage(row.final_percentage, 2), final_style)),
            ])
            .style(style)
        })
        .collect();

    let mut title_note = format!(
        " need {} of {} ",
        format_requirement(comparison.required_lectures),
        comparison.total_slots
    );
    if comparison.not_enough_slots {
        title_note.push_str("· not enough lectures left ");
    }

    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title_bottom(Span::styled(
            title_note,
            if comparison.not_enough_slots {
                theme::red()
            } else {
                theme::dim()
            },
        )));
    frame.render_widget(table, area);
}

fn render_curve(frame: &mut Frame, area: Rect, curve: &[CurvePoint], target: f64) {
    let block = Block::default()
        .title(Span::styled(" Recovery Curve ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let points: Vec<(f64, f64)> = curve
        .iter()
        .map(|p| (p.lectures as f64, p.percentage))
        .collect();
    let max_x = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
    let target_line = [(0.0, target), (max_x, target)];

    let datasets = vec![
        Dataset::default()
            .name("attend every lecture")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme::green())
            .data(&points),
        Dataset::default()
            .name(format!("target {}", format_percentage(target, 2)))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(theme::amber())
            .data(&target_line),
    ];

    let x_labels = vec![
        Span::styled("0", theme::dim()),
        Span::styled(format!("{}", (max_x / 2.0).round()), theme::dim()),
        Span::styled(format!("{}", max_x), theme::dim()),
    ];
    let y_labels = vec![
        Span::styled("0%", theme::dim()),
        Span::styled("50%", theme::dim()),
        Span::styled("100%", theme::dim()),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(Span::styled("lectures attended", theme::dim()))
                .style(theme::border())
                .bounds([0.0, max_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme::border())
                .bounds([0.0, 100.0])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}
