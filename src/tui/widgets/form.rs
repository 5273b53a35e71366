use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

/// One labelled input row.
pub struct FormRow<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub suffix: &'a str,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: &[FormRow<'_>],
    focus_idx: usize,
    editing: bool,
    error: Option<&str>,
) {
    let block = Block::default()
        .title(Span::styled(" Inputs ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if editing {
            theme::amber()
        } else {
            theme::accent()
        })
        .style(theme::surface());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    for (i, row) in rows.iter().enumerate() {
        let focused = i == focus_idx;
        let marker = if focused { "▸ " } else { "  " };
        let label_style = if focused {
            theme::accent().add_modifier(Modifier::BOLD)
        } else {
            theme::dim()
        };
        let value_style = if focused && editing {
            theme::amber().add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };

        let mut spans = vec![
            Span::styled(marker, theme::accent()),
            Span::styled(format!("{:<16}", row.label), label_style),
            Span::styled(row.value, value_style),
        ];
        if focused && editing {
            spans.push(Span::styled("█", theme::amber()));
        }
        spans.push(Span::styled(row.suffix, theme::dim()));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    match error {
        Some(err) => lines.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red()))),
        None if editing => lines.push(Line::from(Span::styled(
            "  [Enter] apply  ·  [Esc] cancel",
            theme::dim(),
        ))),
        None => lines.push(Line::from(Span::styled(
            "  [Enter] edit  ·  [c] recalculate",
            theme::dim(),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
