use chrono::Weekday;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Cell, Row, Table},
    Frame,
};

use crate::models::timetable::weekday_name;
use crate::models::SlotType;
use crate::timetable::query::TimetableGrid;
use crate::tui::theme;

/// Weekly grid for one division; `today`'s row is highlighted.
pub fn render(frame: &mut Frame, area: Rect, division: &str, grid: &TimetableGrid, today: Weekday) {
    let block = Block::default()
        .title(Span::styled(format!(" Timetable · {} ", division), theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::surface());

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend((0..grid.slots.len()).map(|i| Cell::from(grid.slot_label(i))));
    let header = Row::new(header_cells)
        .style(theme::accent().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = grid
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::from(Span::styled(
                &weekday_name(row.day)[..3],
                theme::accent(),
            ))];
            cells.extend(row.cells.iter().map(|cell| match cell {
                Some(entry) if entry.slot_type == SlotType::Lab => Cell::from(Span::styled(
                    format!("◆ {}", entry.subject_short),
                    theme::amber(),
                )),
                Some(entry) if !entry.is_teaching() => {
                    Cell::from(Span::styled(entry.subject_short.clone(), theme::dim()))
                }
                Some(entry) => Cell::from(Span::styled(entry.subject_short.clone(), theme::bold())),
                None => Cell::from(Span::styled("·", theme::dim())),
            }));

            let style = if row.day == today {
                theme::highlight()
            } else {
                Style::default()
            };
            Row::new(cells).style(style).height(2)
        })
        .collect();

    let mut widths = vec![Constraint::Length(5)];
    widths.extend(grid.slots.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);
    frame.render_widget(table, area);
}
