use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{RecommendedSlot, SlotType};
use crate::tui::theme;
use crate::utils::format::fit_width;

/// Recommended lectures in date order, starting at `offset`.
pub fn render(frame: &mut Frame, area: Rect, slots: &[RecommendedSlot], offset: usize) {
    let title = format!(" Attend These · {} ", slots.len());
    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    if slots.is_empty() {
        let list = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  Nothing to attend for the target",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(list, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let offset = offset.min(slots.len().saturating_sub(1));
    let mut last_date = None;

    let items: Vec<ListItem> = slots
        .iter()
        .skip(offset)
        .take(visible)
        .map(|rec| {
            let slot = &rec.slot;
            let date_text = if last_date == Some(slot.date) {
                " ".repeat(10)
            } else {
                slot.date.format("%a %d %b").to_string()
            };
            last_date = Some(slot.date);

            let (kind, kind_style) = match slot.slot_type {
                SlotType::Lab => ("◆ Lab", theme::amber()),
                SlotType::Lecture => ("  Lec", theme::dim()),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:>3}. ", rec.index), theme::dim()),
                Span::styled(fit_width(&date_text, 11), theme::accent()),
                Span::styled(fit_width(&slot.time, 14), theme::dim()),
                Span::styled(
                    fit_width(&slot.subject_short, 8),
                    theme::bold().add_modifier(Modifier::BOLD),
                ),
                Span::styled(kind, kind_style),
                Span::styled(format!("  {}", slot.room), theme::dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
