use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

const DASHBOARD_HINTS: &[(&str, &str)] = &[
    ("[Tab]", " field  "),
    ("[Enter]", " edit  "),
    ("[m]", " mode  "),
    ("[-/+]", " simulate  "),
    ("[v]", " compare  "),
    ("[t]", " timetable  "),
    ("[w]", " save  "),
    ("[?]", " help  "),
    ("[Esc]", " quit"),
];

const SUBVIEW_HINTS: &[(&str, &str)] = &[("[m]", " mode  "), ("[Esc]", " back")];

/// Key hints, or a one-off notice when there is one.
pub fn render(frame: &mut Frame, area: Rect, on_dashboard: bool, notice: Option<&str>) {
    let line = match notice {
        Some(text) => Line::from(Span::styled(text, theme::green())),
        None => {
            let hints = if on_dashboard { DASHBOARD_HINTS } else { SUBVIEW_HINTS };
            let mut spans = Vec::new();
            for (key, label) in hints {
                spans.push(Span::styled(*key, theme::accent()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
