use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEventKind};
use std::time::Duration;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::config::settings::DEFAULT_TARGET;
use crate::config::AppConfig;
use crate::models::StrategyMode;
use crate::timetable::{TimetableSource, Timetable};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Welcome,
    Division,
    Target,
    Mode,
    TeachingEnd,
    Confirm,
}

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct SetupWizard {
    step: Step,
    input: String,
    error: Option<String>,
    list_state: ListState,

    // Collected values
    divisions: Vec<String>,
    division_idx: usize,
    target: f64,
    use_default_target: bool,
    mode: StrategyMode,
    teaching_end: NaiveDate,

    should_quit: bool,
    confirmed: bool,
}

impl SetupWizard {
    fn new(existing: &AppConfig, divisions: Vec<String>) -> Self {
        let division_idx = divisions
            .iter()
            .position(|d| *d == existing.planner.division)
            .unwrap_or(0);

        let mut list_state = ListState::default();
        list_state.select(Some(division_idx));

        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,
            list_state,

            divisions,
            division_idx,
            target: existing.planner.effective_target(),
            use_default_target: existing.planner.use_default_target,
            mode: existing.planner.mode,
            teaching_end: existing.calendar.teaching_end,

            should_quit: false,
            confirmed: false,
        }
    }

    fn step_number(&self) -> usize {
        match self.step {
            Step::Welcome => 0,
            Step::Division => 1,
            Step::Target => 2,
            Step::Mode => 3,
            Step::TeachingEnd => 4,
            Step::Confirm => 5,
        }
    }

    const TOTAL_STEPS: usize = 5;

    fn prefill(&mut self) {
        self.input = match self.step {
            Step::Target => format!("{}", self.target),
            Step::TeachingEnd => self.teaching_end.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        };
    }

    fn advance(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => Step::Division,
            Step::Division => Step::Target,
            Step::Target => Step::Mode,
            Step::Mode => Step::TeachingEnd,
            Step::TeachingEnd => Step::Confirm,
            Step::Confirm => {
                self.confirmed = true;
                Step::Confirm
            }
        };
        self.prefill();
    }

    fn go_back(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => {
                self.should_quit = true;
                Step::Welcome
            }
            Step::Division => Step::Welcome,
            Step::Target => Step::Division,
            Step::Mode => Step::Target,
            Step::TeachingEnd => Step::Mode,
            Step::Confirm => Step::TeachingEnd,
        };
        self.prefill();
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match &self.step {
            Step::Welcome => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.advance();
                }
            }

            Step::Division => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.division_idx > 0 {
                        self.division_idx -= 1;
                        self.list_state.select(Some(self.division_idx));
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.division_idx + 1 < self.divisions.len() {
                        self.division_idx += 1;
                        self.list_state.select(Some(self.division_idx));
                    }
                }
                KeyCode::Enter => {
                    if self.divisions.is_empty() {
                        self.error = Some("The timetable has no divisions".to_string());
                    } else {
                        self.advance();
                    }
                }
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::Target => self.handle_text_input(key, |s| parse_target(s).map(|_| ())),

            Step::Mode => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.mode = match self.mode {
                        StrategyMode::Easy => StrategyMode::Hard,
                        StrategyMode::Medium => StrategyMode::Easy,
                        StrategyMode::Hard => StrategyMode::Medium,
                    };
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                    self.mode = self.mode.next();
                }
                KeyCode::Char('1') => self.mode = StrategyMode::Easy,
                KeyCode::Char('2') => self.mode = StrategyMode::Medium,
                KeyCode::Char('3') => self.mode = StrategyMode::Hard,
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::TeachingEnd => self.handle_text_input(key, |s| parse_date(s).map(|_| ())),

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirmed = true;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn handle_text_input<F>(&mut self, key: crossterm::event::KeyEvent, validate: F)
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match validate(&val) {
                    Ok(()) => {
                        self.commit_text_input(&val);
                        self.advance();
                    }
                    Err(e) => {
                        self.error = Some(e);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Tab => {
                // Reset to default value for this step
                self.input = match self.step {
                    Step::Target => format!("{}", DEFAULT_TARGET),
                    Step::TeachingEnd => AppConfig::default()
                        .calendar
                        .teaching_end
                        .format("%Y-%m-%d")
                        .to_string(),
                    _ => self.input.clone(),
                };
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self, val: &str) {
        match self.step {
            Step::Target => {
                if let Ok(target) = parse_target(val) {
                    self.target = target;
                    self.use_default_target = target == DEFAULT_TARGET;
                }
            }
            Step::TeachingEnd => {
                if let Ok(date) = parse_date(val) {
                    self.teaching_end = date;
                }
            }
            _ => {}
        }
    }

    fn selected_division(&self) -> &str {
        self.divisions
            .get(self.division_idx)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn build_config(&self, existing: &AppConfig) -> AppConfig {
        let mut config = existing.clone();
        if let Some(division) = self.divisions.get(self.division_idx) {
            config.planner.division = division.clone();
        }
        config.planner.target = self.target;
        config.planner.use_default_target = self.use_default_target;
        config.planner.mode = self.mode;
        config.calendar.teaching_end = self.teaching_end;
        config
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &mut SetupWizard) {
    let area = frame.area();

    frame.render_widget(Block::default().style(theme::base()), area);

    // Center the wizard box
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(24),
            Constraint::Min(0),
        ])
        .split(area);

    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::surface())
        .title(Span::styled(
            "  hazri  ·  Settings  ",
            theme::accent().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    frame.render_widget(outer_block, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner),
        Step::Division => draw_division_list(frame, inner, wizard),
        Step::Mode => {
            let options: Vec<String> = StrategyMode::all()
                .iter()
                .map(|m| format!("{} {}  ({})", m.symbol(), m.display_name(), m.description()))
                .collect();
            let selected = StrategyMode::all()
                .iter()
                .position(|m| *m == wizard.mode)
                .unwrap_or(1);
            draw_choice(
                frame,
                inner,
                "Strategy Mode",
                "How aggressively should the plan catch you up?",
                &options,
                selected,
                &wizard.error,
            )
        }
        Step::Confirm => draw_confirm(frame, inner, wizard),
        _ => draw_text_step(frame, inner, wizard),
    }

    draw_progress(frame, inner, wizard.step_number(), SetupWizard::TOTAL_STEPS);
}

fn draw_progress(frame: &mut Frame, area: Rect, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", theme::dim())];
    for i in 1..=total {
        if i < current {
            spans.push(Span::styled("● ", theme::green()));
        } else if i == current {
            spans.push(Span::styled("◉ ", theme::accent()));
        } else {
            spans.push(Span::styled("○ ", theme::dim()));
        }
    }
    let para = Paragraph::new(Line::from(spans));
    let progress_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(para, progress_area);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to hazri",
            theme::accent().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Plan which lectures to attend to stay above your target.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("This wizard will configure:", theme::dim())),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("Your division's timetable", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("Target percentage and strategy mode", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("The last day of teaching", theme::dim()),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_text_step(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let (title, subtitle, hint) = match wizard.step {
        Step::Target => (
            "Target Attendance",
            "Minimum percentage you need to keep",
            "1 to 100  ·  [Tab] reset to 75",
        ),
        Step::TeachingEnd => (
            "Teaching Ends",
            "Last day lectures are held this semester",
            "YYYY-MM-DD  ·  [Tab] reset",
        ),
        _ => ("", "", ""),
    };

    let cursor = if wizard.input.len() < 40 { "█" } else { "" };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    let input_display = format!("  {}{}  ", wizard.input, cursor);
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!("{:<width$}", input_display, width = input_width);

    let input_style = if wizard.error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    lines.push(Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))));
    lines.push(Line::from(""));

    if let Some(err) = &wizard.error {
        lines.push(Line::from(Span::styled(format!("  ✗  {}", err), theme::red())));
    } else {
        lines.push(Line::from(Span::styled(hint, theme::dim())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_division_list(frame: &mut Frame, area: Rect, wizard: &mut SetupWizard) {
    let header_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Division",
            theme::accent().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Whose timetable should plans use?", theme::dim())),
        Line::from(""),
    ];

    let header_para = Paragraph::new(header_lines).alignment(Alignment::Center);
    let header_area = Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: 5,
    };
    frame.render_widget(header_para, header_area);

    let list_area = Rect {
        x: area.x + 2,
        y: area.y + 8,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(12),
    };

    let items: Vec<ListItem> = wizard
        .divisions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let line = if i == wizard.division_idx {
                Line::from(vec![
                    Span::styled("  ◉  ", theme::accent()),
                    Span::styled(d.as_str(), theme::accent().add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(vec![
                    Span::styled("  ○  ", theme::dim()),
                    Span::styled(d.as_str(), theme::dim()),
                ])
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).style(theme::surface());
    frame.render_stateful_widget(list, list_area, &mut wizard.list_state);

    let footer_text = match &wizard.error {
        Some(err) => Span::styled(format!("✗  {}", err), theme::red()),
        None => Span::styled(
            "↑↓  navigate   ·   Enter  select   ·   Esc  back",
            theme::dim(),
        ),
    };
    let footer = Paragraph::new(Line::from(footer_text)).alignment(Alignment::Center);
    let footer_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(3),
        width: area.width,
        height: 1,
    };
    frame.render_widget(footer, footer_area);
}

fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    subtitle: &str,
    options: &[String],
    selected: usize,
    error: &Option<String>,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    for (i, opt) in options.iter().enumerate() {
        if i == selected {
            lines.push(Line::from(vec![
                Span::styled("  ◉  ", theme::accent()),
                Span::styled(opt.as_str(), theme::accent().add_modifier(Modifier::BOLD)),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  ○  ", theme::dim()),
                Span::styled(opt.as_str(), theme::dim()),
            ]));
        }
        lines.push(Line::from(""));
    }

    if let Some(err) = error {
        lines.push(Line::from(Span::styled(format!("  ✗  {}", err), theme::red())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←→  or  1 2 3  choose   ·   Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_confirm(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let target = if wizard.use_default_target {
        format!("{}%  (default)", wizard.target)
    } else {
        format!("{}%", wizard.target)
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Confirm Settings", theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Review your configuration:", theme::dim())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Division     ", theme::dim()),
            Span::styled(wizard.selected_division(), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Target       ", theme::dim()),
            Span::styled(target, theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Mode         ", theme::dim()),
            Span::styled(
                format!("{} {}", wizard.mode.symbol(), wizard.mode.display_name()),
                theme::bold(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Teaching end ", theme::dim()),
            Span::styled(
                wizard.teaching_end.format("%a %d %b %Y").to_string(),
                theme::bold(),
            ),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Enter  save   ·   Esc  go back", theme::dim())),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

// ─── Public entry point ──────────────────────────────────────────────────────

pub fn run_setup_tui(timetable: &Timetable, config: &mut AppConfig) -> Result<()> {
    let divisions = timetable
        .division_ids()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut wizard = SetupWizard::new(config, divisions);
    let mut terminal = ratatui::init();
    let events = EventHandler::new(Duration::from_millis(250));

    let outcome: Result<bool> = loop {
        if let Err(e) = terminal.draw(|frame| draw(frame, &mut wizard)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                wizard.handle_key(key);
                if wizard.should_quit {
                    break Ok(false);
                }
                if wizard.confirmed {
                    break Ok(true);
                }
            }
            Ok(Event::Tick | Event::Resize) => {}
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();

    if outcome? {
        *config = wizard.build_config(config);
        config.save()?;
        println!("Settings saved.");
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn parse_target(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| "Enter a number like 75".to_string())?;
    if !(1.0..=100.0).contains(&value) {
        return Err("Target must be between 1 and 100".to_string());
    }
    Ok(value)
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| "Use the form 2026-12-05".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn press(wizard: &mut SetupWizard, code: KeyCode) {
        wizard.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(wizard: &mut SetupWizard, text: &str) {
        for _ in 0..wizard.input.len() {
            press(wizard, KeyCode::Backspace);
        }
        for c in text.chars() {
            press(wizard, KeyCode::Char(c));
        }
    }

    fn wizard() -> SetupWizard {
        let divisions = vec!["6A21".to_string(), "6A22".to_string(), "6B21".to_string()];
        SetupWizard::new(&AppConfig::default(), divisions)
    }

    #[test]
    fn walks_every_step_and_builds_config() {
        let mut w = wizard();
        assert_eq!(w.division_idx, 1);

        press(&mut w, KeyCode::Enter);
        assert_eq!(w.step, Step::Division);
        press(&mut w, KeyCode::Down);
        press(&mut w, KeyCode::Enter);

        assert_eq!(w.step, Step::Target);
        assert_eq!(w.input, "75");
        type_text(&mut w, "80");
        press(&mut w, KeyCode::Enter);

        assert_eq!(w.step, Step::Mode);
        press(&mut w, KeyCode::Char('3'));
        press(&mut w, KeyCode::Enter);

        assert_eq!(w.step, Step::TeachingEnd);
        type_text(&mut w, "2026-11-28");
        press(&mut w, KeyCode::Enter);

        assert_eq!(w.step, Step::Confirm);
        press(&mut w, KeyCode::Enter);
        assert!(w.confirmed);

        let config = w.build_config(&AppConfig::default());
        assert_eq!(config.planner.division, "6B21");
        assert_eq!(config.planner.target, 80.0);
        assert!(!config.planner.use_default_target);
        assert_eq!(config.planner.mode, StrategyMode::Hard);
        assert_eq!(
            config.calendar.teaching_end,
            NaiveDate::from_ymd_opt(2026, 11, 28).unwrap()
        );
    }

    #[test]
    fn rejects_bad_text_and_stays_put() {
        let mut w = wizard();
        press(&mut w, KeyCode::Enter);
        press(&mut w, KeyCode::Enter);
        type_text(&mut w, "120");
        press(&mut w, KeyCode::Enter);
        assert_eq!(w.step, Step::Target);
        assert!(w.error.is_some());
    }

    #[test]
    fn escape_from_welcome_quits() {
        let mut w = wizard();
        press(&mut w, KeyCode::Esc);
        assert!(w.should_quit);
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(parse_target("75%"), Ok(75.0));
        assert!(parse_target("0").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }
}
