use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEventKind};
use std::time::Duration;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::settings::DEFAULT_TARGET;
use crate::config::AppConfig;
use crate::engine::attendance::full_calculation;
use crate::engine::compare::{
    compare_modes, recovery_curve, simulate_attend, simulate_skip, CurvePoint, ModeComparison,
    DEFAULT_CURVE_STEPS,
};
use crate::engine::Planner;
use crate::models::{CalculationResult, GlobalStrategyPlan, PlanRequest, StrategyMode};
use crate::timetable::query::TimetableGrid;
use crate::timetable::{build_grid, is_valid_division, TeachingCalendar, Timetable, TimetableSource};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::form::FormRow;
use crate::tui::widgets::simulator::Simulation;
use crate::tui::widgets::{compare, form, header, result, simulator, slots, statusbar, strategy, timetable};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Compare,
    Timetable,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Conducted,
    Attended,
    NoAttendance,
    Target,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Conducted,
        Field::Attended,
        Field::NoAttendance,
        Field::Target,
    ];

    fn label(&self) -> &'static str {
        match self {
            Field::Conducted => "Conducted",
            Field::Attended => "Attended",
            Field::NoAttendance => "No attendance",
            Field::Target => "Target",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Field::Target => " %",
            _ => "",
        }
    }
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus_idx: usize,
    pub fields: [String; 4],
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub notice: Option<String>,

    timetable: Timetable,
    pub calendar: TeachingCalendar,
    pub division: String,
    pub mode: StrategyMode,

    // Derived state (refreshed on every recalculation)
    pub result: Option<CalculationResult>,
    pub plan: Option<GlobalStrategyPlan>,
    pub comparison: Option<ModeComparison>,
    pub curve: Vec<CurvePoint>,
    pub grid: TimetableGrid,
    /// Positive attends that many lectures, negative skips them.
    pub sim_offset: i64,
    pub simulation: Simulation,
    pub slot_offset: usize,
}

impl App {
    pub fn new(timetable: Timetable, config: AppConfig) -> Self {
        Self::starting_on(timetable, config, Local::now().date_naive())
    }

    fn starting_on(timetable: Timetable, config: AppConfig, today: NaiveDate) -> Self {
        let calendar = TeachingCalendar::new(today, config.calendar.teaching_end);

        let mut notice = None;
        let division = if is_valid_division(&timetable, &config.planner.division) {
            config.planner.division.clone()
        } else {
            let fallback = timetable
                .division_ids()
                .first()
                .map(|d| d.to_string())
                .unwrap_or_default();
            notice = Some(format!(
                "Division {} not in timetable, showing {}",
                config.planner.division, fallback
            ));
            fallback
        };

        let show = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        let fields = [
            show(config.inputs.conducted),
            show(config.inputs.attended),
            config.inputs.no_attendance.unwrap_or(0).to_string(),
            format!("{}", config.planner.effective_target()),
        ];

        let grid = build_grid(&timetable, &division);
        let mode = config.planner.mode;

        let mut app = App {
            view: View::Dashboard,
            config,
            should_quit: false,
            input_mode: InputMode::Normal,
            focus_idx: 0,
            fields,
            input_buffer: String::new(),
            input_error: None,
            notice,
            timetable,
            calendar,
            division,
            mode,
            result: None,
            plan: None,
            comparison: None,
            curve: Vec::new(),
            grid,
            sim_offset: 0,
            simulation: Simulation::Idle,
            slot_offset: 0,
        };
        app.recalculate();
        app
    }

    fn field_value(&self, field: Field) -> Result<Option<f64>, String> {
        let raw = self.fields[field as usize].trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| format!("{}: '{}' is not a number", field.label(), raw))
    }

    fn clear_results(&mut self) {
        self.result = None;
        self.plan = None;
        self.comparison = None;
        self.curve.clear();
        self.simulation = Simulation::Idle;
    }

    /// Run the arithmetic and the planner against the current form.
    pub fn recalculate(&mut self) {
        self.input_error = None;

        let values = (
            self.field_value(Field::Conducted),
            self.field_value(Field::Attended),
            self.field_value(Field::NoAttendance),
            self.field_value(Field::Target),
        );
        let (conducted, attended, no_attendance, target) = match values {
            (Ok(c), Ok(a), Ok(n), Ok(t)) => (c, a, n.unwrap_or(0.0), t.unwrap_or(DEFAULT_TARGET)),
            (c, a, n, t) => {
                let err = [c.err(), a.err(), n.err(), t.err()].into_iter().flatten().next();
                self.input_error = err;
                self.clear_results();
                return;
            }
        };
        let (Some(conducted), Some(attended)) = (conducted, attended) else {
            self.clear_results();
            return;
        };

        let result = match full_calculation(attended, conducted, target, no_attendance) {
            Ok(result) => result,
            Err(e) => {
                self.input_error = Some(e.to_string());
                self.clear_results();
                return;
            }
        };

        let request = PlanRequest {
            conducted: result.conducted,
            attended: result.attended,
            no_attendance: result.no_attendance,
            target,
            division: self.division.clone(),
            mode: self.mode,
        };
        let planner = Planner::new(&self.timetable, self.calendar);
        let plan = planner.generate_global_plan(&request);
        let comparison = compare_modes(&planner, &request);
        self.curve = recovery_curve(
            request.attended,
            request.effective_conducted(),
            comparison.required_lectures,
            DEFAULT_CURVE_STEPS,
        );

        self.slot_offset = self
            .slot_offset
            .min(plan.recommended_slots.len().saturating_sub(1));
        self.result = Some(result);
        self.plan = Some(plan);
        self.comparison = Some(comparison);
        self.update_simulation();
    }

    fn update_simulation(&mut self) {
        let Some(result) = &self.result else {
            self.simulation = Simulation::Idle;
            return;
        };
        let effective = result.conducted.saturating_sub(result.no_attendance);
        let n = self.sim_offset.unsigned_abs().min(u32::MAX as u64) as u32;

        self.simulation = match self.sim_offset {
            0 => Simulation::Idle,
            o if o > 0 => Simulation::Attend(simulate_attend(result.attended, effective, result.target, n)),
            _ => Simulation::Skip(simulate_skip(result.attended, effective, result.target, n)),
        };
    }

    /// Copy the form and mode into the config so it can be saved.
    fn apply_to_config(&mut self) {
        if let Some(result) = &self.result {
            self.config
                .remember_inputs(result.conducted, result.attended, result.no_attendance);
            self.config.planner.use_default_target = result.target == DEFAULT_TARGET;
            self.config.planner.target = result.target;
        }
        self.config.planner.mode = self.mode;
        self.config.planner.division = self.division.clone();
    }

    fn save(&mut self) {
        self.apply_to_config();
        match self.config.save() {
            Ok(()) => self.notice = Some("✓ Settings saved".to_string()),
            Err(e) => self.input_error = Some(format!("Could not save settings: {}", e)),
        }
    }

    pub fn tick(&mut self) {
        let today = Local::now().date_naive();
        if today != self.calendar.today {
            self.calendar.today = today;
            self.recalculate();
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.notice = None;
        match self.input_mode {
            InputMode::Editing => self.handle_editing_key(key),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key),
                View::Compare => self.handle_subview_key(key, 'v'),
                View::Timetable => self.handle_subview_key(key, 't'),
                View::Help => self.handle_help_key(key),
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('v') => {
                self.view = View::Compare;
            }
            KeyCode::Char('t') => {
                self.view = View::Timetable;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_idx = (self.focus_idx + 1) % Field::ALL.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_idx = (self.focus_idx + Field::ALL.len() - 1) % Field::ALL.len();
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.input_mode = InputMode::Editing;
                self.input_buffer = self.fields[self.focus_idx].clone();
            }
            KeyCode::Char('c') => self.recalculate(),
            KeyCode::Char('m') => self.cycle_mode(),
            KeyCode::Char('w') => self.save(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => {
                self.sim_offset += 1;
                self.update_simulation();
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                self.sim_offset -= 1;
                self.update_simulation();
            }
            KeyCode::Char('0') => {
                self.sim_offset = 0;
                self.update_simulation();
            }
            KeyCode::PageDown | KeyCode::Char('j') => {
                let len = self
                    .plan
                    .as_ref()
                    .map(|p| p.recommended_slots.len())
                    .unwrap_or(0);
                if self.slot_offset + 1 < len {
                    self.slot_offset += 1;
                }
            }
            KeyCode::PageUp | KeyCode::Char('k') => {
                self.slot_offset = self.slot_offset.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_subview_key(&mut self, key: crossterm::event::KeyEvent, toggle: char) {
        match key.code {
            KeyCode::Esc => self.view = View::Dashboard,
            KeyCode::Char(c) if c == toggle => self.view = View::Dashboard,
            KeyCode::Char('m') => self.cycle_mode(),
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_editing_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                self.fields[self.focus_idx] = self.input_buffer.trim().to_string();
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
                self.recalculate();
            }
            KeyCode::Tab => {
                self.fields[self.focus_idx] = self.input_buffer.trim().to_string();
                self.focus_idx = (self.focus_idx + 1) % Field::ALL.len();
                self.input_buffer = self.fields[self.focus_idx].clone();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.slot_offset = 0;
        self.recalculate();
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Compare => self.draw_compare(frame),
            View::Timetable => self.draw_timetable(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn target(&self) -> f64 {
        self.result
            .as_ref()
            .map(|r| r.target)
            .unwrap_or_else(|| self.config.planner.effective_target())
    }

    /// Header, body, status bar.
    fn frame_layout(&self, frame: &mut Frame) -> Rect {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], &self.division, self.mode, &self.calendar);
        statusbar::render(
            frame,
            outer_chunks[2],
            self.view == View::Dashboard || self.view == View::Help,
            self.notice.as_deref(),
        );
        outer_chunks[1]
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let body = self.frame_layout(frame);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body);

        // Left column: Inputs + Attendance + What If
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8), // inputs
                Constraint::Length(8), // attendance
                Constraint::Min(5),    // simulator
            ])
            .split(columns[0]);

        let editing = self.input_mode == InputMode::Editing;
        let rows: Vec<FormRow> = Field::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| FormRow {
                label: field.label(),
                value: if editing && i == self.focus_idx {
                    self.input_buffer.as_str()
                } else {
                    self.fields[i].as_str()
                },
                suffix: field.suffix(),
            })
            .collect();

        form::render(
            frame,
            left_chunks[0],
            &rows,
            self.focus_idx,
            editing,
            self.input_error.as_deref(),
        );
        result::render(frame, left_chunks[1], self.result.as_ref());
        simulator::render(frame, left_chunks[2], &self.simulation);

        // Right column: Strategy + recommended slots
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // strategy
                Constraint::Min(0),     // slots
            ])
            .split(columns[1]);

        strategy::render(frame, right_chunks[0], self.plan.as_ref(), self.target());
        let recommended = self
            .plan
            .as_ref()
            .map(|p| p.recommended_slots.as_slice())
            .unwrap_or(&[]);
        slots::render(frame, right_chunks[1], recommended, self.slot_offset);
    }

    fn draw_compare(&self, frame: &mut Frame) {
        let body = self.frame_layout(frame);
        compare::render(
            frame,
            body,
            self.comparison.as_ref(),
            &self.curve,
            self.target(),
            self.mode,
        );
    }

    fn draw_timetable(&self, frame: &mut Frame) {
        let body = self.frame_layout(frame);
        timetable::render(frame, body, &self.division, &self.grid, self.calendar.today.weekday());
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 6,
            width: area.width / 2,
            height: (area.height * 2 / 3).max(18).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[Tab] [↑ ↓]  ", "Move between inputs"),
            ("[Enter] / [e]", "Edit the focused input"),
            ("[c]          ", "Recalculate"),
            ("[m]          ", "Cycle strategy mode"),
            ("[+] / [-]    ", "Attend / skip one more in the simulator"),
            ("[0]          ", "Reset the simulator"),
            ("[j] / [k]    ", "Scroll recommended lectures"),
            ("[v]          ", "Compare modes"),
            ("[t]          ", "Weekly timetable"),
            ("[w]          ", "Save inputs and mode"),
            ("[?]          ", "Toggle help"),
            ("[Esc]        ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {}  ", key), theme::accent()),
                Span::styled(action, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(timetable: Timetable, config: AppConfig) -> Result<()> {
    let mut app = App::new(timetable, config);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(Duration::from_secs(1));

    let outcome: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Tick) => app.tick(),
            Ok(Event::Resize) => {}
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::tests::monday;
    use crate::models::Requirement;
    use crate::timetable::builtin;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app_with(conducted: u32, attended: u32) -> App {
        let mut config = AppConfig::default();
        config.remember_inputs(conducted, attended, 0);
        App::starting_on(builtin::timetable(), config, monday())
    }

    #[test]
    fn saved_inputs_are_calculated_on_start() {
        let app = app_with(100, 60);
        let result = app.result.as_ref().unwrap();
        assert_eq!(result.current_percentage, 60.0);
        assert_eq!(result.lectures_needed, Requirement::Count(60));
        assert_eq!(result.lectures_missable, 0);

        let plan = app.plan.as_ref().unwrap();
        assert_eq!(plan.mode, StrategyMode::Medium);
        assert!(!plan.recommended_slots.is_empty());
        assert_eq!(app.comparison.as_ref().unwrap().rows.len(), 3);
        assert!(!app.curve.is_empty());
    }

    #[test]
    fn empty_form_shows_nothing() {
        let app = App::starting_on(builtin::timetable(), AppConfig::default(), monday());
        assert!(app.result.is_none());
        assert!(app.input_error.is_none());
        assert_eq!(app.fields[2], "0");
        assert_eq!(app.fields[3], "75");
    }

    #[test]
    fn editing_a_field_recalculates() {
        let mut app = app_with(100, 60);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('8'));
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.fields[1], "80");
        let result = app.result.as_ref().unwrap();
        assert_eq!(result.current_percentage, 80.0);
        assert!(result.lectures_needed.is_zero());
        assert_eq!(result.lectures_missable, 6);
    }

    #[test]
    fn invalid_counts_surface_an_error() {
        let mut app = app_with(100, 60);
        app.fields[1] = "120".to_string();
        app.recalculate();
        assert!(app.input_error.is_some());
        assert!(app.result.is_none());
        assert!(app.plan.is_none());

        app.fields[1] = "6x".to_string();
        app.recalculate();
        assert!(app.input_error.as_deref().unwrap().starts_with("Attended"));
    }

    #[test]
    fn mode_key_cycles_and_replans() {
        let mut app = app_with(100, 60);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.mode, StrategyMode::Hard);
        assert_eq!(app.plan.as_ref().unwrap().mode, StrategyMode::Hard);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.mode, StrategyMode::Easy);
    }

    #[test]
    fn simulator_follows_offset() {
        let mut app = app_with(100, 60);
        press(&mut app, KeyCode::Char('+'));
        press(&mut app, KeyCode::Char('+'));
        match &app.simulation {
            Simulation::Attend(sim) => assert_eq!(sim.lectures, 2),
            other => panic!("expected attend simulation, got {:?}", other),
        }

        for _ in 0..5 {
            press(&mut app, KeyCode::Char('-'));
        }
        match &app.simulation {
            Simulation::Skip(sim) => {
                assert_eq!(sim.lectures, 3);
                assert!(sim.new_percentage < 60.0);
            }
            other => panic!("expected skip simulation, got {:?}", other),
        }

        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.simulation, Simulation::Idle);
    }

    #[test]
    fn views_toggle_and_escape_returns() {
        let mut app = app_with(100, 60);
        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.view, View::Compare);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Dashboard);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.view, View::Timetable);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.view, View::Dashboard);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn form_and_mode_copy_into_config() {
        let mut app = app_with(100, 60);
        app.fields[3] = "80".to_string();
        app.recalculate();
        press(&mut app, KeyCode::Char('m'));
        app.apply_to_config();

        assert_eq!(app.config.inputs.conducted, Some(100));
        assert_eq!(app.config.inputs.attended, Some(60));
        assert_eq!(app.config.planner.target, 80.0);
        assert!(!app.config.planner.use_default_target);
        assert_eq!(app.config.planner.mode, StrategyMode::Hard);
    }

    #[test]
    fn unknown_division_falls_back() {
        let mut config = AppConfig::default();
        config.planner.division = "9Z99".to_string();
        let app = App::starting_on(builtin::timetable(), config, monday());
        assert!(is_valid_division(&app.timetable, &app.division));
        assert!(app.notice.is_some());
    }
}
