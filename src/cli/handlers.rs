use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local};
use std::io::{self, Read};
use std::path::Path;

use crate::api::{self, ApiReply};
use crate::cli::args::{ApiCommands, CountArgs, PlanArgs};
use crate::config::AppConfig;
use crate::engine::attendance::{full_calculation, validate_inputs};
use crate::engine::compare::{compare_modes, simulate_attend, simulate_skip};
use crate::engine::strategy::{risk_level, DailyPattern};
use crate::engine::Planner;
use crate::models::{LectureCounts, PlanRequest, RiskLevel, SlotType, StrategyMode};
use crate::models::timetable::weekday_name;
use crate::timetable::query::MismatchKind;
use crate::timetable::{
    build_grid, divisions_by_section, faculty_full_name, is_valid_division, subject_full_name,
    unique_subjects, upcoming_lectures, validate_faculty_mapping, TeachingCalendar, Timetable,
    TimetableSource,
};
use crate::utils::format::{fit_width, format_percentage, format_requirement, plural, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! print_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        print!("\x1b[0m");
    }};
}

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const ACCENT: &str = "\x1b[38;2;86;182;194m";

fn risk_color(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Safe => GREEN,
        RiskLevel::Warning => AMBER,
        RiskLevel::Critical => RED,
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Counts and target from the flags, falling back to saved settings, validated.
fn resolve_counts(counts: &CountArgs, config: &AppConfig) -> Result<(LectureCounts, f64)> {
    let conducted = counts
        .conducted
        .or(config.inputs.conducted)
        .ok_or_else(|| anyhow!("No conducted count. Pass --conducted or save one with `hazri calc --save`"))?;
    let attended = counts
        .attended
        .or(config.inputs.attended)
        .ok_or_else(|| anyhow!("No attended count. Pass --attended or save one with `hazri calc --save`"))?;
    let no_attendance = counts
        .no_attendance
        .or(config.inputs.no_attendance)
        .unwrap_or(0);
    let target = counts.target.unwrap_or(config.planner.effective_target());

    let validated = validate_inputs(
        attended as f64,
        conducted as f64,
        Some(target),
        no_attendance as f64,
    )?;
    Ok((validated, target))
}

fn resolve_division(timetable: &Timetable, division: Option<&str>, config: &AppConfig) -> Result<String> {
    let division = division.unwrap_or(&config.planner.division).to_uppercase();
    if !is_valid_division(timetable, &division) {
        bail!(
            "Unknown division '{}'. Run `hazri divisions` to list them",
            division
        );
    }
    Ok(division)
}

fn resolve_mode(mode: Option<&str>, config: &AppConfig) -> Result<StrategyMode> {
    match mode {
        Some(m) => m
            .parse()
            .map_err(|_| anyhow!("Unknown mode '{}'. Use: easy, medium, hard", m)),
        None => Ok(config.planner.mode),
    }
}

fn planner<'a>(timetable: &'a Timetable, config: &AppConfig) -> Planner<'a, Timetable> {
    Planner::new(
        timetable,
        TeachingCalendar::starting_today(config.calendar.teaching_end),
    )
}

fn plan_request(
    timetable: &Timetable,
    args: &PlanArgs,
    mode: StrategyMode,
    config: &AppConfig,
) -> Result<PlanRequest> {
    let (counts, target) = resolve_counts(&args.counts, config)?;
    let division = resolve_division(timetable, args.division.as_deref(), config)?;
    Ok(PlanRequest {
        conducted: counts.conducted,
        attended: counts.attended,
        no_attendance: counts.no_attendance,
        target,
        division,
        mode,
    })
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub fn handle_settings(timetable: &Timetable, config: &mut AppConfig, reset: bool) -> Result<()> {
    if reset {
        let inputs = config.inputs.clone();
        *config = AppConfig {
            inputs,
            ..AppConfig::default()
        };
    }
    crate::cli::setup_tui::run_setup_tui(timetable, config)
}

// ─── Calc ────────────────────────────────────────────────────────────────────

pub fn handle_calc(config: &mut AppConfig, counts: &CountArgs, save: bool) -> Result<()> {
    let (validated, target) = resolve_counts(counts, config)?;
    let result = full_calculation(
        validated.attended as f64,
        validated.conducted as f64,
        target,
        validated.no_attendance as f64,
    )?;

    let effective = validated.effective();
    let risk = risk_level(result.current_percentage, target);

    println!();
    println_colored!(
        ACCENT,
        "  Attendance  {}/{} lectures",
        result.attended,
        effective
    );
    if result.no_attendance > 0 {
        println_colored!(
            DIM,
            "  {} of {} conducted had no attendance taken",
            result.no_attendance,
            result.conducted
        );
    }
    println!();
    println_colored!(
        risk_color(risk),
        "  {:>8}  {}  target {}",
        format_percentage(result.current_percentage, 2),
        progress_bar(result.current_percentage, 100.0, 24),
        format_percentage(target, 2)
    );
    println!();

    if result.is_above_target {
        if result.lectures_missable == 0 {
            println_colored!(AMBER, "  ✓ On target, but you cannot miss the next lecture");
        } else {
            println_colored!(
                GREEN,
                "  ✓ Above target. You can miss {} in a row",
                plural(result.lectures_missable as usize, "lecture")
            );
        }
    } else if result.lectures_needed.is_unreachable() {
        println_colored!(RED, "  ✗ {} can no longer be reached", format_percentage(target, 2));
    } else {
        println_colored!(
            RED,
            "  ✗ Below target. Attend the next {} in a row",
            plural(
                result.lectures_needed.count().unwrap_or(0) as usize,
                "lecture"
            )
        );
    }
    println!();

    if save {
        config.remember_inputs(result.conducted, result.attended, result.no_attendance);
        config.save()?;
        println_colored!(DIM, "  Counts saved");
    }
    Ok(())
}

// ─── Plan ────────────────────────────────────────────────────────────────────

pub fn handle_plan(
    timetable: &Timetable,
    config: &AppConfig,
    args: &PlanArgs,
    mode: Option<&str>,
    limit: usize,
) -> Result<()> {
    let mode = resolve_mode(mode, config)?;
    let request = plan_request(timetable, args, mode, config)?;
    let plan = planner(timetable, config).generate_global_plan(&request);
    let summary = &plan.summary;

    println!();
    println_colored!(
        ACCENT,
        "  {} {} mode  ·  {}  ·  {}",
        mode.symbol(),
        mode.display_name(),
        mode.description(),
        request.division
    );
    println!();

    let risk = risk_level(summary.current_percentage, request.target);
    println_colored!(
        risk_color(risk),
        "  Current      {}  ({})",
        format_percentage(summary.current_percentage, 1),
        risk.as_str()
    );
    println!(
        "  Required     {}",
        format_requirement(summary.required_lectures)
    );
    println!(
        "  Attend       {} of {} lectures left",
        summary.scheduled_count, summary.total_available_slots
    );
    println!("  Skip         {}", summary.skip_count);
    println!("  Recover in   {}", plural(summary.days_to_recover as usize, "teaching day"));
    println!(
        "  Projected    {}",
        format_percentage(summary.projected_percentage, 1)
    );
    if summary.safe_skip_allowance > 0 {
        println_colored!(
            GREEN,
            "  Safe skips   {}",
            summary.safe_skip_allowance
        );
    }
    println!();

    if summary.required_lectures.is_zero() {
        println_colored!(GREEN, "  ✓ Target already met. Nothing to schedule");
        println!();
        return Ok(());
    }
    if plan.recommended_slots.is_empty() {
        println_colored!(RED, "  ✗ No lectures left before teaching ends");
        println!();
        return Ok(());
    }
    if (summary.scheduled_count as f64) < summary.required_lectures.as_f64() {
        println_colored!(
            AMBER,
            "  ! Only {} lectures fit in this mode before teaching ends",
            summary.scheduled_count
        );
        println!();
    }

    for rec in plan.recommended_slots.iter().take(limit) {
        let slot = &rec.slot;
        println!(
            "  {:>3}. {}  {}  {}  {}  {}",
            rec.index,
            slot.date.format("%a %d %b"),
            slot.time,
            fit_width(&slot.subject_short, 5),
            fit_width(slot.slot_type.as_str(), 7),
            slot.room
        );
    }
    if plan.recommended_slots.len() > limit {
        println_colored!(
            DIM,
            "       … and {} more",
            plan.recommended_slots.len() - limit
        );
    }
    println!();
    Ok(())
}

// ─── Compare ─────────────────────────────────────────────────────────────────

pub fn handle_compare(timetable: &Timetable, config: &AppConfig, args: &PlanArgs) -> Result<()> {
    let request = plan_request(timetable, args, config.planner.mode, config)?;
    let comparison = compare_modes(&planner(timetable, config), &request);

    println!();
    println_colored!(
        ACCENT,
        "  Mode comparison  ·  {}  ·  required {}",
        request.division,
        format_requirement(comparison.required_lectures)
    );
    println!();

    if comparison.target_achieved {
        println_colored!(GREEN, "  ✓ Target already met in every mode");
        println!();
        return Ok(());
    }
    if comparison.not_enough_slots {
        println_colored!(
            AMBER,
            "  ! Only {} lectures left before teaching ends",
            comparison.total_slots
        );
        println!();
    }

    println_colored!(
        DIM,
        "  {}{}{}{}{}",
        fit_width("Mode", 18),
        fit_width("Attend", 8),
        fit_width("Skip", 7),
        fit_width("Days", 7),
        "Final"
    );
    for row in &comparison.rows {
        let color = if row.mode == config.planner.mode { BOLD } else { "" };
        println_colored!(
            color,
            "  {}{}{}{}{}",
            fit_width(&format!("{} {}", row.mode.symbol(), row.mode.pace_label()), 18),
            fit_width(&row.scheduled.to_string(), 8),
            fit_width(&row.skip.to_string(), 7),
            fit_width(&row.days.to_string(), 7),
            format_percentage(row.final_percentage, 1)
        );
    }
    println!();
    Ok(())
}

// ─── Simulate ────────────────────────────────────────────────────────────────

pub fn handle_simulate(
    config: &AppConfig,
    counts: &CountArgs,
    attend: Option<u32>,
    skip: Option<u32>,
) -> Result<()> {
    let (validated, target) = resolve_counts(counts, config)?;
    let effective = validated.effective();

    println!();
    match (attend, skip) {
        (Some(n), _) => {
            let sim = simulate_attend(validated.attended, effective, target, n);
            println_colored!(ACCENT, "  If you attend the next {}", plural(n as usize, "lecture"));
            println!();
            println!(
                "  Attendance   {}",
                format_percentage(sim.projected_percentage, 2)
            );
            if sim.target_met {
                println_colored!(GREEN, "  ✓ Target reached");
            } else {
                println_colored!(
                    AMBER,
                    "  Still needed {}",
                    format_requirement(sim.remaining_required)
                );
            }
        }
        (None, Some(n)) => {
            let sim = simulate_skip(validated.attended, effective, target, n);
            println_colored!(ACCENT, "  If you skip the next {}", plural(n as usize, "lecture"));
            println!();
            println!(
                "  Attendance   {}  (−{:.2} points)",
                format_percentage(sim.new_percentage, 2),
                sim.drop
            );
            println!("  Required     {}", format_requirement(sim.new_required));
            if sim.recovery_difficult {
                println_colored!(RED, "  ✗ Recovery would be difficult");
            } else if !sim.extra_required.is_zero() {
                println_colored!(
                    AMBER,
                    "  Skipping adds {} to your recovery plan",
                    format_requirement(sim.extra_required)
                );
            } else {
                println_colored!(GREEN, "  ✓ Still safe");
            }
        }
        (None, None) => bail!("Pass --attend N or --skip N"),
    }
    println!();
    Ok(())
}

// ─── Timetable ───────────────────────────────────────────────────────────────

pub fn handle_timetable(
    timetable: &Timetable,
    config: &AppConfig,
    division: Option<&str>,
    upcoming: Option<usize>,
    check: bool,
) -> Result<()> {
    if check {
        return print_faculty_check(timetable);
    }

    let division = resolve_division(timetable, division, config)?;
    println!();

    if let Some(days) = upcoming {
        let today = Local::now().date_naive().weekday();
        println_colored!(
            ACCENT,
            "  {}  ·  next {} from {}",
            division,
            plural(days, "teaching day"),
            weekday_name(today)
        );
        let mut current_day = None;
        for entry in upcoming_lectures(timetable, &division, today, days) {
            if current_day != Some(entry.day) {
                println!();
                println_colored!(BOLD, "  {}", weekday_name(entry.day));
                current_day = Some(entry.day);
            }
            let line = format!(
                "    {}  {}  {}  {}",
                entry.time_range(),
                fit_width(&subject_full_name(timetable, &division, &entry.subject_short), 28),
                fit_width(&entry.room, 16),
                faculty_full_name(timetable, &entry.faculty)
            );
            if entry.is_teaching() {
                println!("{}", line);
            } else {
                println_colored!(DIM, "{}", line);
            }
        }
        println!();
        return Ok(());
    }

    let grid = build_grid(timetable, &division);
    let pattern = DailyPattern::from_schedule(timetable.schedule(&division));
    println_colored!(
        ACCENT,
        "  {}  ·  weekly timetable  ·  {} a week",
        division,
        plural(pattern.weekly_total() as usize, "lecture")
    );
    println!();

    let mut header = format!("  {}", fit_width("", 5));
    for i in 0..grid.slots.len() {
        header.push_str(&fit_width(&grid.slot_label(i), 13));
    }
    println_colored!(DIM, "{}", header);

    for row in &grid.rows {
        let mut line = format!("  {}", fit_width(&weekday_name(row.day)[..3], 5));
        for cell in &row.cells {
            let text = match cell {
                Some(entry) if entry.slot_type == SlotType::Lab => {
                    format!("{} Lab", entry.subject_short)
                }
                Some(entry) => entry.subject_short.clone(),
                None => "·".to_string(),
            };
            line.push_str(&fit_width(&text, 13));
        }
        println!("{}", line);
    }
    println!();

    for short in unique_subjects(timetable, &division) {
        println_colored!(
            DIM,
            "  {}  {}",
            fit_width(&short, 12),
            subject_full_name(timetable, &division, &short)
        );
    }
    println!();
    Ok(())
}

fn print_faculty_check(timetable: &Timetable) -> Result<()> {
    let report = validate_faculty_mapping(timetable);

    println!();
    let color = if report.mismatches.is_empty() { GREEN } else { AMBER };
    println_colored!(
        color,
        "  Faculty mapping  {}/{} entries valid ({}%)",
        report.valid_entries,
        report.total_entries,
        report.match_percentage
    );

    if !report.mismatches.is_empty() {
        println!();
        for mismatch in &report.mismatches {
            let kind = match mismatch.kind {
                MismatchKind::Unmapped => "unmapped",
                MismatchKind::BlankShortCode => "blank code",
            };
            println!(
                "  {}  {}  {}  ({})",
                fit_width(&mismatch.division, 6),
                fit_width(&mismatch.subject, 12),
                mismatch.faculty_short,
                kind
            );
        }
    }
    if let Some((division, count)) = &report.worst_division {
        println!();
        println_colored!(DIM, "  Most problems: {} ({})", division, count);
    }
    println!();
    Ok(())
}

// ─── Divisions ───────────────────────────────────────────────────────────────

pub fn handle_divisions(timetable: &Timetable, config: &AppConfig) -> Result<()> {
    println!();
    for (section, ids) in divisions_by_section(timetable) {
        let list = ids
            .iter()
            .map(|id| {
                if *id == config.planner.division {
                    format!("{}*", id)
                } else {
                    id.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        print_colored!(ACCENT, "  {}  ", section);
        println!("{}", list);
    }
    println!();
    println_colored!(DIM, "  * current division");
    println!();
    Ok(())
}

// ─── API ─────────────────────────────────────────────────────────────────────

fn read_body(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Reading request body from {:?}", path)),
        None => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("Reading request body from stdin")?;
            Ok(body)
        }
    }
}

fn emit<T: serde::Serialize>(reply: ApiReply<T>) -> Result<()> {
    println!("{}", reply.to_json()?);
    if !reply.status.is_success() {
        bail!("request failed with status {}", reply.status.code());
    }
    Ok(())
}

pub fn handle_api(timetable: &Timetable, config: &AppConfig, route: &ApiCommands) -> Result<()> {
    match route {
        ApiCommands::Calculate { input } => {
            let body = read_body(input.as_deref())?;
            emit(api::handle_calculate(&body))
        }
        ApiCommands::Recommend { input } => {
            let body = read_body(input.as_deref())?;
            emit(api::handle_recommend(&planner(timetable, config), &body))
        }
        ApiCommands::History => emit(api::handle_history()),
    }
}
