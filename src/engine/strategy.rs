use chrono::{Datelike, Days, Weekday};

use crate::engine::attendance::{solve_missable, solve_needed};
use crate::engine::round_to;
use crate::models::timetable::weekday_name;
use crate::models::{
    FutureSlot, GlobalStrategyPlan, ModeStats, PlanRequest, PlanSummary, RecommendedSlot,
    Requirement, RiskLevel, ScheduleEntry, StrategyMode,
};
use crate::timetable::{TeachingCalendar, TimetableSource};

/// Upper bound on the weekday walk in `calculate_target_days`. Any schedule
/// with capacity finishes far below this; hitting it means the pattern is bad.
pub const MAX_PACING_ITERATIONS: u32 = 1000;

/// Future slots are never drawn from further ahead than this.
pub const MAX_HORIZON_DAYS: u64 = 366;

/// Lectures still needed to reach `target`, on effective counts.
///
/// Unlike `lectures_needed`, nothing conducted yet means nothing required.
pub fn compute_required_lectures(attended: u32, effective: u32, target: f64) -> Requirement {
    if effective == 0 {
        return Requirement::NONE;
    }
    if current_percentage(attended, effective) >= target {
        return Requirement::NONE;
    }
    if target >= 100.0 {
        return if attended < effective {
            Requirement::Unreachable
        } else {
            Requirement::NONE
        };
    }
    Requirement::Count(solve_needed(attended, effective, target))
}

/// Lectures that can be skipped while staying at or above `target`.
pub fn compute_skip_allowance(attended: u32, effective: u32, target: f64) -> u32 {
    if effective == 0 || current_percentage(attended, effective) < target {
        return 0;
    }
    solve_missable(attended, effective, target)
}

/// How many lectures a mode plans to attend. Medium adds a 10% buffer,
/// rounded up; every mode is capped by the slots actually left.
pub fn compute_actual_attend(required: Requirement, mode: StrategyMode, total_slots: usize) -> usize {
    let required = match required {
        Requirement::Count(0) => return 0,
        Requirement::Count(n) => n as usize,
        Requirement::Unreachable => return total_slots,
    };

    match mode {
        StrategyMode::Easy | StrategyMode::Hard => required.min(total_slots),
        StrategyMode::Medium => required
            .saturating_add(required.div_ceil(10))
            .min(total_slots),
    }
}

/// Pick slots for a mode: easy takes every 3rd, medium every 2nd, hard every
/// slot, then keeps the first `actual_attend` and numbers them from 1.
pub fn select_slots_by_mode(
    slots: &[FutureSlot],
    actual_attend: usize,
    mode: StrategyMode,
) -> Vec<RecommendedSlot> {
    if actual_attend == 0 || slots.is_empty() {
        return Vec::new();
    }

    let stride = match mode {
        StrategyMode::Easy => 3,
        StrategyMode::Medium => 2,
        StrategyMode::Hard => 1,
    };

    slots
        .iter()
        .step_by(stride)
        .take(actual_attend)
        .enumerate()
        .map(|(i, slot)| RecommendedSlot {
            slot: slot.clone(),
            index: i + 1,
        })
        .collect()
}

/// Teaching slots per weekday, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyPattern {
    counts: [u32; 7],
}

impl DailyPattern {
    pub fn from_schedule(schedule: &[ScheduleEntry]) -> Self {
        let mut pattern = Self::default();
        for entry in schedule.iter().filter(|e| e.is_teaching()) {
            pattern.counts[entry.day.num_days_from_monday() as usize] += 1;
        }
        pattern
    }

    pub fn capacity(&self, day: Weekday) -> u32 {
        self.counts[day.num_days_from_monday() as usize]
    }

    pub fn has_capacity(&self) -> bool {
        PACING_DAYS.iter().any(|d| self.capacity(*d) > 0)
    }

    pub fn weekly_total(&self) -> u32 {
        PACING_DAYS.iter().map(|d| self.capacity(*d)).sum()
    }
}

const PACING_DAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Teaching days needed to sit `required` lectures, walking Monday..Saturday
/// and taking each day's full capacity.
pub fn calculate_target_days(required: usize, pattern: &DailyPattern) -> u32 {
    if required == 0 || !pattern.has_capacity() {
        return 0;
    }

    let mut remaining = required as i64;
    let mut days = 0u32;

    while remaining > 0 {
        if days >= MAX_PACING_ITERATIONS {
            log::warn!(
                "pacing stopped after {} days with {} lectures left; capacity pattern {:?} looks malformed",
                MAX_PACING_ITERATIONS,
                remaining,
                pattern
            );
            break;
        }
        let day = PACING_DAYS[days as usize % PACING_DAYS.len()];
        remaining -= pattern.capacity(day) as i64;
        days += 1;
    }

    days
}

/// Percentage after attending `extra_attended` of `extra_conducted` more lectures.
pub fn project_after_plan(
    attended: u32,
    conducted: u32,
    extra_attended: u32,
    extra_conducted: u32,
) -> f64 {
    let new_attended = attended as u64 + extra_attended as u64;
    let new_conducted = conducted as u64 + extra_conducted as u64;
    if new_conducted == 0 {
        return 100.0;
    }
    new_attended as f64 / new_conducted as f64 * 100.0
}

pub fn risk_level(percentage: f64, target: f64) -> RiskLevel {
    if percentage >= target {
        RiskLevel::Safe
    } else if percentage >= target - 10.0 {
        RiskLevel::Warning
    } else {
        RiskLevel::Critical
    }
}

fn current_percentage(attended: u32, effective: u32) -> f64 {
    attended as f64 / effective as f64 * 100.0
}

/// Builds strategy plans from a timetable and a teaching calendar.
pub struct Planner<'a, S: TimetableSource + ?Sized> {
    source: &'a S,
    calendar: TeachingCalendar,
}

impl<'a, S: TimetableSource + ?Sized> Planner<'a, S> {
    pub fn new(source: &'a S, calendar: TeachingCalendar) -> Self {
        Self { source, calendar }
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Every teaching slot from today through the last teaching day, in order.
    pub fn future_slots(&self, division: &str) -> Vec<FutureSlot> {
        let schedule = self.source.schedule(division);
        let mut by_day: Vec<Vec<&ScheduleEntry>> = vec![Vec::new(); 7];
        for entry in schedule.iter().filter(|e| e.is_teaching()) {
            by_day[entry.day.num_days_from_monday() as usize].push(entry);
        }
        for entries in by_day.iter_mut() {
            entries.sort_by_key(|e| e.start);
        }

        let mut slots = Vec::new();
        let mut date = self.calendar.today;
        let mut walked = 0;

        while date <= self.calendar.teaching_end && walked < MAX_HORIZON_DAYS {
            let day = date.weekday();
            if day != Weekday::Sun {
                for entry in &by_day[day.num_days_from_monday() as usize] {
                    slots.push(FutureSlot {
                        date,
                        day: weekday_name(day).to_string(),
                        time: entry.time_range(),
                        room: entry.room.clone(),
                        slot_type: entry.slot_type,
                        faculty: entry.faculty.clone(),
                        subject_short: entry.subject_short.clone(),
                    });
                }
            }

            walked += 1;
            match date.checked_add_days(Days::new(1)) {
                Some(next) => date = next,
                None => break,
            }
        }

        slots
    }

    pub fn daily_lecture_pattern(&self, division: &str) -> DailyPattern {
        DailyPattern::from_schedule(self.source.schedule(division))
    }

    /// Everything that differs between modes for the same requirement.
    pub fn calculate_mode_stats(
        &self,
        mode: StrategyMode,
        required: Requirement,
        slots: &[FutureSlot],
        attended: u32,
        effective: u32,
        division: &str,
    ) -> ModeStats {
        let total_slots = slots.len();
        let actual_attend = compute_actual_attend(required, mode, total_slots);
        let recommended_slots = select_slots_by_mode(slots, actual_attend, mode);
        let scheduled_count = recommended_slots.len();
        let skip_count = total_slots - scheduled_count;

        let pattern = self.daily_lecture_pattern(division);
        let days_to_recover = calculate_target_days(actual_attend, &pattern);

        let scheduled = u32::try_from(scheduled_count).unwrap_or(u32::MAX);
        let projected = project_after_plan(attended, effective, scheduled, scheduled);

        log::debug!(
            "{} mode: attend {} of {} slots over {} days -> {:.1}%",
            mode.as_str(),
            actual_attend,
            total_slots,
            days_to_recover,
            projected
        );

        ModeStats {
            actual_attend,
            scheduled_count,
            skip_count,
            days_to_recover,
            projected_percentage: round_to(projected, 1),
            recommended_slots,
        }
    }

    /// The full plan for one request. Recomputed on every call.
    pub fn generate_global_plan(&self, request: &PlanRequest) -> GlobalStrategyPlan {
        let effective = request.effective_conducted();
        let required = compute_required_lectures(request.attended, effective, request.target);
        let safe_skip_allowance = compute_skip_allowance(request.attended, effective, request.target);
        let current = if effective > 0 {
            current_percentage(request.attended, effective)
        } else {
            100.0
        };

        let slots = self.future_slots(&request.division);
        let stats = self.calculate_mode_stats(
            request.mode,
            required,
            &slots,
            request.attended,
            effective,
            &request.division,
        );

        log::debug!(
            "plan for {}: required={} current={:.1}% slots={}",
            request.division,
            required,
            current,
            slots.len()
        );

        GlobalStrategyPlan {
            mode: request.mode,
            summary: PlanSummary {
                required_lectures: required,
                scheduled_count: stats.scheduled_count,
                skip_count: stats.skip_count,
                days_to_recover: if required.is_zero() {
                    0
                } else {
                    stats.days_to_recover
                },
                safe_skip_allowance,
                projected_percentage: stats.projected_percentage,
                current_percentage: round_to(current, 1),
                total_available_slots: slots.len(),
                actual_attend: stats.actual_attend,
            },
            recommended_slots: stats.recommended_slots,
        }
    }
}
