use serde::Serialize;

use crate::engine::strategy::{compute_required_lectures, project_after_plan, Planner};
use crate::models::{PlanRequest, Requirement, StrategyMode};
use crate::timetable::TimetableSource;

/// A skip scenario whose requirement grows past this is flagged as hard to recover from.
pub const DIFFICULT_RECOVERY_THRESHOLD: u32 = 50;

pub const DEFAULT_CURVE_STEPS: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeComparisonRow {
    pub mode: StrategyMode,
    pub scheduled: usize,
    pub skip: usize,
    pub days: u32,
    pub final_percentage: f64,
    pub actual_attend: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeComparison {
    pub required_lectures: Requirement,
    pub total_slots: usize,
    pub target_achieved: bool,
    /// Fewer future slots than lectures required.
    pub not_enough_slots: bool,
    pub rows: Vec<ModeComparisonRow>,
}

/// Easy, medium and hard side by side for the same inputs.
pub fn compare_modes<S: TimetableSource + ?Sized>(
    planner: &Planner<'_, S>,
    request: &PlanRequest,
) -> ModeComparison {
    let effective = request.effective_conducted();
    let required = compute_required_lectures(request.attended, effective, request.target);
    let slots = planner.future_slots(&request.division);

    let rows = StrategyMode::all()
        .into_iter()
        .map(|mode| {
            let stats = planner.calculate_mode_stats(
                mode,
                required,
                &slots,
                request.attended,
                effective,
                &request.division,
            );
            ModeComparisonRow {
                mode,
                scheduled: stats.scheduled_count,
                skip: stats.skip_count,
                days: stats.days_to_recover,
                final_percentage: stats.projected_percentage,
                actual_attend: stats.actual_attend,
            }
        })
        .collect();

    let not_enough_slots = match required {
        Requirement::Count(0) => false,
        Requirement::Count(n) => slots.len() < n as usize,
        Requirement::Unreachable => true,
    };

    ModeComparison {
        required_lectures: required,
        total_slots: slots.len(),
        target_achieved: required.is_zero(),
        not_enough_slots,
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendSimulation {
    pub lectures: u32,
    pub projected_percentage: f64,
    pub remaining_required: Requirement,
    pub target_met: bool,
}

/// Attend the next `n` lectures in a row.
pub fn simulate_attend(attended: u32, effective: u32, target: f64, n: u32) -> AttendSimulation {
    let projected_percentage = project_after_plan(attended, effective, n, n);
    let remaining_required = compute_required_lectures(
        attended.saturating_add(n),
        effective.saturating_add(n),
        target,
    );

    AttendSimulation {
        lectures: n,
        projected_percentage,
        remaining_required,
        target_met: projected_percentage >= target,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipSimulation {
    pub lectures: u32,
    pub new_percentage: f64,
    /// Percentage points lost against the current figure.
    pub drop: f64,
    pub new_required: Requirement,
    pub extra_required: Requirement,
    pub recovery_difficult: bool,
}

/// Skip the next `n` lectures in a row.
pub fn simulate_skip(attended: u32, effective: u32, target: f64, n: u32) -> SkipSimulation {
    let current = project_after_plan(attended, effective, 0, 0);
    let new_percentage = project_after_plan(attended, effective, 0, n);

    let current_required = compute_required_lectures(attended, effective, target);
    let new_required = compute_required_lectures(attended, effective.saturating_add(n), target);

    let extra_required = match (current_required, new_required) {
        (Requirement::Count(before), Requirement::Count(after)) => {
            Requirement::Count(after.saturating_sub(before))
        }
        (Requirement::Count(_), Requirement::Unreachable) => Requirement::Unreachable,
        (Requirement::Unreachable, _) => Requirement::NONE,
    };

    let recovery_difficult = match new_required {
        Requirement::Count(n) => n > DIFFICULT_RECOVERY_THRESHOLD,
        Requirement::Unreachable => true,
    };

    SkipSimulation {
        lectures: n,
        new_percentage,
        drop: current - new_percentage,
        new_required,
        extra_required,
        recovery_difficult,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub lectures: u32,
    pub percentage: f64,
}

/// Percentage after attending `n` more lectures in a row, sampled at `steps`
/// points from 0 to `min(max(required * 1.5, 30), 200)`.
pub fn recovery_curve(
    attended: u32,
    effective: u32,
    required: Requirement,
    steps: usize,
) -> Vec<CurvePoint> {
    let steps = steps.max(1);
    let max_n = (required.as_f64() * 1.5).max(30.0).min(200.0);

    let mut points: Vec<CurvePoint> = (0..=steps)
        .map(|i| {
            let lectures = (i as f64 / steps as f64 * max_n).round() as u32;
            CurvePoint {
                lectures,
                percentage: project_after_plan(attended, effective, lectures, lectures),
            }
        })
        .collect();
    points.dedup_by_key(|p| p.lectures);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::tests::calendar;
    use crate::timetable::builtin::{self, DEFAULT_DIVISION};

    fn request(attended: u32, conducted: u32, target: f64) -> PlanRequest {
        PlanRequest {
            conducted,
            attended,
            no_attendance: 0,
            target,
            division: DEFAULT_DIVISION.to_string(),
            mode: StrategyMode::Medium,
        }
    }

    #[test]
    fn comparison_lists_every_mode_in_order() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(8));
        let comparison = compare_modes(&planner, &request(60, 100, 75.0));

        let modes: Vec<_> = comparison.rows.iter().map(|r| r.mode).collect();
        assert_eq!(modes, StrategyMode::all().to_vec());
        assert_eq!(comparison.required_lectures, Requirement::Count(60));
        assert!(!comparison.target_achieved);
        assert!(!comparison.not_enough_slots);
        for row in &comparison.rows {
            assert_eq!(row.scheduled + row.skip, comparison.total_slots);
        }
        assert!(comparison.rows[2].days <= comparison.rows[1].days);
    }

    #[test]
    fn comparison_flags_missing_slots() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(1));
        let comparison = compare_modes(&planner, &request(10, 100, 75.0));
        assert!(comparison.not_enough_slots);
        assert!(comparison
            .rows
            .iter()
            .all(|r| r.actual_attend <= comparison.total_slots));

        let done = compare_modes(&planner, &request(90, 100, 75.0));
        assert!(done.target_achieved);
        assert!(!done.not_enough_slots);
    }

    #[test]
    fn attending_raises_the_projection() {
        let sim = simulate_attend(60, 100, 75.0, 0);
        assert_eq!(sim.projected_percentage, 60.0);
        assert_eq!(sim.remaining_required, Requirement::Count(60));
        assert!(!sim.target_met);

        let sim = simulate_attend(60, 100, 75.0, 60);
        assert_eq!(sim.projected_percentage, 75.0);
        assert_eq!(sim.remaining_required, Requirement::NONE);
        assert!(sim.target_met);
    }

    #[test]
    fn skipping_costs_extra_lectures() {
        let sim = simulate_skip(80, 100, 75.0, 10);
        assert!((sim.new_percentage - 72.727).abs() < 1e-3);
        assert!((sim.drop - 7.273).abs() < 1e-3);
        // (0.75 * 110 - 80) / 0.25 = 10
        assert_eq!(sim.new_required, Requirement::Count(10));
        assert_eq!(sim.extra_required, Requirement::Count(10));
        assert!(!sim.recovery_difficult);

        let heavy = simulate_skip(60, 100, 75.0, 20);
        assert_eq!(heavy.new_required, Requirement::Count(120));
        assert_eq!(heavy.extra_required, Requirement::Count(60));
        assert!(heavy.recovery_difficult);
    }

    #[test]
    fn skipping_at_full_target_is_unrecoverable() {
        let sim = simulate_skip(10, 10, 100.0, 1);
        assert_eq!(sim.new_required, Requirement::Unreachable);
        assert_eq!(sim.extra_required, Requirement::Unreachable);
        assert!(sim.recovery_difficult);
    }

    #[test]
    fn recovery_curve_range() {
        let curve = recovery_curve(60, 100, Requirement::Count(60), DEFAULT_CURVE_STEPS);
        assert_eq!(curve.first().unwrap().lectures, 0);
        assert_eq!(curve.first().unwrap().percentage, 60.0);
        assert_eq!(curve.last().unwrap().lectures, 90);
        assert!(curve.windows(2).all(|w| w[0].percentage <= w[1].percentage));

        let small = recovery_curve(9, 10, Requirement::Count(1), DEFAULT_CURVE_STEPS);
        assert_eq!(small.last().unwrap().lectures, 30);

        let capped = recovery_curve(9, 10, Requirement::Unreachable, DEFAULT_CURVE_STEPS);
        assert_eq!(capped.last().unwrap().lectures, 200);
    }
}
