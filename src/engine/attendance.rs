use chrono::Utc;
use uuid::Uuid;

use crate::engine::error::AttendanceError;
use crate::engine::{round_to, NEEDED_EPSILON};
use crate::models::{CalculationResult, LectureCounts, Requirement};

/// Check raw inputs and turn them into whole lecture counts.
///
/// Every public function in this module calls this first.
pub fn validate_inputs(
    attended: f64,
    conducted: f64,
    target: Option<f64>,
    no_attendance: f64,
) -> Result<LectureCounts, AttendanceError> {
    let counts = [attended, conducted, no_attendance];

    if counts.iter().any(|v| !v.is_finite()) {
        return Err(AttendanceError::not_finite());
    }
    if counts.iter().any(|v| *v < 0.0) {
        return Err(AttendanceError::negative());
    }
    if counts.iter().any(|v| v.fract() != 0.0) {
        return Err(AttendanceError::not_whole());
    }
    if counts.iter().any(|v| *v > u32::MAX as f64) {
        return Err(AttendanceError::too_large());
    }
    if no_attendance > conducted {
        return Err(AttendanceError::no_attendance_exceeds_conducted());
    }
    if attended > conducted - no_attendance {
        return Err(AttendanceError::attended_exceeds_effective());
    }
    if let Some(target) = target {
        if !target.is_finite() {
            return Err(AttendanceError::target_not_finite());
        }
        if target <= 0.0 || target > 100.0 {
            return Err(AttendanceError::target_out_of_range());
        }
    }

    Ok(LectureCounts {
        attended: attended as u32,
        conducted: conducted as u32,
        no_attendance: no_attendance as u32,
    })
}

/// Current attendance percentage over effective conducted lectures.
/// Zero effective lectures gives 0%, not 100%.
pub fn calculate_attendance(
    attended: f64,
    conducted: f64,
    no_attendance: f64,
) -> Result<f64, AttendanceError> {
    let counts = validate_inputs(attended, conducted, None, no_attendance)?;
    Ok(percentage(counts.attended, counts.effective()))
}

/// Consecutive lectures that must be attended to reach `target`.
pub fn lectures_needed(
    attended: f64,
    conducted: f64,
    target: f64,
    no_attendance: f64,
) -> Result<Requirement, AttendanceError> {
    let counts = validate_inputs(attended, conducted, Some(target), no_attendance)?;
    let effective = counts.effective();

    // Nothing counted yet: at least one lecture is needed to start a percentage.
    if effective == 0 {
        return Ok(if target > 0.0 {
            Requirement::Count(1)
        } else {
            Requirement::NONE
        });
    }

    if percentage(counts.attended, effective) >= target {
        return Ok(Requirement::NONE);
    }

    if target >= 100.0 {
        return Ok(if counts.attended == effective {
            Requirement::NONE
        } else {
            Requirement::Unreachable
        });
    }

    Ok(Requirement::Count(solve_needed(
        counts.attended,
        effective,
        target,
    )))
}

/// Consecutive lectures that can be missed while staying at or above `target`.
pub fn lectures_missable(
    attended: f64,
    conducted: f64,
    target: f64,
    no_attendance: f64,
) -> Result<u32, AttendanceError> {
    let counts = validate_inputs(attended, conducted, Some(target), no_attendance)?;
    let effective = counts.effective();

    if effective == 0 || percentage(counts.attended, effective) < target {
        return Ok(0);
    }

    Ok(solve_missable(counts.attended, effective, target))
}

/// Everything a caller shows after one calculation, stamped with a fresh id.
pub fn full_calculation(
    attended: f64,
    conducted: f64,
    target: f64,
    no_attendance: f64,
) -> Result<CalculationResult, AttendanceError> {
    let counts = validate_inputs(attended, conducted, Some(target), no_attendance)?;
    let current = calculate_attendance(attended, conducted, no_attendance)?;
    let needed = lectures_needed(attended, conducted, target, no_attendance)?;
    let missable = lectures_missable(attended, conducted, target, no_attendance)?;

    let current_percentage = round_to(current, 2);
    log::debug!(
        "calculated {}/{} (-{}) -> {:.2}% needed={} missable={}",
        counts.attended,
        counts.conducted,
        counts.no_attendance,
        current_percentage,
        needed,
        missable
    );

    Ok(CalculationResult {
        id: Uuid::new_v4(),
        calculated_at: Utc::now(),
        current_percentage,
        is_above_target: current >= target,
        target,
        lectures_needed: needed,
        lectures_missable: missable,
        conducted: counts.conducted,
        attended: counts.attended,
        no_attendance: counts.no_attendance,
    })
}

fn percentage(attended: u32, effective: u32) -> f64 {
    if effective == 0 {
        0.0
    } else {
        attended as f64 / effective as f64 * 100.0
    }
}

/// `(attended + extra) / (effective + extra) >= target / 100`, cross-multiplied
/// so that whole-number targets compare exactly.
fn holds_after_attending(attended: f64, effective: f64, extra: f64, target: f64) -> bool {
    (attended + extra) * 100.0 >= target * (effective + extra)
}

/// `attended / (effective + missed) >= target / 100`, cross-multiplied.
fn holds_after_missing(attended: f64, effective: f64, missed: f64, target: f64) -> bool {
    attended * 100.0 >= target * (effective + missed)
}

/// Smallest `x` with `(attended + x) / (effective + x) >= target / 100`.
///
/// Expects `target < 100`. The closed form is corrected by `NEEDED_EPSILON`
/// and then checked against the inequality itself, so representation error
/// in either direction cannot move the answer off by one.
pub(crate) fn solve_needed(attended: u32, effective: u32, target: f64) -> u32 {
    let (a, e) = (attended as f64, effective as f64);
    let t = target / 100.0;
    let closed = ((t * e - a) / (1.0 - t) - NEEDED_EPSILON).ceil().max(0.0);
    let mut x = if closed >= u32::MAX as f64 {
        u32::MAX
    } else {
        closed as u32
    };

    while x < u32::MAX && !holds_after_attending(a, e, x as f64, target) {
        x += 1;
    }
    while x > 0 && holds_after_attending(a, e, (x - 1) as f64, target) {
        x -= 1;
    }
    x
}

/// Largest `x` with `attended / (effective + x) >= target / 100`.
///
/// Expects the current percentage to already meet `target`.
pub(crate) fn solve_missable(attended: u32, effective: u32, target: f64) -> u32 {
    let (a, e) = (attended as f64, effective as f64);
    let t = target / 100.0;
    let closed = ((a - t * e) / t).floor().max(0.0);
    let mut x = if closed >= u32::MAX as f64 {
        u32::MAX
    } else {
        closed as u32
    };

    while x > 0 && !holds_after_missing(a, e, x as f64, target) {
        x -= 1;
    }
    while x < u32::MAX && holds_after_missing(a, e, (x + 1) as f64, target) {
        x += 1;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn needed(attended: f64, conducted: f64, target: f64, no_attendance: f64) -> Requirement {
        lectures_needed(attended, conducted, target, no_attendance).unwrap()
    }

    fn missable(attended: f64, conducted: f64, target: f64, no_attendance: f64) -> u32 {
        lectures_missable(attended, conducted, target, no_attendance).unwrap()
    }

    // ─── calculate_attendance ───────────────────────────────────────────────

    #[test]
    fn basic_percentage() {
        assert_eq!(calculate_attendance(80.0, 100.0, 0.0).unwrap(), 80.0);
        assert_eq!(calculate_attendance(100.0, 100.0, 0.0).unwrap(), 100.0);
        assert_eq!(calculate_attendance(0.0, 50.0, 0.0).unwrap(), 0.0);
        assert!((calculate_attendance(33.0, 40.0, 0.0).unwrap() - 82.5).abs() < 1e-9);
    }

    #[test]
    fn zero_effective_lectures_is_zero_percent() {
        assert_eq!(calculate_attendance(0.0, 0.0, 0.0).unwrap(), 0.0);
        assert_eq!(calculate_attendance(0.0, 5.0, 5.0).unwrap(), 0.0);
    }

    #[test]
    fn no_attendance_shrinks_the_denominator() {
        let pct = calculate_attendance(30.0, 40.0, 5.0).unwrap();
        assert!((pct - 85.714).abs() < 1e-3);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let cases = [
            (-1.0, 10.0, 0.0, AttendanceError::negative()),
            (5.0, -1.0, 0.0, AttendanceError::negative()),
            (11.0, 10.0, 0.0, AttendanceError::attended_exceeds_effective()),
            (5.5, 10.0, 0.0, AttendanceError::not_whole()),
            (f64::NAN, 10.0, 0.0, AttendanceError::not_finite()),
            (f64::INFINITY, 10.0, 0.0, AttendanceError::not_finite()),
            (5.0, 10.0, 11.0, AttendanceError::no_attendance_exceeds_conducted()),
            (8.0, 10.0, 3.0, AttendanceError::attended_exceeds_effective()),
            (5.0, 10.0, -2.0, AttendanceError::negative()),
        ];
        for (attended, conducted, no_attendance, expected) in cases {
            assert_eq!(
                calculate_attendance(attended, conducted, no_attendance).unwrap_err(),
                expected,
                "inputs {attended} / {conducted} / {no_attendance}"
            );
        }
    }

    #[test]
    fn target_out_of_range_is_rejected() {
        for target in [0.0, -5.0, 100.5, 101.0] {
            assert_eq!(
                lectures_needed(80.0, 100.0, target, 0.0).unwrap_err(),
                AttendanceError::target_out_of_range()
            );
        }
        assert_eq!(
            lectures_missable(80.0, 100.0, f64::NAN, 0.0).unwrap_err(),
            AttendanceError::target_not_finite()
        );
    }

    // ─── lectures_needed ────────────────────────────────────────────────────

    #[test]
    fn needed_is_zero_at_or_above_target() {
        assert_eq!(needed(80.0, 100.0, 75.0, 0.0), Requirement::NONE);
        assert_eq!(needed(75.0, 100.0, 75.0, 0.0), Requirement::NONE);
    }

    #[test]
    fn needed_below_target() {
        assert_eq!(needed(60.0, 100.0, 75.0, 0.0), Requirement::Count(60));
        assert_eq!(needed(50.0, 100.0, 75.0, 0.0), Requirement::Count(100));
    }

    #[test]
    fn needed_with_nothing_conducted_is_one() {
        assert_eq!(needed(0.0, 0.0, 75.0, 0.0), Requirement::Count(1));
        assert_eq!(needed(0.0, 4.0, 75.0, 4.0), Requirement::Count(1));
    }

    #[test]
    fn full_target_is_unreachable_after_any_miss() {
        assert_eq!(needed(99.0, 100.0, 100.0, 0.0), Requirement::Unreachable);
        assert_eq!(needed(100.0, 100.0, 100.0, 0.0), Requirement::NONE);
        assert_eq!(needed(35.0, 40.0, 100.0, 5.0), Requirement::NONE);
    }

    #[test]
    fn needed_does_not_overshoot_an_exact_answer() {
        // 0.9 * 35 is not exactly representable; the answer is exactly 15.
        assert_eq!(needed(30.0, 40.0, 90.0, 5.0), Requirement::Count(15));
    }

    // ─── lectures_missable ──────────────────────────────────────────────────

    #[test]
    fn missable_above_target() {
        assert_eq!(missable(80.0, 100.0, 75.0, 0.0), 6);
        assert_eq!(missable(95.0, 100.0, 50.0, 0.0), 90);
        assert_eq!(missable(30.0, 40.0, 75.0, 5.0), 5);
    }

    #[test]
    fn missable_is_zero_below_or_exactly_at_target() {
        assert_eq!(missable(60.0, 100.0, 75.0, 0.0), 0);
        assert_eq!(missable(75.0, 100.0, 75.0, 0.0), 0);
        assert_eq!(missable(0.0, 0.0, 75.0, 0.0), 0);
    }

    // ─── full_calculation ───────────────────────────────────────────────────

    #[test]
    fn full_calculation_above_target() {
        let result = full_calculation(80.0, 100.0, 75.0, 0.0).unwrap();
        assert_eq!(result.current_percentage, 80.0);
        assert!(result.is_above_target);
        assert_eq!(result.lectures_needed, Requirement::NONE);
        assert_eq!(result.lectures_missable, 6);
    }

    #[test]
    fn full_calculation_below_target() {
        let result = full_calculation(60.0, 100.0, 75.0, 0.0).unwrap();
        assert_eq!(result.current_percentage, 60.0);
        assert!(!result.is_above_target);
        assert_eq!(result.lectures_needed, Requirement::Count(60));
        assert_eq!(result.lectures_missable, 0);
    }

    #[test]
    fn full_calculation_with_no_attendance() {
        let result = full_calculation(30.0, 40.0, 80.0, 5.0).unwrap();
        assert_eq!(result.current_percentage, 85.71);
        assert!(result.is_above_target);
        assert_eq!(result.lectures_needed, Requirement::NONE);
        assert_eq!(result.lectures_missable, 2);
        assert_eq!(result.no_attendance, 5);
        assert_eq!(result.conducted, 40);
        assert_eq!(result.attended, 30);
    }

    #[test]
    fn full_calculation_rounds_to_two_places() {
        let result = full_calculation(33.0, 40.0, 75.0, 0.0).unwrap();
        assert_eq!(result.current_percentage, 82.5);
        let result = full_calculation(2.0, 3.0, 50.0, 0.0).unwrap();
        assert_eq!(result.current_percentage, 66.67);
    }

    #[test]
    fn rounding_up_to_the_target_is_not_meeting_it() {
        // 74.996% displays as 75.00 but still needs lectures.
        let result = full_calculation(18749.0, 25000.0, 75.0, 0.0).unwrap();
        assert_eq!(result.current_percentage, 75.0);
        assert!(!result.is_above_target);
        assert_eq!(result.lectures_needed, Requirement::Count(4));
        assert_eq!(result.lectures_missable, 0);
    }

    #[test]
    fn full_calculation_gets_a_fresh_id_each_time() {
        let a = full_calculation(80.0, 100.0, 75.0, 0.0).unwrap();
        let b = full_calculation(80.0, 100.0, 75.0, 0.0).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.current_percentage, b.current_percentage);
        assert_eq!(a.lectures_missable, b.lectures_missable);
    }

    #[test]
    fn invalid_input_yields_no_result() {
        assert!(full_calculation(11.0, 10.0, 75.0, 0.0).is_err());
        assert!(full_calculation(5.0, 10.0, 0.0, 0.0).is_err());
    }

    // ─── properties ─────────────────────────────────────────────────────────

    /// Exact answer in integer arithmetic for whole-number targets.
    fn exact_needed(attended: u64, effective: u64, target: u64) -> u64 {
        let numerator = (target * effective).saturating_sub(100 * attended);
        let denominator = 100 - target;
        numerator.div_ceil(denominator)
    }

    fn exact_missable(attended: u64, effective: u64, target: u64) -> u64 {
        (100 * attended).saturating_sub(target * effective) / target
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn needed_matches_integer_solution(
            effective in 1u32..10_000,
            attended_ratio in 0.0f64..=1.0,
            target in 1u64..100,
        ) {
            let attended = (effective as f64 * attended_ratio).floor() as u32;
            let got = needed(attended as f64, effective as f64, target as f64, 0.0);
            let expected = exact_needed(attended as u64, effective as u64, target) as u32;
            prop_assert_eq!(got, Requirement::Count(expected));
        }

        #[test]
        fn missable_matches_integer_solution(
            effective in 1u32..10_000,
            attended_ratio in 0.0f64..=1.0,
            target in 1u64..=100,
        ) {
            let attended = (effective as f64 * attended_ratio).floor() as u32;
            let got = missable(attended as f64, effective as f64, target as f64, 0.0);
            let expected = if 100 * attended as u64 >= target * effective as u64 {
                exact_missable(attended as u64, effective as u64, target) as u32
            } else {
                0
            };
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn half_percent_targets_satisfy_the_inequality_minimally(
            effective in 1u32..10_000,
            attended_ratio in 0.0f64..=1.0,
            half_steps in 2u32..199,
        ) {
            let target = half_steps as f64 * 0.5;
            let attended = (effective as f64 * attended_ratio).floor() as u32;
            if let Requirement::Count(x) = needed(attended as f64, effective as f64, target, 0.0) {
                let (a, e) = (attended as f64, effective as f64);
                prop_assert!(holds_after_attending(a, e, x as f64, target));
                if x > 0 {
                    prop_assert!(!holds_after_attending(a, e, (x - 1) as f64, target));
                }
            }
        }

        #[test]
        fn raising_the_target_never_helps(
            effective in 1u32..2_000,
            attended_ratio in 0.0f64..=1.0,
            low in 1u32..100,
            bump in 0u32..50,
        ) {
            let high = (low + bump).min(100);
            let attended = (effective as f64 * attended_ratio).floor();
            let e = effective as f64;
            prop_assert!(needed(attended, e, high as f64, 0.0) >= needed(attended, e, low as f64, 0.0));
            prop_assert!(missable(attended, e, high as f64, 0.0) <= missable(attended, e, low as f64, 0.0));
        }
    }
}
