use serde::de::DeserializeOwned;

use crate::api::requests::{CalculateRequest, RecommendationRequest};
use crate::api::{ApiReply, Status};
use crate::engine::attendance::{full_calculation, validate_inputs};
use crate::engine::Planner;
use crate::models::{CalculationResult, GlobalStrategyPlan, PlanRequest};
use crate::timetable::{is_valid_division, TimetableSource};

pub const HISTORY_MESSAGE: &str =
    "History is not stored. Every calculation is computed fresh from the numbers you send.";

fn parse_body<T: DeserializeOwned, R: serde::Serialize>(body: &str) -> Result<T, ApiReply<R>> {
    serde_json::from_str(body).map_err(|e| {
        log::debug!("rejected request body: {}", e);
        ApiReply::fail(Status::BadRequest, format!("Invalid request body: {}", e))
    })
}

/// `POST /api/attendance/calculate`
pub fn handle_calculate(body: &str) -> ApiReply<CalculationResult> {
    let request: CalculateRequest = match parse_body(body) {
        Ok(request) => request,
        Err(reply) => return reply,
    };

    let errors = request.validate();
    if !errors.is_empty() {
        return ApiReply::fail(Status::BadRequest, errors.join(", "));
    }

    match full_calculation(
        request.attended,
        request.conducted,
        request.target,
        request.no_attendance(),
    ) {
        Ok(result) => ApiReply::ok(result),
        Err(e) => ApiReply::fail(Status::Internal, e.to_string()),
    }
}

/// `POST /api/recommendation`
pub fn handle_recommend<S: TimetableSource + ?Sized>(
    planner: &Planner<'_, S>,
    body: &str,
) -> ApiReply<GlobalStrategyPlan> {
    let request: RecommendationRequest = match parse_body(body) {
        Ok(request) => request,
        Err(reply) => return reply,
    };

    let fields = request.field_errors();
    if !fields.is_empty() {
        let details = serde_json::json!({ "fieldErrors": fields });
        return ApiReply::fail(Status::BadRequest, "Validation failed").with_details(details);
    }

    if !is_valid_division(planner.source(), &request.division) {
        return ApiReply::fail(
            Status::BadRequest,
            format!("Invalid division: {}", request.division),
        );
    }

    let counts = match validate_inputs(
        request.attended,
        request.conducted,
        Some(request.target),
        request.no_attendance(),
    ) {
        Ok(counts) => counts,
        Err(e) => return ApiReply::fail(Status::BadRequest, e.to_string()),
    };

    let plan = planner.generate_global_plan(&PlanRequest {
        conducted: counts.conducted,
        attended: counts.attended,
        no_attendance: counts.no_attendance,
        target: request.target,
        division: request.division.clone(),
        mode: request.mode(),
    });
    ApiReply::ok(plan)
}

/// `GET /api/attendance/history`
pub fn handle_history() -> ApiReply<Vec<CalculationResult>> {
    ApiReply::ok(Vec::new()).with_message(HISTORY_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::tests::calendar;
    use crate::models::{Requirement, StrategyMode};
    use crate::timetable::builtin;
    use serde_json::Value;

    fn json<T: serde::Serialize>(reply: &ApiReply<T>) -> Value {
        serde_json::from_str(&reply.to_json().unwrap()).unwrap()
    }

    #[test]
    fn calculate_success() {
        let reply = handle_calculate(r#"{"conducted":40,"attended":30,"noAttendance":5,"target":80}"#);
        assert_eq!(reply.status.code(), 200);

        let body = json(&reply);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["currentPercentage"], 85.71);
        assert_eq!(body["data"]["lecturesMissable"], 2);
        assert!(body["data"]["id"].is_string());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn calculate_reports_unreachable_as_infinity() {
        let reply = handle_calculate(r#"{"conducted":10,"attended":9,"target":100}"#);
        let body = json(&reply);
        assert_eq!(body["data"]["lecturesNeeded"], "Infinity");
        assert_eq!(
            reply.body.data.unwrap().lectures_needed,
            Requirement::Unreachable
        );
    }

    #[test]
    fn calculate_validation_failure() {
        let reply = handle_calculate(r#"{"conducted":10,"attended":12,"target":75}"#);
        assert_eq!(reply.status, Status::BadRequest);
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Attended cannot exceed effective conducted (conducted - no attendance)")
        );

        let reply = handle_calculate(r#"{"conducted":10.5,"attended":2,"target":0}"#);
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Must be a whole number, Target must be at least 1%")
        );
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let reply = handle_calculate("not json");
        assert_eq!(reply.status.code(), 400);
        assert!(!reply.body.success);

        let reply = handle_calculate(r#"{"conducted":10}"#);
        assert_eq!(reply.status.code(), 400);
    }

    #[test]
    fn recommend_success() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(6));
        let reply = handle_recommend(
            &planner,
            r#"{"division":"6A22","target":75,"mode":"hard","conducted":100,"attended":60}"#,
        );
        assert_eq!(reply.status, Status::Ok);

        let plan = reply.body.data.clone().unwrap();
        assert_eq!(plan.mode, StrategyMode::Hard);
        assert_eq!(plan.summary.required_lectures, Requirement::Count(60));

        let body = json(&reply);
        assert_eq!(body["data"]["mode"], "hard");
        assert_eq!(body["data"]["recommendedSlots"][0]["index"], 1);
        assert!(body["data"]["recommendedSlots"][0]["subjectShort"].is_string());
    }

    #[test]
    fn recommend_rejects_unknown_division() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(1));
        let reply = handle_recommend(
            &planner,
            r#"{"division":"9Z99","target":75,"conducted":100,"attended":60}"#,
        );
        assert_eq!(reply.status, Status::BadRequest);
        assert_eq!(reply.body.error.as_deref(), Some("Invalid division: 9Z99"));
    }

    #[test]
    fn recommend_validation_details() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(1));
        let reply = handle_recommend(
            &planner,
            r#"{"division":"6A22","target":75,"mode":"turbo","conducted":100,"attended":60}"#,
        );
        assert_eq!(reply.status, Status::BadRequest);
        assert_eq!(reply.body.error.as_deref(), Some("Validation failed"));
        let details = reply.body.details.unwrap();
        assert!(details["fieldErrors"]["mode"].is_array());
    }

    #[test]
    fn recommend_checks_counts_against_each_other() {
        let timetable = builtin::timetable();
        let planner = Planner::new(&timetable, calendar(1));
        let reply = handle_recommend(
            &planner,
            r#"{"division":"6A22","target":75,"conducted":10,"attended":11}"#,
        );
        assert_eq!(reply.status, Status::BadRequest);
    }

    #[test]
    fn history_is_empty_with_a_message() {
        let body = json(&handle_history());
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([]));
        assert_eq!(body["message"], HISTORY_MESSAGE);
    }
}
