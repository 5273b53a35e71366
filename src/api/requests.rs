use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::StrategyMode;

pub const MAX_LECTURES: f64 = 10_000.0;

/// Body of the calculate route. Numbers stay `f64` until validated so that
/// `12.5` is reported as a validation failure instead of a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub conducted: f64,
    pub attended: f64,
    #[serde(default)]
    pub no_attendance: Option<f64>,
    pub target: f64,
}

impl CalculateRequest {
    pub fn no_attendance(&self) -> f64 {
        self.no_attendance.unwrap_or(0.0)
    }

    /// Every problem with the request, in field order.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_count(self.conducted, &mut errors);
        check_count(self.attended, &mut errors);
        if let Some(no_attendance) = self.no_attendance {
            check_count(no_attendance, &mut errors);
        }
        check_target(self.target, &mut errors);

        if errors.is_empty() && self.attended > self.conducted - self.no_attendance() {
            errors.push(
                "Attended cannot exceed effective conducted (conducted - no attendance)"
                    .to_string(),
            );
        }
        errors
    }
}

fn check_count(value: f64, errors: &mut Vec<String>) {
    if !value.is_finite() || value.fract() != 0.0 {
        errors.push("Must be a whole number".to_string());
    }
    if value < 0.0 {
        errors.push("Cannot be negative".to_string());
    }
    if value > MAX_LECTURES {
        errors.push("Exceeds maximum allowed".to_string());
    }
}

fn check_target(value: f64, errors: &mut Vec<String>) {
    if value.is_nan() || value < 1.0 {
        errors.push("Target must be at least 1%".to_string());
    }
    if value > 100.0 {
        errors.push("Target cannot exceed 100%".to_string());
    }
}

/// Body of the recommendation route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub division: String,
    pub target: f64,
    #[serde(default)]
    pub mode: Option<String>,
    pub conducted: f64,
    pub attended: f64,
    #[serde(default)]
    pub no_attendance: Option<f64>,
}

impl RecommendationRequest {
    /// Problems keyed by field name; empty when the request is well formed.
    pub fn field_errors(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut fields: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        if self.division.trim().is_empty() {
            fields.entry("division").or_default().push("Required".to_string());
        }

        let mut target = Vec::new();
        check_target(self.target, &mut target);
        if !target.is_empty() {
            fields.insert("target", target);
        }

        if let Some(mode) = &self.mode {
            if route_mode(mode).is_none() {
                fields
                    .entry("mode")
                    .or_default()
                    .push("Expected 'easy', 'medium' or 'hard'".to_string());
            }
        }

        for (name, value) in [
            ("conducted", Some(self.conducted)),
            ("attended", Some(self.attended)),
            ("noAttendance", self.no_attendance),
        ] {
            let Some(value) = value else { continue };
            let mut errors = Vec::new();
            if !value.is_finite() || value.fract() != 0.0 {
                errors.push("Must be a whole number".to_string());
            }
            if value < 0.0 {
                errors.push("Cannot be negative".to_string());
            }
            if !errors.is_empty() {
                fields.insert(name, errors);
            }
        }

        fields
    }

    /// Defaults to medium; only meaningful after `field_errors` came back empty.
    pub fn mode(&self) -> StrategyMode {
        self.mode
            .as_deref()
            .and_then(route_mode)
            .unwrap_or_default()
    }

    pub fn no_attendance(&self) -> f64 {
        self.no_attendance.unwrap_or(0.0)
    }
}

/// The route takes only the exact lowercase names; the legacy `hardcore`
/// spelling is left to saved config.
fn route_mode(mode: &str) -> Option<StrategyMode> {
    match mode {
        "easy" => Some(StrategyMode::Easy),
        "medium" => Some(StrategyMode::Medium),
        "hard" => Some(StrategyMode::Hard),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(conducted: f64, attended: f64, no_attendance: Option<f64>, target: f64) -> CalculateRequest {
        CalculateRequest {
            conducted,
            attended,
            no_attendance,
            target,
        }
    }

    #[test]
    fn valid_calculate_request() {
        assert!(calc(100.0, 80.0, None, 75.0).validate().is_empty());
        assert!(calc(40.0, 30.0, Some(5.0), 100.0).validate().is_empty());
        assert!(calc(0.0, 0.0, None, 1.0).validate().is_empty());
    }

    #[test]
    fn calculate_request_messages() {
        assert_eq!(
            calc(100.0, 80.5, None, 75.0).validate(),
            vec!["Must be a whole number"]
        );
        assert_eq!(
            calc(20_000.0, 80.0, None, 75.0).validate(),
            vec!["Exceeds maximum allowed"]
        );
        assert_eq!(
            calc(100.0, 80.0, None, 0.5).validate(),
            vec!["Target must be at least 1%"]
        );
        assert_eq!(
            calc(40.0, 38.0, Some(5.0), 75.0).validate(),
            vec!["Attended cannot exceed effective conducted (conducted - no attendance)"]
        );
        assert_eq!(
            calc(-1.0, 0.0, None, 101.0).validate(),
            vec!["Cannot be negative", "Target cannot exceed 100%"]
        );
    }

    #[test]
    fn calculate_request_uses_camel_case() {
        let request: CalculateRequest =
            serde_json::from_str(r#"{"conducted":40,"attended":30,"noAttendance":5,"target":80}"#)
                .unwrap();
        assert_eq!(request.no_attendance, Some(5.0));
    }

    #[test]
    fn recommendation_defaults_to_medium() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{"division":"6A22","target":75,"conducted":100,"attended":60}"#,
        )
        .unwrap();
        assert!(request.field_errors().is_empty());
        assert_eq!(request.mode(), StrategyMode::Medium);
    }

    #[test]
    fn recommendation_field_errors() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{"division":"","target":150,"mode":"turbo","conducted":-3,"attended":1.5}"#,
        )
        .unwrap();
        let errors = request.field_errors();
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["attended", "conducted", "division", "mode", "target"]
        );
    }

    #[test]
    fn recommendation_mode_must_be_an_exact_name() {
        for mode in ["hardcore", "Hard", "EASY"] {
            let request = RecommendationRequest {
                division: "6A22".to_string(),
                target: 75.0,
                mode: Some(mode.to_string()),
                conducted: 100.0,
                attended: 60.0,
                no_attendance: None,
            };
            let errors = request.field_errors();
            assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["mode"], "{mode}");
        }

        let request: RecommendationRequest = serde_json::from_str(
            r#"{"division":"6A22","target":75,"mode":"hard","conducted":100,"attended":60}"#,
        )
        .unwrap();
        assert!(request.field_errors().is_empty());
        assert_eq!(request.mode(), StrategyMode::Hard);
    }
}
