use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{Requirement, SlotType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    Easy,
    #[default]
    Medium,
    #[serde(alias = "hardcore")]
    Hard,
}

impl StrategyMode {
    pub fn all() -> [StrategyMode; 3] {
        [StrategyMode::Easy, StrategyMode::Medium, StrategyMode::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyMode::Easy => "easy",
            StrategyMode::Medium => "medium",
            StrategyMode::Hard => "hard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyMode::Easy => "Easy",
            StrategyMode::Medium => "Medium",
            StrategyMode::Hard => "Hard",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            StrategyMode::Easy => "◇",
            StrategyMode::Medium => "◆",
            StrategyMode::Hard => "⬥",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyMode::Easy => "Maximum safe skipping",
            StrategyMode::Medium => "Balanced recovery",
            StrategyMode::Hard => "Fastest recovery",
        }
    }

    pub fn pace_label(&self) -> &'static str {
        match self {
            StrategyMode::Easy => "Slow & Relaxed",
            StrategyMode::Medium => "Balanced",
            StrategyMode::Hard => "Fastest",
        }
    }

    pub fn next(&self) -> StrategyMode {
        match self {
            StrategyMode::Easy => StrategyMode::Medium,
            StrategyMode::Medium => StrategyMode::Hard,
            StrategyMode::Hard => StrategyMode::Easy,
        }
    }
}

impl std::fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for StrategyMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(StrategyMode::Easy),
            "medium" => Ok(StrategyMode::Medium),
            "hard" | "hardcore" => Ok(StrategyMode::Hard),
            _ => Err(anyhow::anyhow!("Unknown strategy mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Safe,
    Warning,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Warning => "Warning",
            RiskLevel::Critical => "Critical",
        }
    }
}

/// A dated occurrence of a timetable entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureSlot {
    pub date: NaiveDate,
    pub day: String,
    pub time: String,
    pub room: String,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    pub faculty: String,
    pub subject_short: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSlot {
    #[serde(flatten)]
    pub slot: FutureSlot,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Same for every mode given the same inputs.
    pub required_lectures: Requirement,
    pub scheduled_count: usize,
    pub skip_count: usize,
    pub days_to_recover: u32,
    pub safe_skip_allowance: u32,
    pub projected_percentage: f64,
    pub current_percentage: f64,
    pub total_available_slots: usize,
    /// Can exceed `required_lectures` in medium mode because of the buffer.
    pub actual_attend: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStrategyPlan {
    pub mode: StrategyMode,
    pub summary: PlanSummary,
    pub recommended_slots: Vec<RecommendedSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeStats {
    pub actual_attend: usize,
    pub scheduled_count: usize,
    pub skip_count: usize,
    pub days_to_recover: u32,
    pub projected_percentage: f64,
    pub recommended_slots: Vec<RecommendedSlot>,
}

/// Everything the planner needs for one plan. Counts are expected to have
/// gone through `engine::attendance::validate_inputs` already.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub conducted: u32,
    pub attended: u32,
    pub no_attendance: u32,
    pub target: f64,
    pub division: String,
    pub mode: StrategyMode,
}

impl PlanRequest {
    pub fn effective_conducted(&self) -> u32 {
        self.conducted.saturating_sub(self.no_attendance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_hardcore_mode_maps_to_hard() {
        assert_eq!("hardcore".parse::<StrategyMode>().unwrap(), StrategyMode::Hard);
        let mode: StrategyMode = serde_json::from_str("\"hardcore\"").unwrap();
        assert_eq!(mode, StrategyMode::Hard);
    }

    #[test]
    fn mode_cycles_through_all_variants() {
        let mut mode = StrategyMode::Easy;
        for expected in [StrategyMode::Medium, StrategyMode::Hard, StrategyMode::Easy] {
            mode = mode.next();
            assert_eq!(mode, expected);
        }
    }

    #[test]
    fn recommended_slot_flattens_into_api_shape() {
        let slot = RecommendedSlot {
            slot: FutureSlot {
                date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                day: "Monday".to_string(),
                time: "09:00 - 10:00".to_string(),
                room: "301".to_string(),
                slot_type: SlotType::Lab,
                faculty: "AR".to_string(),
                subject_short: "ML".to_string(),
            },
            index: 1,
        };
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["type"], "Lab");
        assert_eq!(value["subjectShort"], "ML");
        assert_eq!(value["index"], 1);
        assert_eq!(value["date"], "2026-10-19");
    }
}
