use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Lecture counts that have passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LectureCounts {
    pub attended: u32,
    pub conducted: u32,
    pub no_attendance: u32,
}

impl LectureCounts {
    /// Conducted lectures minus those where attendance was not taken.
    pub fn effective(&self) -> u32 {
        self.conducted.saturating_sub(self.no_attendance)
    }
}

/// How many more lectures are needed to reach a target.
///
/// Any finite count orders before `Unreachable`, so a requirement can be
/// compared directly when checking monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    Count(u32),
    Unreachable,
}

impl Requirement {
    pub const NONE: Requirement = Requirement::Count(0);

    pub fn count(&self) -> Option<u32> {
        match self {
            Requirement::Count(n) => Some(*n),
            Requirement::Unreachable => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Requirement::Unreachable)
    }

    pub fn is_zero(&self) -> bool {
        *self == Requirement::NONE
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Requirement::Count(n) => *n as f64,
            Requirement::Unreachable => f64::INFINITY,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Count(n) => write!(f, "{}", n),
            Requirement::Unreachable => write!(f, "∞"),
        }
    }
}

// JSON has no infinity literal; unreachable goes out as the string "Infinity".
impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Requirement::Count(n) => serializer.serialize_u32(*n),
            Requirement::Unreachable => serializer.serialize_str("Infinity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub id: Uuid,
    pub calculated_at: DateTime<Utc>,
    pub current_percentage: f64,
    pub is_above_target: bool,
    pub target: f64,
    pub lectures_needed: Requirement,
    pub lectures_missable: u32,
    pub conducted: u32,
    pub attended: u32,
    pub no_attendance: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_orders_after_every_count() {
        assert!(Requirement::Count(u32::MAX) < Requirement::Unreachable);
        assert!(Requirement::Count(3) < Requirement::Count(4));
    }

    #[test]
    fn requirement_serializes_as_number_or_infinity() {
        assert_eq!(serde_json::to_string(&Requirement::Count(15)).unwrap(), "15");
        assert_eq!(
            serde_json::to_string(&Requirement::Unreachable).unwrap(),
            "\"Infinity\""
        );
    }

    #[test]
    fn effective_subtracts_untaken_lectures() {
        let counts = LectureCounts {
            attended: 30,
            conducted: 40,
            no_attendance: 5,
        };
        assert_eq!(counts.effective(), 35);
    }
}
