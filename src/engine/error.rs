use thiserror::Error;

/// The only error the attendance arithmetic produces. Callers branch on the
/// type and show the message to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AttendanceError {
    pub message: String,
}

impl AttendanceError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_finite() -> Self {
        Self::new("Inputs must be finite numbers.")
    }

    pub fn target_not_finite() -> Self {
        Self::new("Target must be a finite number.")
    }

    pub fn negative() -> Self {
        Self::new("Lecture counts cannot be negative.")
    }

    pub fn not_whole() -> Self {
        Self::new("Lecture counts must be whole numbers.")
    }

    pub fn too_large() -> Self {
        Self::new("Lecture counts are too large.")
    }

    pub fn no_attendance_exceeds_conducted() -> Self {
        Self::new("No-attendance lectures cannot exceed conducted lectures.")
    }

    pub fn attended_exceeds_effective() -> Self {
        Self::new(
            "Attended lectures cannot exceed effective conducted lectures (conducted - no attendance).",
        )
    }

    pub fn target_out_of_range() -> Self {
        Self::new("Target must be above 0% and at most 100%.")
    }
}
