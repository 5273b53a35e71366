pub mod attendance;
pub mod strategy;
pub mod timetable;

pub use attendance::{CalculationResult, LectureCounts, Requirement};
pub use strategy::{
    FutureSlot, GlobalStrategyPlan, ModeStats, PlanRequest, PlanSummary, RecommendedSlot,
    RiskLevel, StrategyMode,
};
pub use timetable::{ScheduleEntry, SlotType, SubjectInfo};
