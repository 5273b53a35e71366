pub mod builtin;
pub mod file;
pub mod query;

use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{ScheduleEntry, SubjectInfo};

pub use query::{
    build_grid, divisions_by_section, faculty_full_name, is_valid_division, subject_full_name,
    unique_subjects, upcoming_lectures, validate_faculty_mapping,
};

/// Read-only view of weekly timetables, one per division.
pub trait TimetableSource {
    fn division_ids(&self) -> Vec<&str>;
    /// Weekly rows for a division; empty when the division is unknown.
    fn schedule(&self, division: &str) -> &[ScheduleEntry];
    fn subjects(&self, division: &str) -> &[SubjectInfo];
    fn faculty_name(&self, code: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionTimetable {
    pub id: String,
    pub schedule: Vec<ScheduleEntry>,
    pub subjects: Vec<SubjectInfo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timetable {
    divisions: Vec<DivisionTimetable>,
    faculty: BTreeMap<String, String>,
}

impl Timetable {
    pub fn new(divisions: Vec<DivisionTimetable>, faculty: BTreeMap<String, String>) -> Self {
        Self { divisions, faculty }
    }

    fn find(&self, division: &str) -> Option<&DivisionTimetable> {
        self.divisions.iter().find(|d| d.id == division)
    }
}

impl TimetableSource for Timetable {
    fn division_ids(&self) -> Vec<&str> {
        self.divisions.iter().map(|d| d.id.as_str()).collect()
    }

    fn schedule(&self, division: &str) -> &[ScheduleEntry] {
        self.find(division)
            .map(|d| d.schedule.as_slice())
            .unwrap_or(&[])
    }

    fn subjects(&self, division: &str) -> &[SubjectInfo] {
        self.find(division)
            .map(|d| d.subjects.as_slice())
            .unwrap_or(&[])
    }

    fn faculty_name(&self, code: &str) -> Option<&str> {
        self.faculty.get(code).map(String::as_str)
    }
}

/// The window future lectures are drawn from: `today` through `teaching_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeachingCalendar {
    pub today: NaiveDate,
    pub teaching_end: NaiveDate,
}

impl TeachingCalendar {
    pub fn new(today: NaiveDate, teaching_end: NaiveDate) -> Self {
        Self {
            today,
            teaching_end,
        }
    }

    pub fn starting_today(teaching_end: NaiveDate) -> Self {
        Self::new(Local::now().date_naive(), teaching_end)
    }

    /// Calendar days left including today; 0 once teaching has ended.
    pub fn days_remaining(&self) -> i64 {
        ((self.teaching_end - self.today).num_days() + 1).max(0)
    }
}
