use chrono::{NaiveTime, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::ScheduleEntry;
use crate::timetable::builtin::{clock, TEACHING_SLOTS};
use crate::timetable::TimetableSource;

/// Monday through Saturday; the college does not teach on Sundays.
pub const TEACHING_DAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn is_valid_division<S: TimetableSource + ?Sized>(source: &S, division: &str) -> bool {
    source.division_ids().contains(&division)
}

/// Divisions grouped by the section letter after the year digits ("6A22" -> "A"),
/// each group sorted by its trailing number.
pub fn divisions_by_section<S: TimetableSource + ?Sized>(
    source: &S,
) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for id in source.division_ids() {
        let rest = id.trim_start_matches(|c: char| c.is_ascii_digit());
        let section = rest
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_string())
            .unwrap_or_else(|| "Other".to_string());
        groups.entry(section).or_default().push(id.to_string());
    }

    for ids in groups.values_mut() {
        ids.sort_by_key(|id| (division_number(id), id.clone()));
    }
    groups
}

fn division_number(id: &str) -> u32 {
    let digits: String = id
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .skip_while(|c| c.is_ascii_alphabetic())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Full subject name, or the short code itself when the division has no entry for it.
pub fn subject_full_name<S: TimetableSource + ?Sized>(
    source: &S,
    division: &str,
    short: &str,
) -> String {
    source
        .subjects(division)
        .iter()
        .find(|s| s.short.eq_ignore_ascii_case(short))
        .map(|s| s.full.clone())
        .unwrap_or_else(|| short.to_string())
}

pub fn faculty_full_name<S: TimetableSource + ?Sized>(source: &S, code: &str) -> String {
    let code = code.trim();
    source
        .faculty_name(&code.to_uppercase())
        .or_else(|| source.faculty_name(code))
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

pub fn unique_subjects<S: TimetableSource + ?Sized>(source: &S, division: &str) -> Vec<String> {
    source
        .schedule(division)
        .iter()
        .map(|e| e.subject_short.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Entries for `within_days` consecutive teaching days starting at `from_day`,
/// wrapping Saturday back to Monday. Sunday starts from Monday.
pub fn upcoming_lectures<S: TimetableSource + ?Sized>(
    source: &S,
    division: &str,
    from_day: Weekday,
    within_days: usize,
) -> Vec<ScheduleEntry> {
    let schedule = source.schedule(division);
    let start = TEACHING_DAYS
        .iter()
        .position(|d| *d == from_day)
        .unwrap_or(0);

    let mut upcoming = Vec::new();
    for offset in 0..within_days {
        let day = TEACHING_DAYS[(start + offset) % TEACHING_DAYS.len()];
        let mut entries: Vec<&ScheduleEntry> = schedule.iter().filter(|e| e.day == day).collect();
        entries.sort_by_key(|e| e.start);
        upcoming.extend(entries.into_iter().cloned());
    }
    upcoming
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub day: Weekday,
    pub cells: Vec<Option<ScheduleEntry>>,
}

/// A division's week laid out as teaching days by teaching slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableGrid {
    pub slots: Vec<(NaiveTime, NaiveTime)>,
    pub rows: Vec<GridRow>,
}

impl TimetableGrid {
    pub fn slot_label(&self, index: usize) -> String {
        self.slots
            .get(index)
            .map(|(start, end)| format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")))
            .unwrap_or_default()
    }
}

/// Each entry lands in the first slot it fully covers, so a two-hour lab
/// shows once at its starting slot.
pub fn build_grid<S: TimetableSource + ?Sized>(source: &S, division: &str) -> TimetableGrid {
    let slots: Vec<(NaiveTime, NaiveTime)> = TEACHING_SLOTS
        .iter()
        .filter_map(|(start, end)| Some((clock(*start)?, clock(*end)?)))
        .collect();

    let schedule = source.schedule(division);
    let rows = TEACHING_DAYS
        .iter()
        .map(|day| {
            let mut cells: Vec<Option<ScheduleEntry>> = vec![None; slots.len()];
            for entry in schedule.iter().filter(|e| e.day == *day) {
                let covered = slots
                    .iter()
                    .position(|(start, end)| entry.start <= *start && entry.end >= *end);
                if let Some(index) = covered {
                    cells[index] = Some(entry.clone());
                }
            }
            GridRow { day: *day, cells }
        })
        .collect();

    TimetableGrid { slots, rows }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    Unmapped,
    BlankShortCode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchReport {
    pub division: String,
    pub subject: String,
    pub faculty_short: String,
    pub kind: MismatchKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyValidation {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub match_percentage: u32,
    pub mismatches: Vec<MismatchReport>,
    /// Division with the most problems, if any division has one.
    pub worst_division: Option<(String, usize)>,
}

/// Check every entry's faculty code against the faculty directory.
pub fn validate_faculty_mapping<S: TimetableSource + ?Sized>(source: &S) -> FacultyValidation {
    let mut mismatches = Vec::new();
    let mut total_entries = 0;
    let mut valid_entries = 0;
    let mut worst_division: Option<(String, usize)> = None;

    for division in source.division_ids() {
        let mut errors = 0;
        for entry in source.schedule(division) {
            total_entries += 1;
            let code = entry.faculty.trim();

            let kind = if code.is_empty() {
                MismatchKind::BlankShortCode
            } else if source.faculty_name(&code.to_uppercase()).is_some()
                || source.faculty_name(code).is_some()
            {
                valid_entries += 1;
                continue;
            } else {
                MismatchKind::Unmapped
            };

            errors += 1;
            mismatches.push(MismatchReport {
                division: division.to_string(),
                subject: entry.subject_short.clone(),
                faculty_short: if code.is_empty() {
                    "(blank)".to_string()
                } else {
                    code.to_string()
                },
                kind,
            });
        }

        let is_worse = worst_division
            .as_ref()
            .map_or(errors > 0, |(_, count)| errors > *count);
        if is_worse {
            worst_division = Some((division.to_string(), errors));
        }
    }

    let match_percentage = if total_entries == 0 {
        100
    } else {
        (valid_entries as f64 / total_entries as f64 * 100.0).round() as u32
    };

    if !mismatches.is_empty() {
        log::warn!(
            "{} of {} timetable entries have unknown faculty codes",
            mismatches.len(),
            total_entries
        );
    }

    FacultyValidation {
        total_entries,
        valid_entries,
        match_percentage,
        mismatches,
        worst_division,
    }
}
