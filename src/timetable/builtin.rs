use chrono::{NaiveTime, Weekday};
use std::collections::BTreeMap;

use crate::models::{ScheduleEntry, SlotType, SubjectInfo};
use crate::timetable::{DivisionTimetable, Timetable};

use SlotType::{Lab, Lecture};
use Weekday::{Fri, Mon, Sat, Thu, Tue, Wed};

pub const DEFAULT_DIVISION: &str = "6A22";

/// Rows of the grid the college prints; labs span two consecutive rows.
pub const TEACHING_SLOTS: &[((u32, u32), (u32, u32))] = &[
    ((9, 0), (10, 0)),
    ((10, 0), (11, 0)),
    ((11, 15), (12, 15)),
    ((12, 15), (13, 15)),
    ((14, 0), (15, 0)),
    ((15, 0), (16, 0)),
];

type Row = (
    Weekday,
    (u32, u32),
    (u32, u32),
    &'static str,
    &'static str,
    SlotType,
    &'static str,
);

const FACULTY: &[(&str, &str)] = &[
    ("AR", "Dr. Ananya Rao"),
    ("VK", "Prof. Vikram Kulkarni"),
    ("SP", "Dr. Sneha Patil"),
    ("RD", "Prof. Rohan Deshmukh"),
    ("MJ", "Dr. Meera Joshi"),
    ("NS", "Prof. Nikhil Sawant"),
    ("PG", "Dr. Priya Gokhale"),
    ("HK", "Prof. Harsh Kamat"),
    ("LIB", "Library Staff"),
    ("MNT", "Class Mentor"),
];

const SUBJECTS: &[(&str, &str, &str)] = &[
    ("CS601", "ML", "Machine Learning"),
    ("CS602", "CC", "Cloud Computing"),
    ("CS603", "IS", "Information Security"),
    ("CS604", "SPM", "Software Project Management"),
    ("CS605", "BDA", "Big Data Analytics"),
];

const DIV_6A21: &[Row] = &[
    (Mon, (9, 0), (10, 0), "CC", "A-302", Lecture, "VK"),
    (Mon, (10, 0), (11, 0), "ML", "A-302", Lecture, "AR"),
    (Mon, (11, 15), (12, 15), "SPM", "A-302", Lecture, "RD"),
    (Mon, (14, 0), (16, 0), "IS", "L-105", Lab, "SP"),
    (Tue, (9, 0), (10, 0), "IS", "A-302", Lecture, "SP"),
    (Tue, (10, 0), (11, 0), "BDA", "A-302", Lecture, "MJ"),
    (Tue, (11, 15), (12, 15), "ML", "A-302", Lecture, "AR"),
    (Tue, (12, 15), (13, 15), "CC", "A-302", Lecture, "VK"),
    (Wed, (9, 0), (10, 0), "SPM", "A-302", Lecture, "RD"),
    (Wed, (10, 0), (11, 0), "IS", "A-302", Lecture, "SP"),
    (Wed, (11, 15), (12, 15), "Library", "Central Library", Lecture, "LIB"),
    (Wed, (14, 0), (16, 0), "ML", "L-204", Lab, "AR"),
    (Thu, (9, 0), (10, 0), "BDA", "A-302", Lecture, "MJ"),
    (Thu, (10, 0), (11, 0), "CC", "A-302", Lecture, "VK"),
    (Thu, (11, 15), (12, 15), "ML", "A-302", Lecture, "AR"),
    (Thu, (12, 15), (13, 15), "SPM", "A-302", Lecture, "RD"),
    (Fri, (9, 0), (10, 0), "ML", "A-302", Lecture, "AR"),
    (Fri, (10, 0), (11, 0), "IS", "A-302", Lecture, "SP"),
    (Fri, (11, 15), (12, 15), "BDA", "A-302", Lecture, "MJ"),
    (Fri, (14, 0), (16, 0), "CC", "L-105", Lab, "VK"),
    (Sat, (9, 0), (10, 0), "BDA", "A-302", Lecture, "MJ"),
    (Sat, (10, 0), (11, 0), "Self Study", "A-302", Lecture, "MNT"),
];

const DIV_6A22: &[Row] = &[
    (Mon, (9, 0), (10, 0), "ML", "A-301", Lecture, "AR"),
    (Mon, (10, 0), (11, 0), "CC", "A-301", Lecture, "VK"),
    (Mon, (11, 15), (12, 15), "IS", "A-301", Lecture, "SP"),
    (Mon, (12, 15), (13, 15), "SPM", "A-301", Lecture, "RD"),
    (Mon, (14, 0), (16, 0), "ML", "L-204", Lab, "AR"),
    (Tue, (9, 0), (10, 0), "BDA", "A-301", Lecture, "MJ"),
    (Tue, (10, 0), (11, 0), "ML", "A-301", Lecture, "AR"),
    (Tue, (11, 15), (12, 15), "CC", "A-301", Lecture, "VK"),
    (Tue, (12, 15), (13, 15), "Library", "Central Library", Lecture, "LIB"),
    (Tue, (14, 0), (16, 0), "CC", "L-105", Lab, "VK"),
    (Wed, (9, 0), (10, 0), "IS", "A-301", Lecture, "SP"),
    (Wed, (10, 0), (11, 0), "SPM", "A-301", Lecture, "RD"),
    (Wed, (11, 15), (12, 15), "BDA", "A-301", Lecture, "MJ"),
    (Wed, (12, 15), (13, 15), "ML", "A-301", Lecture, "AR"),
    (Wed, (14, 0), (15, 0), "Self Study", "A-301", Lecture, "MNT"),
    (Thu, (9, 0), (10, 0), "CC", "A-301", Lecture, "VK"),
    (Thu, (10, 0), (11, 0), "IS", "A-301", Lecture, "SP"),
    (Thu, (11, 15), (12, 15), "SPM", "A-301", Lecture, "RD"),
    (Thu, (14, 0), (16, 0), "BDA", "L-204", Lab, "MJ"),
    (Fri, (9, 0), (10, 0), "ML", "A-301", Lecture, "AR"),
    (Fri, (10, 0), (11, 0), "BDA", "A-301", Lecture, "MJ"),
    (Fri, (11, 15), (12, 15), "IS", "A-301", Lecture, "SP"),
    (Fri, (12, 15), (13, 15), "CC", "A-301", Lecture, "VK"),
    (Fri, (14, 0), (15, 0), "SPM", "A-301", Lecture, "RD"),
    (Sat, (9, 0), (11, 0), "IS", "L-105", Lab, "SP"),
    (Sat, (11, 15), (12, 15), "Self Study", "A-301", Lecture, "MNT"),
];

const DIV_6B21: &[Row] = &[
    (Mon, (9, 0), (10, 0), "IS", "B-204", Lecture, "PG"),
    (Mon, (10, 0), (11, 0), "BDA", "B-204", Lecture, "NS"),
    (Mon, (11, 15), (12, 15), "ML", "B-204", Lecture, "HK"),
    (Tue, (9, 0), (10, 0), "CC", "B-204", Lecture, "VK"),
    (Tue, (10, 0), (11, 0), "SPM", "B-204", Lecture, "RD"),
    (Tue, (11, 15), (12, 15), "IS", "B-204", Lecture, "PG"),
    (Tue, (14, 0), (16, 0), "BDA", "L-301", Lab, "NS"),
    (Wed, (9, 0), (10, 0), "ML", "B-204", Lecture, "HK"),
    (Wed, (10, 0), (11, 0), "CC", "B-204", Lecture, "VK"),
    (Wed, (11, 15), (12, 15), "BDA", "B-204", Lecture, "NS"),
    (Wed, (12, 15), (13, 15), "Library", "Central Library", Lecture, "LIB"),
    (Thu, (9, 0), (10, 0), "SPM", "B-204", Lecture, "RD"),
    (Thu, (10, 0), (11, 0), "ML", "B-204", Lecture, "HK"),
    (Thu, (11, 15), (12, 15), "IS", "B-204", Lecture, "PG"),
    (Thu, (14, 0), (16, 0), "ML", "L-204", Lab, "HK"),
    (Fri, (9, 0), (10, 0), "BDA", "B-204", Lecture, "NS"),
    (Fri, (10, 0), (11, 0), "CC", "B-204", Lecture, "VK"),
    (Fri, (11, 15), (12, 15), "SPM", "B-204", Lecture, "RD"),
    (Fri, (12, 15), (13, 15), "ML", "B-204", Lecture, "HK"),
    (Sat, (9, 0), (11, 0), "CC", "L-105", Lab, "VK"),
];

const DIV_6C21: &[Row] = &[
    (Mon, (9, 0), (10, 0), "SPM", "C-110", Lecture, "RD"),
    (Mon, (10, 0), (11, 0), "IS", "C-110", Lecture, "PG"),
    (Mon, (11, 15), (12, 15), "CC", "C-110", Lecture, "VK"),
    (Mon, (12, 15), (13, 15), "BDA", "C-110", Lecture, "MJ"),
    (Tue, (9, 0), (10, 0), "ML", "C-110", Lecture, "HK"),
    (Tue, (10, 0), (11, 0), "IS", "C-110", Lecture, "PG"),
    (Tue, (11, 15), (12, 15), "Self Study", "C-110", Lecture, "MNT"),
    (Tue, (14, 0), (16, 0), "ML", "L-204", Lab, "HK"),
    (Wed, (9, 0), (10, 0), "CC", "C-110", Lecture, "VK"),
    (Wed, (10, 0), (11, 0), "BDA", "C-110", Lecture, "MJ"),
    (Wed, (11, 15), (12, 15), "SPM", "C-110", Lecture, "RD"),
    (Thu, (9, 0), (10, 0), "ML", "C-110", Lecture, "HK"),
    (Thu, (10, 0), (11, 0), "CC", "C-110", Lecture, "VK"),
    (Thu, (11, 15), (12, 15), "IS", "C-110", Lecture, "PG"),
    (Thu, (12, 15), (13, 15), "Library", "Central Library", Lecture, "LIB"),
    (Thu, (14, 0), (16, 0), "IS", "L-105", Lab, "PG"),
    (Fri, (9, 0), (10, 0), "BDA", "C-110", Lecture, "MJ"),
    (Fri, (10, 0), (11, 0), "SPM", "C-110", Lecture, "RD"),
    (Fri, (11, 15), (12, 15), "ML", "C-110", Lecture, "HK"),
    (Sat, (9, 0), (11, 0), "BDA", "L-301", Lab, "MJ"),
];

const DIVISIONS: &[(&str, &[Row])] = &[
    ("6A21", DIV_6A21),
    ("6A22", DIV_6A22),
    ("6B21", DIV_6B21),
    ("6C21", DIV_6C21),
];

pub fn clock(hm: (u32, u32)) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hm.0, hm.1, 0)
}

fn entry(row: &Row) -> Option<ScheduleEntry> {
    let &(day, start, end, subject, room, slot_type, faculty) = row;
    Some(ScheduleEntry {
        day,
        start: clock(start)?,
        end: clock(end)?,
        subject_short: subject.to_string(),
        room: room.to_string(),
        slot_type,
        faculty: faculty.to_string(),
    })
}

fn subjects() -> Vec<SubjectInfo> {
    SUBJECTS
        .iter()
        .map(|(id, short, full)| SubjectInfo {
            id: id.to_string(),
            short: short.to_string(),
            full: full.to_string(),
        })
        .collect()
}

/// The compiled-in timetable for the current semester.
pub fn timetable() -> Timetable {
    let divisions = DIVISIONS
        .iter()
        .map(|(id, rows)| DivisionTimetable {
            id: id.to_string(),
            schedule: rows.iter().filter_map(entry).collect(),
            subjects: subjects(),
        })
        .collect();

    let faculty = FACULTY
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect::<BTreeMap<_, _>>();

    Timetable::new(divisions, faculty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::TimetableSource;

    #[test]
    fn every_row_converts() {
        let timetable = timetable();
        for (id, rows) in DIVISIONS {
            assert_eq!(timetable.schedule(id).len(), rows.len(), "division {id}");
        }
    }

    #[test]
    fn entries_have_required_fields() {
        let timetable = timetable();
        for id in timetable.division_ids() {
            for entry in timetable.schedule(id) {
                assert!(!entry.subject_short.is_empty());
                assert!(!entry.faculty.is_empty());
                assert!(entry.start < entry.end, "{id} {:?}", entry);
                assert_ne!(entry.day, Weekday::Sun);
            }
        }
    }

    #[test]
    fn every_faculty_code_is_mapped() {
        let timetable = timetable();
        for id in timetable.division_ids() {
            for entry in timetable.schedule(id) {
                assert!(timetable.faculty_name(&entry.faculty).is_some());
            }
        }
    }

    #[test]
    fn default_division_exists() {
        assert!(timetable().division_ids().contains(&DEFAULT_DIVISION));
    }
}
