use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::models::timetable::parse_weekday;
use crate::models::{ScheduleEntry, SlotType, SubjectInfo};
use crate::timetable::{DivisionTimetable, Timetable};

#[derive(Debug, Deserialize)]
struct TimetableFile {
    #[serde(default)]
    faculty: BTreeMap<String, String>,
    #[serde(default, rename = "division")]
    divisions: Vec<DivisionRecord>,
}

#[derive(Debug, Deserialize)]
struct DivisionRecord {
    id: String,
    #[serde(default, rename = "subject")]
    subjects: Vec<SubjectInfo>,
    #[serde(default, rename = "entry")]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    day: String,
    start: String,
    end: String,
    subject: String,
    #[serde(default)]
    room: String,
    #[serde(rename = "type", default = "default_slot_type")]
    slot_type: String,
    #[serde(default)]
    faculty: String,
}

fn default_slot_type() -> String {
    "Lecture".to_string()
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", value))
}

impl EntryRecord {
    fn into_entry(self) -> Result<ScheduleEntry> {
        let start = parse_time(&self.start)?;
        let end = parse_time(&self.end)?;
        if start >= end {
            bail!(
                "{} {} starts at {} but ends at {}",
                self.day,
                self.subject,
                self.start,
                self.end
            );
        }

        Ok(ScheduleEntry {
            day: parse_weekday(&self.day)?,
            start,
            end,
            subject_short: self.subject,
            room: self.room,
            slot_type: self.slot_type.parse::<SlotType>()?,
            faculty: self.faculty,
        })
    }
}

impl Timetable {
    /// Parse a timetable written as TOML:
    ///
    /// ```toml
    /// [faculty]
    /// AR = "Dr. Ananya Rao"
    ///
    /// [[division]]
    /// id = "6A22"
    ///
    /// [[division.subject]]
    /// id = "CS601"
    /// short = "ML"
    /// full = "Machine Learning"
    ///
    /// [[division.entry]]
    /// day = "Monday"
    /// start = "09:00"
    /// end = "10:00"
    /// subject = "ML"
    /// room = "A-301"
    /// type = "Lecture"
    /// faculty = "AR"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TimetableFile = toml::from_str(content).context("Failed to parse timetable")?;
        if file.divisions.is_empty() {
            bail!("Timetable has no divisions");
        }

        let mut divisions = Vec::with_capacity(file.divisions.len());
        for record in file.divisions {
            let id = record.id.trim().to_string();
            if id.is_empty() {
                bail!("Timetable division with an empty id");
            }
            if divisions.iter().any(|d: &DivisionTimetable| d.id == id) {
                bail!("Division {} is defined twice", id);
            }

            let schedule = record
                .entries
                .into_iter()
                .map(EntryRecord::into_entry)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid entry in division {}", id))?;

            divisions.push(DivisionTimetable {
                id,
                schedule,
                subjects: record.subjects,
            });
        }

        let faculty = file
            .faculty
            .into_iter()
            .map(|(code, name)| (code.trim().to_uppercase(), name))
            .collect();

        Ok(Timetable::new(divisions, faculty))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read timetable file {}", path.display()))?;
        let timetable = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load timetable from {}", path.display()))?;
        log::info!("loaded timetable from {}", path.display());
        Ok(timetable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::TimetableSource;
    use chrono::Weekday;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[faculty]
ar = "Dr. Ananya Rao"

[[division]]
id = "7X1"

[[division.subject]]
id = "CS601"
short = "ML"
full = "Machine Learning"

[[division.entry]]
day = "Mon"
start = "09:00"
end = "10:00"
subject = "ML"
room = "A-301"
faculty = "AR"

[[division.entry]]
day = "Tuesday"
start = "14:00"
end = "16:00"
subject = "ML"
type = "Lab"
faculty = "AR"
"#;

    #[test]
    fn parses_divisions_and_entries() {
        let timetable = Timetable::from_toml_str(SAMPLE).unwrap();
        assert_eq!(timetable.division_ids(), vec!["7X1"]);

        let schedule = timetable.schedule("7X1");
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].day, Weekday::Mon);
        assert_eq!(schedule[0].slot_type, SlotType::Lecture);
        assert_eq!(schedule[1].slot_type, SlotType::Lab);
        assert_eq!(schedule[1].time_range(), "14:00 - 16:00");
        assert_eq!(timetable.subjects("7X1")[0].full, "Machine Learning");
        assert_eq!(timetable.faculty_name("AR"), Some("Dr. Ananya Rao"));
    }

    #[test]
    fn rejects_bad_times_and_days() {
        let backwards = SAMPLE.replace("end = \"10:00\"", "end = \"08:00\"");
        assert!(Timetable::from_toml_str(&backwards).is_err());

        let garbled = SAMPLE.replace("start = \"09:00\"", "start = \"nine\"");
        assert!(Timetable::from_toml_str(&garbled).is_err());

        let sunday_typo = SAMPLE.replace("day = \"Mon\"", "day = \"Funday\"");
        assert!(Timetable::from_toml_str(&sunday_typo).is_err());
    }

    #[test]
    fn rejects_empty_and_duplicate_divisions() {
        assert!(Timetable::from_toml_str("[faculty]\n").is_err());

        let twice = format!("{}\n[[division]]\nid = \"7X1\"\n", SAMPLE);
        assert!(Timetable::from_toml_str(&twice).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let timetable = Timetable::from_toml_file(file.path()).unwrap();
        assert_eq!(timetable.schedule("7X1").len(), 2);
        assert!(Timetable::from_toml_file(Path::new("/nonexistent/timetable.toml")).is_err());
    }
}
