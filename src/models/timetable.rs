use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    Lecture,
    Lab,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Lecture => "Lecture",
            SlotType::Lab => "Lab",
        }
    }
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlotType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lecture" | "lec" => Ok(SlotType::Lecture),
            "lab" | "practical" => Ok(SlotType::Lab),
            _ => Err(anyhow::anyhow!("Unknown slot type: {}", s)),
        }
    }
}

/// One row of a division's weekly timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub subject_short: String,
    pub room: String,
    pub slot_type: SlotType,
    pub faculty: String,
}

impl ScheduleEntry {
    /// "HH:MM - HH:MM"
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }

    /// Library and self-study rows occupy the timetable but are not lectures.
    pub fn is_teaching(&self) -> bool {
        let upper = self.subject_short.trim().to_uppercase();
        !(upper.is_empty() || upper.contains("LIBRARY") || upper.contains("SELF STUDY"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub id: String,
    pub short: String,
    pub full: String,
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday(s: &str) -> anyhow::Result<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err(anyhow::anyhow!("Unknown day: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(subject: &str) -> ScheduleEntry {
        ScheduleEntry {
            day: Weekday::Mon,
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            subject_short: subject.to_string(),
            room: "301".to_string(),
            slot_type: SlotType::Lecture,
            faculty: "AR".to_string(),
        }
    }

    #[test]
    fn library_and_self_study_are_not_teaching() {
        assert!(entry("ML").is_teaching());
        assert!(!entry("Library").is_teaching());
        assert!(!entry("self study").is_teaching());
        assert!(!entry("  ").is_teaching());
    }

    #[test]
    fn time_range_uses_24h_clock() {
        assert_eq!(entry("ML").time_range(), "09:00 - 10:00");
    }

    #[test]
    fn weekday_names_round_trip() {
        for day in [Weekday::Mon, Weekday::Wed, Weekday::Sat] {
            assert_eq!(parse_weekday(weekday_name(day)).unwrap(), day);
        }
        assert!(parse_weekday("someday").is_err());
    }
}
