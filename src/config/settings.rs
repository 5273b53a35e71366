use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::StrategyMode;
use crate::timetable::builtin::DEFAULT_DIVISION;

pub const DEFAULT_TARGET: f64 = 75.0;

fn default_division() -> String {
    DEFAULT_DIVISION.to_string()
}
fn default_target() -> f64 {
    DEFAULT_TARGET
}
fn default_true() -> bool {
    true
}
fn default_teaching_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 5).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_division")]
    pub division: String,
    #[serde(default = "default_target")]
    pub target: f64,
    /// Ignore `target` and plan for the college default.
    #[serde(default = "default_true")]
    pub use_default_target: bool,
    #[serde(default)]
    pub mode: StrategyMode,
}

impl PlannerConfig {
    pub fn effective_target(&self) -> f64 {
        if self.use_default_target {
            DEFAULT_TARGET
        } else {
            self.target
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            division: default_division(),
            target: default_target(),
            use_default_target: true,
            mode: StrategyMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Last day lectures are held this semester.
    #[serde(default = "default_teaching_end")]
    pub teaching_end: NaiveDate,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            teaching_end: default_teaching_end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimetableConfig {
    /// TOML timetable to use instead of the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Counts from the last time the user ran a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InputsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conducted: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_attendance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub timetable: TimetableConfig,
    #[serde(default)]
    pub inputs: InputsConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "hazri").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        log::debug!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        log::info!("saved config to {:?}", path);
        Ok(())
    }

    pub fn remember_inputs(&mut self, conducted: u32, attended: u32, no_attendance: u32) {
        self.inputs = InputsConfig {
            conducted: Some(conducted),
            attended: Some(attended),
            no_attendance: Some(no_attendance),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.planner.division, "6A22");
        assert_eq!(config.planner.mode, StrategyMode::Medium);
        assert_eq!(config.planner.effective_target(), 75.0);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.planner.division = "6B21".to_string();
        config.planner.target = 80.0;
        config.planner.use_default_target = false;
        config.planner.mode = StrategyMode::Hard;
        config.timetable.path = Some(PathBuf::from("/tmp/timetable.toml"));
        config.remember_inputs(40, 30, 5);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.planner.effective_target(), 80.0);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[planner]\nmode = \"hardcore\"\n\n[calendar]\nteaching_end = \"2026-11-28\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.planner.mode, StrategyMode::Hard);
        assert_eq!(config.planner.division, "6A22");
        assert_eq!(
            config.calendar.teaching_end,
            NaiveDate::from_ymd_opt(2026, 11, 28).unwrap()
        );
        assert_eq!(config.inputs, InputsConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planner\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
