//! Derived identifier and date columns
//!
//! All functions here are total: inputs that do not match degrade to empty
//! values instead of failing.

use crate::constants::{FILENAME_TIMESTAMP_PATTERN, NIGHT_DATE_PATTERN};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static FILENAME_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(FILENAME_TIMESTAMP_PATTERN).expect("filename timestamp pattern is valid")
});

static NIGHT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NIGHT_DATE_PATTERN).expect("night date pattern is valid"));

/// Date and time embedded in a photo filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTimestamp {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// The matched text, e.g. `2024_06_01__22_15_00`
    pub verbatim: String,
}

impl FilenameTimestamp {
    /// `YYYY-MM-DD`
    pub fn event_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS`
    pub fn event_time(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

/// Extract a `YYYY_MM_DD__HH_MM_SS` timestamp from a filename
///
/// Returns `None` when the pattern is absent or names an impossible date or time.
pub fn parse_filename_timestamp(text: &str) -> Option<FilenameTimestamp> {
    let captures = FILENAME_TIMESTAMP.captures(text)?;
    let number = |index: usize| captures.get(index)?.as_str().parse::<u32>().ok();

    let year = i32::try_from(number(1)?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    let time = NaiveTime::from_hms_opt(number(4)?, number(5)?, number(6)?)?;

    Some(FilenameTimestamp {
        date,
        time,
        verbatim: captures.get(0)?.as_str().to_string(),
    })
}

fn path_segments(night_path: &str) -> Vec<&str> {
    night_path
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Night path with `/` separators and no empty segments
pub fn normalize_night_path(night_path: &str) -> String {
    path_segments(night_path).join("/")
}

/// Deployment path: the night path without its trailing date segment
///
/// `project/DeploymentX/2025-06-22` becomes `project/DeploymentX`. Paths whose
/// last segment is not a date are returned whole.
pub fn deployment_from_night_path(night_path: &str) -> String {
    let segments = path_segments(night_path);
    match segments.split_last() {
        Some((last, rest)) if !rest.is_empty() && NIGHT_DATE.is_match(last) => rest.join("/"),
        _ => segments.join("/"),
    }
}

/// Dataset id: the configured value, else the first night path segment
pub fn dataset_id(configured: Option<&str>, night_path: &str) -> String {
    configured
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| path_segments(night_path).first().map(|s| s.to_string()))
        .unwrap_or_default()
}

/// `{night path}/{photo}`
pub fn event_id(night_path: &str, photo_id: &str) -> String {
    let night = normalize_night_path(night_path);
    match (night.is_empty(), photo_id.is_empty()) {
        (true, _) => photo_id.to_string(),
        (false, true) => night,
        (false, false) => format!("{}/{}", night, photo_id),
    }
}

/// `{eventID}/{detection id}`
pub fn occurrence_id(event_id: &str, detection_id: &str) -> String {
    if event_id.is_empty() {
        detection_id.to_string()
    } else {
        format!("{}/{}", event_id, detection_id)
    }
}
