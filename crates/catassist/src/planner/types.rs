/// Types consumed and produced by the course planner
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable catalog identifier of a course. Display codes are never used as keys.
pub type CourseId = i64;

/// One course that exists within a curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCourse {
    pub id: CourseId,
    pub code: String, // e.g. "IT205"
    pub name: String,
    pub credits: u32,
    pub required: bool,
}

/// Day a section meets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unrecognized weekday: {0:?}")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts full names and three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let day = match lowered.as_str() {
            "monday" | "mon" => Weekday::Monday,
            "tuesday" | "tue" | "tues" => Weekday::Tuesday,
            "wednesday" | "wed" => Weekday::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" => Weekday::Thursday,
            "friday" | "fri" => Weekday::Friday,
            "saturday" | "sat" => Weekday::Saturday,
            "sunday" | "sun" => Weekday::Sunday,
            _ => return Err(ParseWeekdayError(s.to_string())),
        };
        Ok(day)
    }
}

/// Conflict-detection key of a section: two planned sections may not share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub day: Weekday,
    pub time: String,
}

/// One scheduled offering of a course, with denormalized course data for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: i64,
    pub course_id: CourseId,
    pub code: String,
    pub course_name: String,
    pub credits: u32,
    pub day: Weekday,
    pub time: String, // display interval, e.g. "10:00 – 11:15"
    pub location: String,
    #[serde(rename = "professor")]
    pub instructor: String,
    /// Capacity minus enrolled. Zero or negative means full.
    pub seats_left: i32,
}

impl Section {
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            day: self.day,
            time: self.time.clone(),
        }
    }

    pub fn has_open_seats(&self) -> bool {
        self.seats_left > 0
    }
}

/// Output of the planner: selected sections in selection order plus their credit total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub sections: Vec<Section>,
    pub credits: u32,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}
