/// Types for degree audit and progress data
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::planner::{CatalogCourse, CourseId};

/// One completed course from a student's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    #[serde(rename = "id")]
    pub course_id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub grade: Option<String>,
}

/// Requirement check of a student's transcript against their curriculum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeAudit {
    pub curriculum: String,
    pub taken: Vec<TranscriptEntry>,
    pub missing_required: Vec<CatalogCourse>,
    pub credits_taken: u32,
    pub credits_missing_required: u32,
}

/// Status of a course on the student's degree checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    Pending,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Completed => "Completed",
            CourseStatus::InProgress => "In Progress",
            CourseStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(CourseStatus::Completed),
            "In Progress" => Ok(CourseStatus::InProgress),
            "Pending" => Ok(CourseStatus::Pending),
            other => Err(format!("Unknown course status: {}", other)),
        }
    }
}

/// Curriculum progress as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurriculumProgress {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub total_courses: u32,
    pub courses_completed: u32,
    pub percent: u32,
    pub gpa: Option<f64>,
}
