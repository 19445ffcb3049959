/// Database row types for the advising schema
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::audit::CourseStatus;
use crate::planner::{CatalogCourse, CourseId, Section};

#[derive(Debug, Clone, Serialize)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub m_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The curriculum a student is mapped to.
#[derive(Debug, Clone)]
pub struct DbProgram {
    pub curriculum_id: i64,
    pub curriculum: String,
}

#[derive(Debug, Clone)]
pub struct DbProgress {
    pub curriculum_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub total_courses: u32,
    pub courses_completed: u32,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DbProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub year: Option<String>,
    pub advisor: Option<String>,
    pub hometown: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbStudentCourse {
    pub course_name: String,
    pub status: CourseStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbEvent {
    pub day: String,
    pub time: String,
    pub title: String,
}

/// A section row as listed on the class browser.
#[derive(Debug, Clone, Serialize)]
pub struct DbClassListing {
    pub code: String,
    pub course_name: String,
    pub credits: u32,
    pub required: bool,
    pub day: String,
    pub time: String,
    pub location: String,
    pub capacity: i32,
    pub enrolled: i32,
    pub seats_left: i32,
    pub professor: String,
    pub professor_email: Option<String>,
}

/// Everything the planner needs for one student, keyed by course id.
#[derive(Debug, Clone, Default)]
pub struct PlanningInputs {
    pub catalog: Vec<CatalogCourse>,
    pub completed: HashSet<CourseId>,
    pub sections_by_course: HashMap<CourseId, Vec<Section>>,
    /// Every section of the curriculum in listing order
    pub sections: Vec<Section>,
}
