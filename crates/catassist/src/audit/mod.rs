/// Degree audit and progress computations
mod types;

pub use types::*;

use std::collections::HashSet;

use crate::planner::{CatalogCourse, CourseId};

/// Computes requirement status from a curriculum catalog and a transcript
pub struct DegreeAuditProcessor;

impl DegreeAuditProcessor {
    /// Audits a transcript against a curriculum catalog.
    ///
    /// Transcript rows repeating a course count once; the first row wins.
    ///
    /// # Arguments
    /// * `curriculum` - Curriculum display name
    /// * `catalog` - All courses of the curriculum, in display order
    /// * `transcript` - Courses the student completed
    pub fn audit(
        curriculum: &str,
        catalog: &[CatalogCourse],
        transcript: &[TranscriptEntry],
    ) -> DegreeAudit {
        let mut seen: HashSet<CourseId> = HashSet::new();
        let taken: Vec<TranscriptEntry> = transcript
            .iter()
            .filter(|entry| seen.insert(entry.course_id))
            .cloned()
            .collect();

        let missing_required: Vec<CatalogCourse> = catalog
            .iter()
            .filter(|course| course.required && !seen.contains(&course.id))
            .cloned()
            .collect();

        let credits_taken = taken.iter().map(|t| t.credits).sum();
        let credits_missing_required = missing_required.iter().map(|c| c.credits).sum();

        DegreeAudit {
            curriculum: curriculum.to_string(),
            taken,
            missing_required,
            credits_taken,
            credits_missing_required,
        }
    }

    /// Required courses the student has not taken yet, in catalog order.
    pub fn missing_required<'a>(
        catalog: &'a [CatalogCourse],
        completed: &HashSet<CourseId>,
    ) -> Vec<&'a CatalogCourse> {
        catalog
            .iter()
            .filter(|c| c.required && !completed.contains(&c.id))
            .collect()
    }
}

/// Completion percentage rounded to the nearest whole number; 0 when `total` is 0.
pub fn percent_complete(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(completed) / f64::from(total)) * 100.0).round() as u32
}
