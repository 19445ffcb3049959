//! Next-semester course planning.
//!
//! The planner works entirely on data the caller already fetched. It selects at
//! most one section per course, never double-books a (day, time) slot, schedules
//! required courses before electives, and prefers sections with more open seats.

mod types;

pub use types::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Behavior of the required phase once the credit target has been reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPhase {
    /// Scan every outstanding required course, even past the target.
    #[default]
    CompleteAll,
    /// Stop scanning required courses as soon as the target is reached.
    StopAtTarget,
}

/// Tunables for the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPolicy {
    pub required_phase: RequiredPhase,
    /// Credits a required section may push the total past the target.
    pub required_slack: u32,
    /// Credits an elective section may push the total past the target.
    pub elective_slack: u32,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            required_phase: RequiredPhase::CompleteAll,
            required_slack: 1,
            elective_slack: 0,
        }
    }
}

/// Builds next-semester plans with a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    policy: PlanPolicy,
}

impl PlanBuilder {
    pub fn new(policy: PlanPolicy) -> Self {
        Self { policy }
    }

    /// Builds a conflict-free plan aiming at `target_credits`.
    ///
    /// # Arguments
    /// * `target_credits` - Desired credit load. Zero or negative yields an empty plan.
    /// * `catalog` - Courses ordered required first, then electives, each group by code
    /// * `completed` - Course ids the student already took; these are never scheduled
    /// * `sections_by_course` - Candidate sections per course id, in caller order
    ///
    /// # Returns
    /// The selected sections in selection order and their credit total.
    pub fn build(
        &self,
        target_credits: i32,
        catalog: &[CatalogCourse],
        completed: &HashSet<CourseId>,
        sections_by_course: &HashMap<CourseId, Vec<Section>>,
    ) -> Plan {
        let Ok(target) = u32::try_from(target_credits) else {
            return Plan::default();
        };
        if target == 0 {
            return Plan::default();
        }

        let mut draft = DraftPlan::new(target);

        for course in catalog.iter().filter(|c| c.required) {
            if completed.contains(&course.id) {
                continue;
            }
            draft.schedule_course(course, sections_by_course, self.policy.required_slack);

            if self.policy.required_phase == RequiredPhase::StopAtTarget && draft.target_reached()
            {
                break;
            }
        }

        if !draft.target_reached() {
            for course in catalog.iter().filter(|c| !c.required) {
                if completed.contains(&course.id) {
                    continue;
                }
                draft.schedule_course(course, sections_by_course, self.policy.elective_slack);

                if draft.target_reached() {
                    break;
                }
            }
        }

        draft.finish()
    }
}

/// Plans with the default policy.
pub fn build_plan(
    target_credits: i32,
    catalog: &[CatalogCourse],
    completed: &HashSet<CourseId>,
    sections_by_course: &HashMap<CourseId, Vec<Section>>,
) -> Plan {
    PlanBuilder::default().build(target_credits, catalog, completed, sections_by_course)
}

/// Per-call accumulator; never shared between calls.
struct DraftPlan {
    target: u32,
    credits: u32,
    used_slots: HashSet<TimeSlot>,
    scheduled_courses: HashSet<CourseId>,
    sections: Vec<Section>,
}

impl DraftPlan {
    fn new(target: u32) -> Self {
        Self {
            target,
            credits: 0,
            used_slots: HashSet::new(),
            scheduled_courses: HashSet::new(),
            sections: Vec::new(),
        }
    }

    fn target_reached(&self) -> bool {
        self.credits >= self.target
    }

    /// Picks the best acceptable section of `course`, if any.
    fn schedule_course(
        &mut self,
        course: &CatalogCourse,
        sections_by_course: &HashMap<CourseId, Vec<Section>>,
        slack: u32,
    ) {
        if self.scheduled_courses.contains(&course.id) {
            return;
        }
        let Some(candidates) = sections_by_course.get(&course.id) else {
            return;
        };

        // Stable: equal seat counts keep the caller's order
        let mut ranked: Vec<&Section> = candidates.iter().collect();
        ranked.sort_by(|a, b| b.seats_left.cmp(&a.seats_left));

        let limit = self.target.saturating_add(slack);
        for section in ranked {
            if !section.has_open_seats() {
                continue;
            }
            let slot = section.time_slot();
            if self.used_slots.contains(&slot) {
                continue;
            }
            if self.credits.saturating_add(section.credits) > limit {
                continue;
            }

            self.used_slots.insert(slot);
            self.scheduled_courses.insert(course.id);
            self.credits += section.credits;
            self.sections.push(section.clone());
            return;
        }
    }

    fn finish(self) -> Plan {
        Plan {
            sections: self.sections,
            credits: self.credits,
        }
    }
}
