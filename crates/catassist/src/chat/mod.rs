//! Chat: the rule-routed advising bot and the LLM assistant.
//!
//! The rule-routed bot answers a fixed set of questions from the student's
//! own records. Plan-based answers come from the same [`PlanBuilder`] the
//! `/data/plan` endpoint uses.

mod assistant;
mod breaker;
mod error;
mod intent;
pub mod reply;

pub use assistant::{AssistantClient, AssistantConfig, AssistantStatus, ChatMessage, FALLBACK_REPLY};
pub use breaker::{BreakerStats, UpstreamBreaker};
pub use error::AssistantError;
pub use intent::{Intent, IntentRouter};

use tracing::debug;

use crate::audit::DegreeAuditProcessor;
use crate::db::{AdvisorDb, DbError};
use crate::planner::PlanBuilder;

/// Credit load the chat bot plans for, independent of the `/data/plan` default.
pub const CHAT_TARGET_CREDITS: i32 = 15;

/// Answers chat messages for one student from the database.
pub struct ChatResponder<'a> {
    db: &'a AdvisorDb,
    planner: &'a PlanBuilder,
    router: &'a IntentRouter,
}

impl<'a> ChatResponder<'a> {
    pub fn new(db: &'a AdvisorDb, planner: &'a PlanBuilder, router: &'a IntentRouter) -> Self {
        Self {
            db,
            planner,
            router,
        }
    }

    /// Produces a reply for `message` sent by the student behind `identifier`.
    pub fn respond(&self, identifier: &str, message: &str) -> Result<String, DbError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(reply::EMPTY_MESSAGE.to_string());
        }

        let Some(student) = self.db.resolve_student(identifier)? else {
            return Ok(reply::UNKNOWN_ACCOUNT.to_string());
        };
        let Some(program) = self.db.program_for(student.id)? else {
            return Ok(reply::NO_CURRICULUM.to_string());
        };

        let intent = self.router.classify(message);
        debug!(student_id = student.id, ?intent, "Routing chat message");

        let text = match intent {
            Intent::Curriculum => {
                let catalog = self.db.catalog_for(program.curriculum_id)?;
                reply::curriculum(&program.curriculum, &catalog)
            }
            Intent::TakenCourses => reply::taken(&self.db.transcript_for(student.id)?),
            Intent::MissingRequired => {
                let catalog = self.db.catalog_for(program.curriculum_id)?;
                let completed = self.db.completed_course_ids(student.id)?;
                reply::missing_required(&DegreeAuditProcessor::missing_required(
                    &catalog, &completed,
                ))
            }
            Intent::CreditsNextSemester | Intent::RecommendedClasses | Intent::ClassLocations => {
                let inputs = self
                    .db
                    .load_planning_inputs(student.id, program.curriculum_id)?;
                let plan = self.planner.build(
                    CHAT_TARGET_CREDITS,
                    &inputs.catalog,
                    &inputs.completed,
                    &inputs.sections_by_course,
                );
                match intent {
                    Intent::CreditsNextSemester => {
                        reply::credits_next_semester(CHAT_TARGET_CREDITS, &plan)
                    }
                    Intent::RecommendedClasses => reply::recommended(&plan),
                    _ => reply::locations(&plan),
                }
            }
            Intent::AvailableProfessors => {
                reply::professors(&self.db.planning_sections(program.curriculum_id)?)
            }
            Intent::CurriculumOverview => {
                reply::curriculum_overview(self.db.progress_for(student.id)?.as_ref())
            }
            Intent::Scenario => reply::scenario(self.db.scenario_for(student.id)?.as_deref()),
            Intent::Schedule => reply::schedule(&self.db.events_for(student.id)?),
            Intent::Help => reply::HELP.to_string(),
        };

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        db: AdvisorDb,
        planner: PlanBuilder,
        router: IntentRouter,
    }

    impl Fixture {
        fn new() -> Self {
            let db = AdvisorDb::open_in_memory().unwrap();
            db.seed_demo_data().unwrap();
            Self {
                db,
                planner: PlanBuilder::default(),
                router: IntentRouter::new().unwrap(),
            }
        }

        fn ask(&self, identifier: &str, message: &str) -> String {
            ChatResponder::new(&self.db, &self.planner, &self.router)
                .respond(identifier, message)
                .unwrap()
        }
    }

    #[test]
    fn test_guard_replies() {
        let f = Fixture::new();

        assert_eq!(f.ask("alice", "   "), reply::EMPTY_MESSAGE);
        assert_eq!(f.ask("nobody@example.com", "hi"), reply::UNKNOWN_ACCOUNT);

        let orphan = f
            .db
            .write_fixtures(|w| w.insert_user("frank", "frank@example.com", None))
            .unwrap();
        assert!(orphan > 0);
        assert_eq!(f.ask("frank", "hi"), reply::NO_CURRICULUM);
    }

    #[test]
    fn test_curriculum_reply() {
        let f = Fixture::new();

        let text = f.ask("alice@example.com", "What is my curriculum?");

        assert!(text.starts_with("Program: Information Technology (BSIT)\nRequired sample:\n"));
        assert!(text.contains("• IT101 (3 cr)"));
        assert!(!text.contains("IT107"));
    }

    #[test]
    fn test_plan_replies_agree() {
        let f = Fixture::new();

        let credits = f.ask("bob", "How many credits do I need for next semester?");
        let recommended = f.ask("bob", "What classes should I take next semester?");

        assert!(credits.starts_with("A typical full-time load is ~15 credits."));
        assert!(recommended.starts_with("Recommended next term:\n"));

        let codes = |text: &str| -> Vec<String> {
            text.lines()
                .skip(1)
                .filter_map(|l| l.strip_prefix("• "))
                .filter_map(|l| l.split_whitespace().next())
                .map(str::to_string)
                .collect()
        };
        assert_eq!(codes(&credits), codes(&recommended));
    }

    #[test]
    fn test_help_fallback() {
        let f = Fixture::new();

        assert_eq!(f.ask("M10000003", "hello"), reply::HELP);
    }

    #[test]
    fn test_schedule_and_scenario() {
        let f = Fixture::new();

        let schedule = f.ask("diana", "What's due this week?");
        assert!(schedule.starts_with("Here’s your upcoming schedule:\nMonday"));

        let scenario = f.ask("diana", "Tell me my scenario");
        assert!(scenario.starts_with("Build a basic DCF"));
    }
}
