/// Reply templates for the rule-routed chat
use crate::audit::{percent_complete, TranscriptEntry};
use crate::db::{DbEvent, DbProgress};
use crate::planner::{CatalogCourse, Plan, Section};

pub const EMPTY_MESSAGE: &str = "Tell me what you'd like to know.";
pub const UNKNOWN_ACCOUNT: &str = "I can’t find your account yet.";
pub const NO_CURRICULUM: &str = "I don’t see your curriculum mapping yet.";

pub const HELP: &str = "I can help with:
• What is my curriculum?
• What classes should I take next semester?
• How many credits do I need for next semester?
• Which professors are available for the classes I'm taking next semester?
• Where are classes located that I am taking next semester?
• Am I missing any required classes from the curriculum that I should have taken by now?
• What classes have I already taken so far?
• What's my scenario?
• What's due this week?";

const EMPTY_LIST: &str = "—";
const SCHEDULE_LINES: usize = 6;

/// Renders lines as `• ` bullets, keeping at most `max` and marking the cut with `• …`.
pub fn list_lines(lines: &[String], max: usize) -> String {
    if lines.is_empty() {
        return EMPTY_LIST.to_string();
    }

    let mut out: Vec<String> = lines.iter().take(max).map(|l| format!("• {}", l)).collect();
    if lines.len() > max {
        out.push("• …".to_string());
    }
    out.join("\n")
}

pub fn curriculum(program: &str, catalog: &[CatalogCourse]) -> String {
    let sample: Vec<String> = catalog
        .iter()
        .filter(|c| c.required)
        .take(6)
        .map(|c| format!("{} ({} cr)", c.code, c.credits))
        .collect();

    format!("Program: {}\nRequired sample:\n{}", program, list_lines(&sample, 8))
}

pub fn taken(transcript: &[TranscriptEntry]) -> String {
    let lines: Vec<String> = transcript
        .iter()
        .map(|t| {
            format!(
                "{} {} — {} ({} cr)",
                t.code,
                t.name,
                t.grade.as_deref().unwrap_or(EMPTY_LIST),
                t.credits
            )
        })
        .collect();

    format!("Completed so far:\n{}", list_lines(&lines, 12))
}

pub fn missing_required(missing: &[&CatalogCourse]) -> String {
    if missing.is_empty() {
        return "You are not missing any required courses so far.".to_string();
    }

    let lines: Vec<String> = missing
        .iter()
        .map(|c| format!("{} {} ({} cr)", c.code, c.name, c.credits))
        .collect();

    format!("Yes — still needed:\n{}", list_lines(&lines, 12))
}

pub fn credits_next_semester(target: i32, plan: &Plan) -> String {
    let lines: Vec<String> = plan
        .sections
        .iter()
        .map(|s| format!("{} {} ({} cr)", s.code, s.course_name, s.credits))
        .collect();

    format!(
        "A typical full-time load is ~{} credits. Proposed plan totals {} credits:\n{}",
        target,
        plan.credits,
        list_lines(&lines, 12)
    )
}

pub fn recommended(plan: &Plan) -> String {
    let lines: Vec<String> = plan
        .sections
        .iter()
        .map(|s| {
            format!(
                "{} {} ({} cr) — {} {} with {}",
                s.code, s.course_name, s.credits, s.day, s.time, s.instructor
            )
        })
        .collect();

    format!("Recommended next term:\n{}", list_lines(&lines, 12))
}

pub fn professors(sections: &[Section]) -> String {
    let lines: Vec<String> = sections
        .iter()
        .filter(|s| s.has_open_seats())
        .map(|s| {
            format!(
                "{} — {} ({} {}) [{} seats]",
                s.code, s.instructor, s.day, s.time, s.seats_left
            )
        })
        .collect();

    format!("Professors with open seats:\n{}", list_lines(&lines, 15))
}

pub fn locations(plan: &Plan) -> String {
    if plan.is_empty() {
        return "No planned sections yet; ask me to plan your semester first.".to_string();
    }

    let lines: Vec<String> = plan
        .sections
        .iter()
        .map(|s| {
            format!(
                "{} — {} ({} {}, {})",
                s.code, s.location, s.day, s.time, s.instructor
            )
        })
        .collect();

    format!("Locations next term:\n{}", list_lines(&lines, 12))
}

pub fn curriculum_overview(progress: Option<&DbProgress>) -> String {
    let Some(progress) = progress else {
        return "I could not find a curriculum linked to your account.".to_string();
    };

    let pct = percent_complete(progress.courses_completed, progress.total_courses);
    let gpa = progress
        .gpa
        .map(|g| format!("{:.2}", g))
        .unwrap_or_else(|| EMPTY_LIST.to_string());

    format!(
        "You're in “{}” ({}% complete, GPA {}).\n{}",
        progress.name,
        pct,
        gpa,
        progress.description.as_deref().unwrap_or_default()
    )
}

pub fn scenario(scenario: Option<&str>) -> String {
    match scenario {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => "No scenario saved for you yet.".to_string(),
    }
}

pub fn schedule(events: &[DbEvent]) -> String {
    if events.is_empty() {
        return "You have no upcoming events stored.".to_string();
    }

    let lines: Vec<String> = events
        .iter()
        .take(SCHEDULE_LINES)
        .map(|e| format!("{} {} — {}", e.day, e.time, e.title))
        .collect();

    format!("Here’s your upcoming schedule:\n{}", lines.join("\n"))
}
