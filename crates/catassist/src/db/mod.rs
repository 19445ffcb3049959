/// Database module for students, curriculums, catalogs and class sections

mod error;
mod seed;
mod types;

pub use error::DbError;
pub use seed::{hash_password, FixtureWriter, SeedSummary};
pub use types::*;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::audit::{CourseStatus, TranscriptEntry};
use crate::planner::{CatalogCourse, CourseId, Section, Weekday};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_schema.sql");

pub struct AdvisorDb {
    db: Mutex<Connection>,
}

impl AdvisorDb {
    /// Opens (or creates) the database file and initializes the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Opened advising database at {}", path.as_ref().display());
        Self::init(conn)
    }

    /// Opens a private in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, DbError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.db.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Checks whether any student account exists
    pub fn has_students(&self) -> Result<bool, DbError> {
        let db = self.conn()?;
        let count: i64 = db.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Finds a student by email, username or M-number
    ///
    /// Email and M-number comparisons ignore case.
    pub fn resolve_student(&self, identifier: &str) -> Result<Option<DbUser>, DbError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(None);
        }

        let db = self.conn()?;
        let user = db
            .query_row(
                "SELECT id, username, email, m_number, created_at
                 FROM users
                 WHERE lower(email) = lower(?1)
                    OR username = ?1
                    OR lower(m_number) = lower(?1)
                 ORDER BY id
                 LIMIT 1",
                [identifier],
                |row| {
                    Ok(DbUser {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        m_number: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    /// Gets the curriculum a student is mapped to
    pub fn program_for(&self, student_id: i64) -> Result<Option<DbProgram>, DbError> {
        let db = self.conn()?;
        query_program(&db, student_id)
    }

    /// Gets curriculum details together with the student's progress counters
    pub fn progress_for(&self, student_id: i64) -> Result<Option<DbProgress>, DbError> {
        let db = self.conn()?;
        let progress = db
            .query_row(
                "SELECT c.id, c.name, c.description, c.total_courses,
                        sp.courses_completed, sp.gpa
                 FROM student_progress sp
                 JOIN curriculums c ON c.id = sp.curriculum_id
                 WHERE sp.student_id = ?
                 ORDER BY sp.id
                 LIMIT 1",
                [student_id],
                |row| {
                    Ok(DbProgress {
                        curriculum_id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        total_courses: row.get(3)?,
                        courses_completed: row.get(4)?,
                        gpa: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(progress)
    }

    /// Gets the personal profile of a student
    pub fn profile_for(&self, student_id: i64) -> Result<Option<DbProfile>, DbError> {
        let db = self.conn()?;
        let profile = db
            .query_row(
                "SELECT full_name, phone, year, advisor, hometown, bio
                 FROM student_profiles
                 WHERE student_id = ?
                 ORDER BY id
                 LIMIT 1",
                [student_id],
                |row| {
                    Ok(DbProfile {
                        full_name: row.get(0)?,
                        phone: row.get(1)?,
                        year: row.get(2)?,
                        advisor: row.get(3)?,
                        hometown: row.get(4)?,
                        bio: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(profile)
    }

    /// Gets the degree checklist rows of a student in insertion order
    pub fn student_courses(&self, student_id: i64) -> Result<Vec<DbStudentCourse>, DbError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT course_name, status
             FROM student_courses
             WHERE student_id = ?
             ORDER BY id ASC",
        )?;

        let courses = stmt
            .query_map([student_id], |row| {
                let status: String = row.get(1)?;
                let status = status.parse::<CourseStatus>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
                })?;
                Ok(DbStudentCourse {
                    course_name: row.get(0)?,
                    status,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    /// Gets the weekly events of a student, Monday first, then by time
    pub fn events_for(&self, student_id: i64) -> Result<Vec<DbEvent>, DbError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT day, time, title
             FROM student_events
             WHERE student_id = ?
             ORDER BY
                CASE day
                    WHEN 'Monday' THEN 1 WHEN 'Tuesday' THEN 2 WHEN 'Wednesday' THEN 3
                    WHEN 'Thursday' THEN 4 WHEN 'Friday' THEN 5 WHEN 'Saturday' THEN 6
                    ELSE 7
                END,
                time ASC",
        )?;

        let events = stmt
            .query_map([student_id], |row| {
                Ok(DbEvent {
                    day: row.get(0)?,
                    time: row.get(1)?,
                    title: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    /// Gets the saved scenario text of a student
    pub fn scenario_for(&self, student_id: i64) -> Result<Option<String>, DbError> {
        let db = self.conn()?;
        let scenario: Option<Option<String>> = db
            .query_row(
                "SELECT scenario FROM student_scenarios WHERE student_id = ? ORDER BY id LIMIT 1",
                [student_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(scenario.flatten())
    }

    /// Gets the catalog of a curriculum, required courses first, then by code
    pub fn catalog_for(&self, curriculum_id: i64) -> Result<Vec<CatalogCourse>, DbError> {
        let db = self.conn()?;
        query_catalog(&db, curriculum_id)
    }

    /// Gets the completed courses of a student ordered by code
    pub fn transcript_for(&self, student_id: i64) -> Result<Vec<TranscriptEntry>, DbError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT t.course_id, cc.code, cc.name, cc.credits, t.grade
             FROM student_transcripts t
             JOIN catalog_courses cc ON cc.id = t.course_id
             WHERE t.student_id = ?
             ORDER BY cc.code, t.id",
        )?;

        let entries = stmt
            .query_map([student_id], |row| {
                Ok(TranscriptEntry {
                    course_id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    credits: row.get(3)?,
                    grade: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Gets the set of course ids a student has completed
    pub fn completed_course_ids(&self, student_id: i64) -> Result<HashSet<CourseId>, DbError> {
        let db = self.conn()?;
        query_completed(&db, student_id)
    }

    /// Gets every section of a curriculum in planning order
    ///
    /// Sections whose day cannot be interpreted are left out.
    pub fn planning_sections(&self, curriculum_id: i64) -> Result<Vec<Section>, DbError> {
        let db = self.conn()?;
        query_sections(&db, curriculum_id)
    }

    /// Gets the class listing of a curriculum for display
    pub fn class_listing(&self, curriculum_id: i64) -> Result<Vec<DbClassListing>, DbError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(
            "SELECT cc.code, cc.name, cc.credits, cc.required,
                    s.day, s.time, s.location, s.capacity, s.enrolled,
                    (s.capacity - s.enrolled) AS seats_left,
                    COALESCE(p.name, 'Staff'), p.email
             FROM class_sections s
             JOIN catalog_courses cc ON cc.id = s.course_id
             LEFT JOIN professors p ON p.id = s.professor_id
             WHERE cc.curriculum_id = ?
             ORDER BY cc.code, s.day, s.time, s.id",
        )?;

        let listing = stmt
            .query_map([curriculum_id], |row| {
                Ok(DbClassListing {
                    code: row.get(0)?,
                    course_name: row.get(1)?,
                    credits: row.get(2)?,
                    required: row.get(3)?,
                    day: row.get(4)?,
                    time: row.get(5)?,
                    location: row.get(6)?,
                    capacity: row.get(7)?,
                    enrolled: row.get(8)?,
                    seats_left: row.get(9)?,
                    professor: row.get(10)?,
                    professor_email: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(listing)
    }

    /// Loads catalog, completed set and sections grouped by course id in one lock
    pub fn load_planning_inputs(
        &self,
        student_id: i64,
        curriculum_id: i64,
    ) -> Result<PlanningInputs, DbError> {
        let db = self.conn()?;

        let catalog = query_catalog(&db, curriculum_id)?;
        let completed = query_completed(&db, student_id)?;
        let sections = query_sections(&db, curriculum_id)?;

        let mut sections_by_course: HashMap<CourseId, Vec<Section>> = HashMap::new();
        for section in &sections {
            sections_by_course
                .entry(section.course_id)
                .or_default()
                .push(section.clone());
        }

        debug!(
            student_id,
            curriculum_id,
            catalog = catalog.len(),
            completed = completed.len(),
            sections = sections.len(),
            "Loaded planning inputs"
        );

        Ok(PlanningInputs {
            catalog,
            completed,
            sections_by_course,
            sections,
        })
    }
}

fn query_program(db: &Connection, student_id: i64) -> Result<Option<DbProgram>, DbError> {
    let program = db
        .query_row(
            "SELECT c.id, c.name
             FROM student_progress sp
             JOIN curriculums c ON c.id = sp.curriculum_id
             WHERE sp.student_id = ?
             ORDER BY sp.id
             LIMIT 1",
            [student_id],
            |row| {
                Ok(DbProgram {
                    curriculum_id: row.get(0)?,
                    curriculum: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(program)
}

fn query_catalog(db: &Connection, curriculum_id: i64) -> Result<Vec<CatalogCourse>, DbError> {
    let mut stmt = db.prepare(
        "SELECT id, code, name, credits, required
         FROM catalog_courses
         WHERE curriculum_id = ?
         ORDER BY required DESC, code",
    )?;

    let catalog = stmt
        .query_map([curriculum_id], |row| {
            Ok(CatalogCourse {
                id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
                credits: row.get(3)?,
                required: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(catalog)
}

fn query_completed(db: &Connection, student_id: i64) -> Result<HashSet<CourseId>, DbError> {
    let mut stmt = db.prepare("SELECT course_id FROM student_transcripts WHERE student_id = ?")?;

    let completed = stmt
        .query_map([student_id], |row| row.get::<_, CourseId>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    Ok(completed)
}

fn query_sections(db: &Connection, curriculum_id: i64) -> Result<Vec<Section>, DbError> {
    let mut stmt = db.prepare(
        "SELECT s.id, cc.id, cc.code, cc.name, cc.credits,
                s.day, s.time, s.location,
                COALESCE(p.name, 'Staff'),
                (s.capacity - s.enrolled) AS seats_left
         FROM class_sections s
         JOIN catalog_courses cc ON cc.id = s.course_id
         LEFT JOIN professors p ON p.id = s.professor_id
         WHERE cc.curriculum_id = ?
         ORDER BY cc.required DESC, cc.code, s.day, s.time, s.id",
    )?;

    let rows = stmt
        .query_map([curriculum_id], |row| {
            let day: String = row.get(5)?;
            Ok((
                day,
                Section {
                    section_id: row.get(0)?,
                    course_id: row.get(1)?,
                    code: row.get(2)?,
                    course_name: row.get(3)?,
                    credits: row.get(4)?,
                    day: Weekday::Monday,
                    time: row.get(6)?,
                    location: row.get(7)?,
                    instructor: row.get(8)?,
                    seats_left: row.get(9)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut sections = Vec::with_capacity(rows.len());
    for (day, mut section) in rows {
        match day.parse::<Weekday>() {
            Ok(parsed) => {
                section.day = parsed;
                sections.push(section);
            }
            Err(e) => warn!(section_id = section.section_id, "Skipping section: {}", e),
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db() -> (AdvisorDb, i64, i64) {
        let db = AdvisorDb::open_in_memory().unwrap();
        let (student, curriculum) = db
            .write_fixtures(|w| {
                let student = w.insert_user("alice", "alice@example.com", Some("M10000001"))?;
                let curriculum = w.insert_curriculum(
                    "Information Technology (BSIT)",
                    Some("Networking and software."),
                    40,
                )?;
                w.insert_progress(student, curriculum, 12, Some(3.41))?;
                let prof = w.insert_professor("Dr. Nguyen", Some("nguyen@example.edu"), "IT")?;

                let it101 = w.insert_catalog_course(curriculum, "IT101", "IT Fundamentals", 3, true)?;
                let it102 = w.insert_catalog_course(curriculum, "IT102", "Networking I", 3, true)?;
                let it300 =
                    w.insert_catalog_course(curriculum, "IT300", "Cloud Infrastructure", 3, false)?;

                w.insert_section(it101, Some(prof), "Monday", "09:00 – 10:15", "Lindner 101", 30, 10)?;
                w.insert_section(it102, Some(prof), "Tuesday", "09:00 – 10:15", "Lindner 102", 30, 30)?;
                w.insert_section(it102, None, "Funday", "09:00 – 10:15", "Lindner 103", 30, 0)?;
                w.insert_section(it300, Some(prof), "Wednesday", "13:00 – 14:15", "Lindner 104", 25, 5)?;

                w.insert_transcript(student, it101, Some("A-"))?;
                w.insert_transcript(student, it101, Some("A-"))?;
                Ok((student, curriculum))
            })
            .unwrap();
        (db, student, curriculum)
    }

    #[test]
    fn test_resolve_student_by_any_identifier() {
        let (db, student, _) = fixture_db();

        for identifier in ["alice@example.com", "ALICE@example.com", "alice", "m10000001"] {
            let user = db.resolve_student(identifier).unwrap().unwrap();
            assert_eq!(user.id, student);
        }
        assert!(db.resolve_student("nobody").unwrap().is_none());
        assert!(db.resolve_student("   ").unwrap().is_none());
    }

    #[test]
    fn test_catalog_orders_required_first() {
        let (db, _, curriculum) = fixture_db();

        let codes: Vec<String> = db
            .catalog_for(curriculum)
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();

        assert_eq!(codes, vec!["IT101", "IT102", "IT300"]);
    }

    #[test]
    fn test_completed_ids_are_a_set() {
        let (db, student, _) = fixture_db();

        assert_eq!(db.completed_course_ids(student).unwrap().len(), 1);
        assert_eq!(db.transcript_for(student).unwrap().len(), 2);
    }

    #[test]
    fn test_planning_inputs_group_by_course_id() {
        let (db, student, curriculum) = fixture_db();

        let inputs = db.load_planning_inputs(student, curriculum).unwrap();

        assert_eq!(inputs.catalog.len(), 3);
        // The "Funday" section is dropped
        assert_eq!(inputs.sections.len(), 3);
        for (course_id, sections) in &inputs.sections_by_course {
            assert!(sections.iter().all(|s| s.course_id == *course_id));
        }
        let full = inputs
            .sections
            .iter()
            .find(|s| s.code == "IT102")
            .unwrap();
        assert_eq!(full.seats_left, 0);
        assert_eq!(full.instructor, "Dr. Nguyen");
    }

    #[test]
    fn test_class_listing_includes_unstaffed_sections() {
        let (db, _, curriculum) = fixture_db();

        let listing = db.class_listing(curriculum).unwrap();

        assert_eq!(listing.len(), 4);
        assert!(listing.iter().any(|l| l.professor == "Staff"));
    }

    #[test]
    fn test_progress_and_program() {
        let (db, student, curriculum) = fixture_db();

        let program = db.program_for(student).unwrap().unwrap();
        assert_eq!(program.curriculum_id, curriculum);

        let progress = db.progress_for(student).unwrap().unwrap();
        assert_eq!(progress.total_courses, 40);
        assert_eq!(progress.courses_completed, 12);
        assert_eq!(progress.gpa, Some(3.41));

        assert!(db.profile_for(student).unwrap().is_none());
        assert!(db.scenario_for(student).unwrap().is_none());
    }

    #[test]
    fn test_student_courses_parse_status() {
        let (db, student, curriculum) = fixture_db();
        db.write_fixtures(|w| {
            w.insert_student_course(student, curriculum, "IT Fundamentals", CourseStatus::Completed)?;
            w.insert_student_course(student, curriculum, "Networking I", CourseStatus::InProgress)?;
            w.insert_student_course(student, curriculum, "Cloud Infrastructure", CourseStatus::Pending)
        })
        .unwrap();

        let statuses: Vec<CourseStatus> = db
            .student_courses(student)
            .unwrap()
            .into_iter()
            .map(|c| c.status)
            .collect();

        assert_eq!(
            statuses,
            vec![CourseStatus::Completed, CourseStatus::InProgress, CourseStatus::Pending]
        );
    }

    #[test]
    fn test_equal_seat_sections_keep_day_name_order() {
        let db = AdvisorDb::open_in_memory().unwrap();
        let (student, curriculum) = db
            .write_fixtures(|w| {
                let student = w.insert_user("gina", "gina@example.com", None)?;
                let curriculum = w.insert_curriculum("Finance (BBA)", None, 40)?;
                w.insert_progress(student, curriculum, 0, None)?;
                let fin101 =
                    w.insert_catalog_course(curriculum, "FIN101", "Intro to Finance", 3, true)?;
                w.insert_section(fin101, None, "Monday", "09:00 – 10:15", "Lindner 201", 20, 10)?;
                w.insert_section(fin101, None, "Friday", "09:00 – 10:15", "Lindner 202", 20, 10)?;
                Ok((student, curriculum))
            })
            .unwrap();

        let inputs = db.load_planning_inputs(student, curriculum).unwrap();
        let plan = crate::planner::PlanBuilder::default().build(
            15,
            &inputs.catalog,
            &inputs.completed,
            &inputs.sections_by_course,
        );

        assert_eq!(plan.sections.len(), 1);
        assert_eq!(plan.sections[0].day, Weekday::Friday);
    }
}
