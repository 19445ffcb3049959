/// Demo fixture for local development and tests
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use tracing::info;

use super::{AdvisorDb, DbError, DbProfile};
use crate::audit::CourseStatus;

/// Password every demo account is created with
pub const DEMO_PASSWORD: &str = "Test1234!";

const SLOTS: [(&str, &str); 8] = [
    ("Monday", "09:00 – 10:15"),
    ("Tuesday", "10:30 – 11:45"),
    ("Wednesday", "13:00 – 14:15"),
    ("Thursday", "14:30 – 15:45"),
    ("Friday", "09:00 – 10:15"),
    ("Monday", "13:00 – 14:15"),
    ("Tuesday", "15:00 – 16:15"),
    ("Wednesday", "09:00 – 10:15"),
];

const GRADES: [&str; 6] = ["A", "A-", "B+", "B", "B-", "C+"];

const CATALOG_REQUIRED: usize = 6;

struct DemoStudent {
    username: &'static str,
    m_number: &'static str,
    program: usize,
    full_name: &'static str,
    phone: &'static str,
    year: &'static str,
    advisor: &'static str,
    hometown: &'static str,
    bio: &'static str,
}

struct DemoProgram {
    name: &'static str,
    prefix: &'static str,
    description: &'static str,
    total_courses: u32,
    courses: [&'static str; 10],
    professors: [&'static str; 3],
    building: &'static str,
    scenario: &'static str,
}

static STUDENTS: [DemoStudent; 5] = [
    DemoStudent {
        username: "alice",
        m_number: "M10000001",
        program: 0,
        full_name: "Alice Johnson",
        phone: "(513) 555-1010",
        year: "Sophomore",
        advisor: "Dr. Nguyen",
        hometown: "Cincinnati, OH",
        bio: "BSIT student into cloud & web.",
    },
    DemoStudent {
        username: "bob",
        m_number: "M10000002",
        program: 1,
        full_name: "Bob Martinez",
        phone: "(513) 555-2020",
        year: "Junior",
        advisor: "Dr. Patel",
        hometown: "Mason, OH",
        bio: "Cyber student focused on blue-team and IR.",
    },
    DemoStudent {
        username: "charlie",
        m_number: "M10000003",
        program: 2,
        full_name: "Charlie Kim",
        phone: "(513) 555-3030",
        year: "Senior",
        advisor: "Prof. Ellis",
        hometown: "Dayton, OH",
        bio: "Accounting student prepping for CPA.",
    },
    DemoStudent {
        username: "diana",
        m_number: "M10000004",
        program: 3,
        full_name: "Diana Shah",
        phone: "(513) 555-4040",
        year: "Junior",
        advisor: "Prof. Blake",
        hometown: "Columbus, OH",
        bio: "Finance student passionate about markets.",
    },
    DemoStudent {
        username: "eric",
        m_number: "M10000005",
        program: 4,
        full_name: "Eric Liu",
        phone: "(513) 555-5050",
        year: "Sophomore",
        advisor: "Dr. Romero",
        hometown: "Blue Ash, OH",
        bio: "ME student exploring robotics & design.",
    },
];

static PROGRAMS: [DemoProgram; 5] = [
    DemoProgram {
        name: "Information Technology (BSIT)",
        prefix: "IT",
        description: "Networking, cybersecurity, software development, and systems administration.",
        total_courses: 40,
        courses: [
            "IT Fundamentals",
            "Networking I",
            "Networking II",
            "Database Systems",
            "Web Development",
            "Python Programming",
            "Cybersecurity Fundamentals",
            "Systems Administration",
            "IT Project Management",
            "Cloud Infrastructure",
        ],
        professors: ["Dr. Nguyen", "Dr. Okafor", "Prof. Lindgren"],
        building: "Lindner",
        scenario: "You are leading a small team project to migrate a legacy PHP site to Next.js with a Neon Postgres backend. Draft a 2-week plan.",
    },
    DemoProgram {
        name: "Cybersecurity (BSCyber)",
        prefix: "CYB",
        description: "Secure coding, digital forensics, penetration testing, and incident response.",
        total_courses: 38,
        courses: [
            "Intro to Cybersecurity",
            "Ethical Hacking",
            "Network Defense",
            "Digital Forensics",
            "Secure Software Design",
            "Cyber Law and Policy",
            "Penetration Testing",
            "Incident Response",
            "Cloud Security",
            "Advanced Network Defense",
        ],
        professors: ["Dr. Patel", "Dr. Moreau", "Prof. Adeyemi"],
        building: "Rhodes",
        scenario: "You are on IR duty. SOC triaged a suspicious login from an overseas IP. Draft first 3 steps and containment actions.",
    },
    DemoProgram {
        name: "Accounting (BBA)",
        prefix: "ACC",
        description: "Financial reporting, auditing, taxation, and managerial accounting.",
        total_courses: 42,
        courses: [
            "Financial Accounting I",
            "Managerial Accounting",
            "Auditing Principles",
            "Business Law",
            "Taxation I",
            "Cost Accounting",
            "Accounting Information Systems",
            "Intermediate Accounting",
            "Corporate Finance",
            "Ethics in Accounting",
        ],
        professors: ["Prof. Ellis", "Dr. Hoffman", "Prof. Castillo"],
        building: "Carl H. Lindner Hall",
        scenario: "You must prepare working papers for an internal audit finding. Identify 3 controls and propose remediation.",
    },
    DemoProgram {
        name: "Finance (BBA)",
        prefix: "FIN",
        description: "Investment analysis, corporate finance, financial modeling, and capital markets.",
        total_courses: 40,
        courses: [
            "Principles of Finance",
            "Financial Markets",
            "Corporate Finance",
            "Investment Analysis",
            "Econometrics",
            "Risk Management",
            "Portfolio Theory",
            "Behavioral Finance",
            "International Finance",
            "Financial Modeling",
        ],
        professors: ["Prof. Blake", "Dr. Yamamoto", "Prof. Fischer"],
        building: "Braunstein",
        scenario: "Build a basic DCF for a mid-cap company using conservative assumptions and identify 2 key sensitivities.",
    },
    DemoProgram {
        name: "Mechanical Engineering (BSE)",
        prefix: "ME",
        description: "Design, thermodynamics, materials, manufacturing systems, and robotics.",
        total_courses: 45,
        courses: [
            "Statics",
            "Dynamics",
            "Thermodynamics I",
            "Fluid Mechanics",
            "Materials Science",
            "Mechanical Design",
            "Manufacturing Processes",
            "Heat Transfer",
            "Control Systems",
            "Capstone Design Project",
        ],
        professors: ["Dr. Romero", "Dr. Kowalski", "Prof. Abara"],
        building: "Rhodes",
        scenario: "Design a heatsink for a 50W module with ambient 25°C. Outline material choice and fin geometry tradeoffs.",
    },
];

/// Counts of what a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub students: usize,
    pub curriculums: usize,
    pub courses: usize,
    pub sections: usize,
}

/// Returns the hex encoded SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Inserts rows inside an open transaction, see [`AdvisorDb::write_fixtures`]
pub struct FixtureWriter<'c> {
    conn: &'c Connection,
}

impl<'c> FixtureWriter<'c> {
    /// Inserts a user with the demo password
    pub fn insert_user(
        &self,
        username: &str,
        email: &str,
        m_number: Option<&str>,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO users (username, email, password, m_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                username,
                email,
                hash_password(DEMO_PASSWORD),
                m_number,
                Utc::now()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_curriculum(
        &self,
        name: &str,
        description: Option<&str>,
        total_courses: u32,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO curriculums (name, description, total_courses) VALUES (?1, ?2, ?3)",
            params![name, description, total_courses],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_progress(
        &self,
        student_id: i64,
        curriculum_id: i64,
        courses_completed: u32,
        gpa: Option<f64>,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_progress (student_id, curriculum_id, courses_completed, gpa)
             VALUES (?1, ?2, ?3, ?4)",
            params![student_id, curriculum_id, courses_completed, gpa],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_student_course(
        &self,
        student_id: i64,
        curriculum_id: i64,
        course_name: &str,
        status: CourseStatus,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_courses (student_id, curriculum_id, course_name, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![student_id, curriculum_id, course_name, status.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_profile(&self, student_id: i64, profile: &DbProfile) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_profiles
                (student_id, full_name, phone, year, advisor, hometown, bio)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                student_id,
                profile.full_name,
                profile.phone,
                profile.year,
                profile.advisor,
                profile.hometown,
                profile.bio
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_event(
        &self,
        student_id: i64,
        day: &str,
        time: &str,
        title: &str,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_events (student_id, day, time, title) VALUES (?1, ?2, ?3, ?4)",
            params![student_id, day, time, title],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_scenario(&self, student_id: i64, scenario: Option<&str>) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_scenarios (student_id, scenario) VALUES (?1, ?2)",
            params![student_id, scenario],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_professor(
        &self,
        name: &str,
        email: Option<&str>,
        department: &str,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO professors (name, email, department) VALUES (?1, ?2, ?3)",
            params![name, email, department],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_catalog_course(
        &self,
        curriculum_id: i64,
        code: &str,
        name: &str,
        credits: u32,
        required: bool,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO catalog_courses (curriculum_id, code, name, credits, required)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![curriculum_id, code, name, credits, required],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_section(
        &self,
        course_id: i64,
        professor_id: Option<i64>,
        day: &str,
        time: &str,
        location: &str,
        capacity: i32,
        enrolled: i32,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO class_sections
                (course_id, professor_id, day, time, location, capacity, enrolled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![course_id, professor_id, day, time, location, capacity, enrolled],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_transcript(
        &self,
        student_id: i64,
        course_id: i64,
        grade: Option<&str>,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO student_transcripts (student_id, course_id, grade) VALUES (?1, ?2, ?3)",
            params![student_id, course_id, grade],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn clear_all(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "DELETE FROM student_transcripts;
             DELETE FROM class_sections;
             DELETE FROM catalog_courses;
             DELETE FROM professors;
             DELETE FROM student_scenarios;
             DELETE FROM student_events;
             DELETE FROM student_courses;
             DELETE FROM student_profiles;
             DELETE FROM student_progress;
             DELETE FROM curriculums;
             DELETE FROM users;",
        )?;
        Ok(())
    }
}

impl AdvisorDb {
    /// Runs `f` inside a single transaction, committing only if it succeeds
    pub fn write_fixtures<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&FixtureWriter<'_>) -> Result<T, DbError>,
    {
        let mut db = self.conn()?;
        let tx = db.transaction()?;
        let result = f(&FixtureWriter { conn: &tx })?;
        tx.commit()?;
        Ok(result)
    }

    /// Wipes every table and loads the demo students, curriculums and class sections
    pub fn seed_demo_data(&self) -> Result<SeedSummary, DbError> {
        let summary = self.write_fixtures(|w| {
            w.clear_all()?;

            let mut rng = rand::thread_rng();
            let mut summary = SeedSummary::default();

            for student in &STUDENTS {
                let program = &PROGRAMS[student.program];
                let email = format!("{}@example.com", student.username);
                let student_id =
                    w.insert_user(student.username, &email, Some(student.m_number))?;
                summary.students += 1;

                let curriculum_id = w.insert_curriculum(
                    program.name,
                    Some(program.description),
                    program.total_courses,
                )?;
                summary.curriculums += 1;

                // 30-70% of the listed courses, varied per student
                let listed = program.courses.len() as i64;
                let completed = (3 + student_id % 5).min(listed - 1) as usize;
                let gpa = (rng.gen_range(2.8..=4.0_f64) * 100.0).round() / 100.0;
                w.insert_progress(student_id, curriculum_id, completed as u32, Some(gpa))?;

                w.insert_profile(
                    student_id,
                    &DbProfile {
                        full_name: Some(student.full_name.to_string()),
                        phone: Some(student.phone.to_string()),
                        year: Some(student.year.to_string()),
                        advisor: Some(student.advisor.to_string()),
                        hometown: Some(student.hometown.to_string()),
                        bio: Some(student.bio.to_string()),
                    },
                )?;

                let lead_word = program.name.split(' ').next().unwrap_or(program.prefix);
                let lecture = format!("{} 101", lead_word);
                for (day, time, title) in [
                    ("Monday", "10:00 – 11:15", lecture.as_str()),
                    ("Tuesday", "16:00 – 17:00", "CatAssist Standup"),
                    ("Wednesday", "10:00 – 11:15", lecture.as_str()),
                    ("Thursday", "23:59", "Weekly Quiz (online)"),
                    ("Friday", "16:00", "Draft Submission"),
                ] {
                    w.insert_event(student_id, day, time, title)?;
                }
                w.insert_scenario(student_id, Some(program.scenario))?;

                let mut professor_ids = Vec::with_capacity(program.professors.len());
                for name in program.professors {
                    let handle = name
                        .rsplit(' ')
                        .next()
                        .unwrap_or(name)
                        .to_lowercase();
                    let email = format!("{}@example.edu", handle);
                    professor_ids.push(w.insert_professor(name, Some(email.as_str()), program.prefix)?);
                }

                for (i, course_name) in program.courses.iter().enumerate() {
                    let status = if i + 2 < completed {
                        CourseStatus::Completed
                    } else if i < completed {
                        CourseStatus::InProgress
                    } else {
                        CourseStatus::Pending
                    };
                    w.insert_student_course(student_id, curriculum_id, course_name, status)?;

                    let code = format!("{}{}", program.prefix, 101 + i);
                    let credits = if i % 4 == 3 { 4 } else { 3 };
                    let course_id = w.insert_catalog_course(
                        curriculum_id,
                        &code,
                        course_name,
                        credits,
                        i < CATALOG_REQUIRED,
                    )?;
                    summary.courses += 1;

                    let section_count = if i % 3 == 0 { 3 } else { 2 };
                    for k in 0..section_count {
                        let (day, time) = SLOTS[(i * 2 + k * 3) % SLOTS.len()];
                        let capacity = if k == 0 { 30 } else { 25 };
                        let enrolled = if (i + k) % 4 == 1 {
                            capacity
                        } else {
                            ((i * 7 + k * 5) % 20) as i32
                        };
                        let room = format!("{} {}", program.building, 100 + i * 10 + k);
                        let professor = professor_ids.get((i + k) % professor_ids.len()).copied();
                        w.insert_section(course_id, professor, day, time, &room, capacity, enrolled)?;
                        summary.sections += 1;
                    }

                    if status == CourseStatus::Completed {
                        w.insert_transcript(student_id, course_id, Some(GRADES[i % GRADES.len()]))?;
                    }
                }
            }

            Ok(summary)
        })?;

        info!(
            students = summary.students,
            curriculums = summary.curriculums,
            courses = summary.courses,
            sections = summary.sections,
            "Seeded demo data"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::build_plan;

    #[test]
    fn test_seed_demo_data() {
        let db = AdvisorDb::open_in_memory().unwrap();

        let summary = db.seed_demo_data().unwrap();

        assert_eq!(summary.students, 5);
        assert_eq!(summary.curriculums, 5);
        assert_eq!(summary.courses, 50);
        assert!(summary.sections >= 100 && summary.sections <= 150);
        assert!(db.has_students().unwrap());
    }

    #[test]
    fn test_seed_is_repeatable() {
        let db = AdvisorDb::open_in_memory().unwrap();

        let first = db.seed_demo_data().unwrap();
        let second = db.seed_demo_data().unwrap();

        assert_eq!(first, second);
        assert!(db.resolve_student("M10000005").unwrap().is_some());
    }

    #[test]
    fn test_seeded_student_has_a_plan() {
        let db = AdvisorDb::open_in_memory().unwrap();
        db.seed_demo_data().unwrap();

        let alice = db.resolve_student("alice@example.com").unwrap().unwrap();
        let program = db.program_for(alice.id).unwrap().unwrap();
        let inputs = db
            .load_planning_inputs(alice.id, program.curriculum_id)
            .unwrap();

        assert_eq!(inputs.catalog.iter().filter(|c| c.required).count(), 6);
        assert!(inputs.sections.iter().any(|s| s.seats_left == 0));

        let plan = build_plan(
            15,
            &inputs.catalog,
            &inputs.completed,
            &inputs.sections_by_course,
        );
        assert!(!plan.is_empty());
        assert!(plan.sections.iter().all(|s| !inputs.completed.contains(&s.course_id)));
    }

    #[test]
    fn test_seeded_progress_and_gpa() {
        let db = AdvisorDb::open_in_memory().unwrap();
        db.seed_demo_data().unwrap();

        for identifier in ["alice", "bob", "charlie", "diana", "eric"] {
            let user = db.resolve_student(identifier).unwrap().unwrap();
            let progress = db.progress_for(user.id).unwrap().unwrap();
            assert!((3..=7).contains(&progress.courses_completed));

            let gpa = progress.gpa.unwrap();
            assert!((2.8..=4.0).contains(&gpa));

            assert_eq!(db.student_courses(user.id).unwrap().len(), 10);
            assert_eq!(db.events_for(user.id).unwrap()[0].day, "Monday");
            assert!(db.scenario_for(user.id).unwrap().is_some());
        }
    }

    #[test]
    fn test_hash_password() {
        let hashed = hash_password(DEMO_PASSWORD);
        assert_eq!(hashed.len(), 64);
        assert_ne!(hashed, hash_password("other"));
    }
}
