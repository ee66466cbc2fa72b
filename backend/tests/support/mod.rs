#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use academic_scheduler::db::LocalRepository;
use academic_scheduler::models::{
    Assignment, CourseLink, CourseLinkId, CurriculumId, Equivalence, InstructorId, ProgramId,
    RoomId, Weekday,
};
use academic_scheduler::services::{EngineConfig, SchedulingEngine};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Seeded catalogue
// =============================================================================
//
// Curricula: 1 "Civil 2018", 2 "Civil 2023" (program 1, Civil Engineering),
// 3 "Informatics 2020" (program 2, Informatics), 4 "Mining 2019" (program 3,
// no course links at all).
//
// Course links:
//   1: FIS-100 sem 1 in curriculum 1    (2-6 weekly hours)
//   2: FIS-100 sem 1 in curriculum 2
//   3: FIS-100 sem 1 in curriculum 3
//   4: MAT-200 sem 2 in curriculum 1
//   5: QUI-150 sem 1 in curriculum 1    (no equivalences)

pub const TERM: &str = "2025-1";

pub const FIS_CIVIL_2018: CourseLinkId = CourseLinkId(1);
pub const FIS_CIVIL_2023: CourseLinkId = CourseLinkId(2);
pub const FIS_INFORMATICS: CourseLinkId = CourseLinkId(3);
pub const MAT_CIVIL_2018: CourseLinkId = CourseLinkId(4);
pub const QUI_CIVIL_2018: CourseLinkId = CourseLinkId(5);

fn curriculum(id: i64) -> (&'static str, i64, &'static str) {
    match id {
        1 => ("Civil 2018", 1, "Civil Engineering"),
        2 => ("Civil 2023", 1, "Civil Engineering"),
        3 => ("Informatics 2020", 2, "Informatics"),
        _ => ("Mining 2019", 3, "Mining Engineering"),
    }
}

pub fn link(id: i64, curriculum_id: i64, code: &str, semester: i32) -> CourseLink {
    let (curriculum_name, program_id, program_name) = curriculum(curriculum_id);
    CourseLink {
        id: CourseLinkId(id),
        course_code: code.to_string(),
        semester,
        curriculum_id: CurriculumId(curriculum_id),
        curriculum_name: curriculum_name.to_string(),
        program_id: ProgramId(program_id),
        program_name: program_name.to_string(),
    }
}

pub fn equivalence(code: &str, curriculum_id: i64) -> Equivalence {
    let (curriculum_name, _, program_name) = curriculum(curriculum_id);
    Equivalence {
        course_code: code.to_string(),
        curriculum_id: CurriculumId(curriculum_id),
        curriculum_name: curriculum_name.to_string(),
        program_name: program_name.to_string(),
    }
}

/// Course links only; no equivalences declared.
pub fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.add_course_link(link(1, 1, "FIS-100", 1), 2.0, 6.0);
    repo.add_course_link(link(2, 2, "FIS-100", 1), 2.0, 6.0);
    repo.add_course_link(link(3, 3, "FIS-100", 1), 2.0, 6.0);
    repo.add_course_link(link(4, 1, "MAT-200", 2), 4.0, 8.0);
    repo.add_course_link(link(5, 1, "QUI-150", 1), 2.0, 4.0);
    repo
}

pub fn engine_over(repo: &Arc<LocalRepository>) -> SchedulingEngine {
    SchedulingEngine::new(repo.clone(), EngineConfig::default())
}

pub fn assignment(
    course_link_id: CourseLinkId,
    instructor: i64,
    room: i64,
    day: Weekday,
    start: &str,
    end: &str,
) -> Assignment {
    Assignment {
        id: None,
        course_link_id,
        instructor_id: InstructorId(instructor),
        room_id: RoomId(room),
        day,
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        parallel: 1,
        term: TERM.to_string(),
        series_id: None,
        class_type: None,
        modality: None,
        notes: None,
    }
}

/// Monday slot on the Civil 2018 physics section.
pub fn monday(instructor: i64, room: i64, start: &str, end: &str) -> Assignment {
    assignment(FIS_CIVIL_2018, instructor, room, Weekday::Monday, start, end)
}
