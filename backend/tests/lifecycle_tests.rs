//! Create / update / delete through the engine against the in-memory store.

mod support;

use std::sync::Arc;

use academic_scheduler::db::repository::{AssignmentRepository, RepositoryError};
use academic_scheduler::models::{
    AssignmentFilter, AssignmentPatch, ConflictKind, RoomId, SeriesId, Weekday,
};
use academic_scheduler::services::{EngineConfig, SchedulingEngine};

use support::{assignment, engine_over, monday, seeded_repo, FIS_CIVIL_2018, MAT_CIVIL_2018, TERM};

#[tokio::test]
async fn test_create_scenario_instructor_room_and_boundary() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);

    let a = engine
        .create(monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .expect("A commits");
    let a_id = a.id.unwrap();

    let b = engine.create(monday(5, 11, "09:00", "11:00")).await.unwrap();
    let conflict = b.rejection().expect("B is rejected");
    assert_eq!(conflict.kind, ConflictKind::Instructor);
    assert_eq!(conflict.conflicting_ids(), vec![a_id]);

    let c = engine.create(monday(6, 10, "09:30", "10:30")).await.unwrap();
    assert_eq!(c.rejection().unwrap().kind, ConflictKind::Room);

    // 10:00 end vs 10:00 start touches without overlapping.
    let d = engine.create(monday(6, 11, "10:00", "12:00")).await.unwrap();
    assert!(d.is_committed());

    assert_eq!(repo.assignment_count(), 2);
    let log = repo.conflict_log_entries();
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|e| e.assignment_id.is_none() && !e.resolved));
}

#[tokio::test]
async fn test_room_and_instructor_checks_are_independent() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    engine.create(monday(5, 10, "08:00", "10:00")).await.unwrap();

    // Same instructor and time, different room, different cohort.
    let candidate = assignment(MAT_CIVIL_2018, 5, 12, Weekday::Monday, "08:00", "10:00");
    let result = engine.validate(&candidate, None).await.unwrap();
    assert!(!result.valid);
    assert!(result.has_kind(ConflictKind::Instructor));
    assert!(!result.has_kind(ConflictKind::Room));
    assert!(!result.has_kind(ConflictKind::ParallelGroup));
}

#[tokio::test]
async fn test_validate_only_does_not_write() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    engine.create(monday(5, 10, "08:00", "10:00")).await.unwrap();

    let result = engine
        .validate(&monday(5, 10, "09:00", "11:00"), None)
        .await
        .unwrap();
    assert_eq!(result.conflicts.len(), 3);
    assert_eq!(repo.assignment_count(), 1);
    assert!(repo.conflict_log_entries().is_empty());
}

#[tokio::test]
async fn test_notes_only_update_validates_against_itself() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    let stored = engine
        .create(monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();

    let patch = AssignmentPatch {
        notes: Some(Some("lab in week 3".to_string())),
        ..Default::default()
    };
    let updated = engine
        .update(stored.id.unwrap(), &patch, false)
        .await
        .unwrap()
        .committed()
        .expect("notes-only update commits");
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].notes.as_deref(), Some("lab in week 3"));
    assert!(repo.conflict_log_entries().is_empty());
}

#[tokio::test]
async fn test_update_clears_optional_field() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    let mut candidate = monday(5, 10, "08:00", "10:00");
    candidate.modality = Some("online".to_string());
    let stored = engine.create(candidate).await.unwrap().committed().unwrap();

    let patch: AssignmentPatch = serde_json::from_str(r#"{ "modality": null }"#).unwrap();
    let updated = engine
        .update(stored.id.unwrap(), &patch, false)
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(updated[0].modality, None);
}

#[tokio::test]
async fn test_rejected_update_is_logged_with_origin() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    engine.create(monday(5, 10, "08:00", "10:00")).await.unwrap();
    let other = engine
        .create(assignment(MAT_CIVIL_2018, 7, 20, Weekday::Monday, "12:00", "14:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();
    let other_id = other.id.unwrap();

    let patch = AssignmentPatch {
        room_id: Some(RoomId(10)),
        start_time: Some("09:00".parse().unwrap()),
        end_time: Some("11:00".parse().unwrap()),
        ..Default::default()
    };
    let outcome = engine.update(other_id, &patch, false).await.unwrap();
    assert_eq!(outcome.rejection().unwrap().kind, ConflictKind::Room);

    let log = repo.conflict_log_entries();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].assignment_id, Some(other_id));
    assert_eq!(log[0].kind, ConflictKind::Room);

    let unchanged = repo.get_assignment(other_id).await.unwrap();
    assert_eq!(unchanged.room_id, RoomId(20));
}

#[tokio::test]
async fn test_update_series_broadcasts_patch_without_revalidating_siblings() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    let series = SeriesId::generate();

    let mut ids = Vec::new();
    for day in [Weekday::Monday, Weekday::Wednesday, Weekday::Friday] {
        let mut row = assignment(FIS_CIVIL_2018, 5, 10, day, "08:00", "10:00");
        row.series_id = Some(series);
        ids.push(engine.create(row).await.unwrap().committed().unwrap().id.unwrap());
    }
    // Occupies room 30 on Wednesday; the Wednesday sibling will be moved onto it.
    engine
        .create(assignment(MAT_CIVIL_2018, 9, 30, Weekday::Wednesday, "08:00", "10:00"))
        .await
        .unwrap();

    let patch = AssignmentPatch {
        room_id: Some(RoomId(30)),
        ..Default::default()
    };
    let updated = engine
        .update(ids[0], &patch, true)
        .await
        .unwrap()
        .committed()
        .expect("only the Monday row is validated");
    assert_eq!(updated.len(), 3);
    assert!(updated.iter().all(|a| a.room_id == RoomId(30)));

    let single = engine
        .update(ids[2], &AssignmentPatch { room_id: Some(RoomId(31)), ..Default::default() }, false)
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(repo.get_assignment(ids[1]).await.unwrap().room_id, RoomId(30));
}

#[tokio::test]
async fn test_delete_series_and_single() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    let series = SeriesId::generate();

    let mut in_series = Vec::new();
    for day in [Weekday::Monday, Weekday::Tuesday, Weekday::Thursday] {
        let mut row = assignment(FIS_CIVIL_2018, 5, 10, day, "08:00", "10:00");
        row.series_id = Some(series);
        in_series.push(engine.create(row).await.unwrap().committed().unwrap());
    }
    let outsider = engine
        .create(assignment(MAT_CIVIL_2018, 5, 10, Weekday::Friday, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();

    let single = engine.delete(in_series[0].id.unwrap(), false).await.unwrap();
    assert_eq!(single.deleted_count, 1);

    let rest = engine.delete(in_series[1].id.unwrap(), true).await.unwrap();
    assert_eq!(rest.deleted_count, 2);

    let remaining = engine
        .list_assignments(&AssignmentFilter::for_term(TERM))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, outsider.id);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    let missing = academic_scheduler::models::AssignmentId(404);

    let err = engine
        .update(missing, &AssignmentPatch::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert!(engine.delete(missing, true).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_malformed_candidate_is_rejected_before_validation() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);

    let inverted = monday(5, 10, "10:00", "08:00");
    let err = engine.create(inverted.clone()).await.unwrap_err();
    assert_eq!(err.kind(), "invalid-input");
    assert_eq!(engine.validate(&inverted, None).await.unwrap_err().kind(), "invalid-input");

    let mut no_term = monday(5, 10, "08:00", "10:00");
    no_term.term = "  ".to_string();
    assert!(engine.create(no_term).await.is_err());
    assert_eq!(repo.assignment_count(), 0);
}

#[tokio::test]
async fn test_list_assignments_filters_and_orders() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);
    engine
        .create(assignment(FIS_CIVIL_2018, 5, 10, Weekday::Wednesday, "08:00", "10:00"))
        .await
        .unwrap();
    engine
        .create(assignment(FIS_CIVIL_2018, 5, 10, Weekday::Monday, "14:00", "16:00"))
        .await
        .unwrap();
    engine
        .create(assignment(FIS_CIVIL_2018, 5, 10, Weekday::Monday, "08:00", "10:00"))
        .await
        .unwrap();
    engine
        .create(assignment(MAT_CIVIL_2018, 6, 11, Weekday::Monday, "10:00", "12:00"))
        .await
        .unwrap();

    let filter = AssignmentFilter {
        instructor_id: Some(academic_scheduler::models::InstructorId(5)),
        ..AssignmentFilter::for_term(TERM)
    };
    let rows = engine.list_assignments(&filter).await.unwrap();
    let slots: Vec<String> = rows.iter().map(|a| a.slot().to_string()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].day, Weekday::Monday);
    assert_eq!(rows[0].start_time.to_string(), "08:00");
    assert_eq!(rows[1].start_time.to_string(), "14:00");
    assert_eq!(rows[2].day, Weekday::Wednesday, "{:?}", slots);

    let by_semester = AssignmentFilter {
        semester: Some(2),
        ..AssignmentFilter::for_term(TERM)
    };
    assert_eq!(engine.list_assignments(&by_semester).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_serialized_engine_rejects_concurrent_double_booking() {
    let repo = Arc::new(seeded_repo());
    let engine = Arc::new(SchedulingEngine::new(
        repo.clone(),
        EngineConfig {
            serialize_writes: true,
        },
    ));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .create(monday(5, 10 + i, "08:00", "10:00"))
                    .await
                    .unwrap()
                    .is_committed()
            })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            committed += 1;
        }
    }
    assert_eq!(committed, 1);
    assert_eq!(repo.assignment_count(), 1);
}

#[tokio::test]
async fn test_open_gate_lets_interleaved_creates_double_book() {
    let repo = Arc::new(seeded_repo());
    repo.set_yield_after_reads(true);
    let engine = engine_over(&repo);
    assert!(!engine.config().serialize_writes);

    // Both writers validate against the same empty Monday before either commits.
    let (first, second) = tokio::join!(
        engine.create(monday(5, 10, "08:00", "10:00")),
        engine.create(monday(5, 10, "08:00", "10:00")),
    );
    assert!(first.unwrap().is_committed());
    assert!(second.unwrap().is_committed());
    assert_eq!(repo.assignment_count(), 2);
    assert!(repo.conflict_log_entries().is_empty());
}

#[tokio::test]
async fn test_serialized_gate_closes_the_interleaving() {
    let repo = Arc::new(seeded_repo());
    repo.set_yield_after_reads(true);
    let engine = SchedulingEngine::new(
        repo.clone(),
        EngineConfig {
            serialize_writes: true,
        },
    );

    let (first, second) = tokio::join!(
        engine.create(monday(5, 10, "08:00", "10:00")),
        engine.create(monday(5, 10, "08:00", "10:00")),
    );
    let committed = [first.unwrap(), second.unwrap()]
        .iter()
        .filter(|outcome| outcome.is_committed())
        .count();
    assert_eq!(committed, 1);
    assert_eq!(repo.assignment_count(), 1);
}
