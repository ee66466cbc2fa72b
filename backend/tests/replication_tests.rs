//! Replication fan-out across equivalent curricula.

mod support;

use std::sync::Arc;

use academic_scheduler::models::{
    AssignmentFilter, AssignmentPatch, CourseLinkId, InstructorId, SeriesId, Weekday,
};

use support::{
    assignment, engine_over, equivalence, monday, seeded_repo, FIS_CIVIL_2023,
    FIS_INFORMATICS, QUI_CIVIL_2018, TERM,
};

#[tokio::test]
async fn test_no_equivalences_is_an_empty_success() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);

    let base = assignment(QUI_CIVIL_2018, 5, 10, Weekday::Monday, "08:00", "10:00");
    let result = engine.replicate(&base).await.unwrap();
    assert!(result.succeeded);
    assert_eq!(result.created_count, 0);
    assert_eq!(result.failed_count, 0);
    assert!(result.details.is_empty());
}

#[tokio::test]
async fn test_replica_of_committed_base_in_same_slot_is_rejected() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 2));
    repo.add_equivalence(equivalence("FIS-100", 3));
    let engine = engine_over(&repo);

    let base = engine
        .create(monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();

    let result = engine.replicate(&base).await.unwrap();
    assert!(!result.succeeded);
    assert_eq!(result.created_count, 0);
    assert_eq!(result.failed_count, 2);
    assert!(result.details.iter().all(|d| d
        .error
        .as_deref()
        .unwrap()
        .starts_with("instructor-conflict")));

    // Instructor 5 still teaches exactly one Monday class.
    let monday_rows = engine
        .list_assignments(&AssignmentFilter {
            instructor_id: Some(InstructorId(5)),
            day: Some(Weekday::Monday),
            ..AssignmentFilter::for_term(TERM)
        })
        .await
        .unwrap();
    assert_eq!(monday_rows.len(), 1);
    assert_eq!(repo.conflict_log_entries().len(), 2);
}

#[tokio::test]
async fn test_series_update_works_after_rejected_replication() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 2));
    let engine = engine_over(&repo);

    let base = engine
        .create(monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(engine.replicate(&base).await.unwrap().created_count, 0);

    let patch = AssignmentPatch {
        start_time: Some("09:00".parse().unwrap()),
        end_time: Some("11:00".parse().unwrap()),
        ..Default::default()
    };
    let moved = engine
        .update(base.id.unwrap(), &patch, true)
        .await
        .unwrap()
        .committed()
        .expect("the series has no same-slot sibling to collide with");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].start_time.to_string(), "09:00");
}

#[tokio::test]
async fn test_replica_of_uncommitted_base_carries_its_series() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 2));
    let engine = engine_over(&repo);

    let series = SeriesId::generate();
    let mut base = monday(5, 10, "08:00", "10:00");
    base.series_id = Some(series);
    let result = engine.replicate(&base).await.unwrap();
    assert!(result.succeeded);
    assert_eq!(result.created_count, 1);

    let family = engine
        .list_assignments(&AssignmentFilter {
            series_id: Some(series),
            ..AssignmentFilter::for_term(TERM)
        })
        .await
        .unwrap();
    assert_eq!(family.len(), 1);
    assert_eq!(family[0].course_link_id, FIS_CIVIL_2023);
}

#[tokio::test]
async fn test_uncommitted_base_without_series_gets_a_fresh_one() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 3));
    let engine = engine_over(&repo);

    let result = engine.replicate(&monday(5, 10, "08:00", "10:00")).await.unwrap();
    assert_eq!(result.created_count, 1);

    let rows = engine
        .list_assignments(&AssignmentFilter::for_term(TERM))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].course_link_id, FIS_INFORMATICS);
    assert!(rows[0].series_id.is_some());
}

#[tokio::test]
async fn test_targets_are_reported_in_lookup_order() {
    let repo = Arc::new(seeded_repo());
    // Curriculum 3 first, then a curriculum with no FIS-100 link, then curriculum 2.
    repo.add_equivalence(equivalence("FIS-100", 3));
    repo.add_equivalence(equivalence("FIS-100", 4));
    repo.add_equivalence(equivalence("FIS-100", 2));
    let engine = engine_over(&repo);

    let result = engine.replicate(&monday(5, 10, "08:00", "10:00")).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.created_count, 1);
    assert_eq!(result.failed_count, 2);
    let order: Vec<(&str, bool)> = result
        .details
        .iter()
        .map(|d| (d.curriculum_name.as_str(), d.success))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Informatics 2020", true),
            ("Mining 2019", false),
            ("Civil 2023", false),
        ]
    );
    let missing = result.details[1].error.as_deref().unwrap();
    assert!(missing.contains("no equivalent course"), "{}", missing);
    // The Informatics replica now holds instructor 5 on Monday morning.
    let clash = result.details[2].error.as_deref().unwrap();
    assert!(clash.starts_with("instructor-conflict"), "{}", clash);
}

#[tokio::test]
async fn test_conflicting_target_fails_without_stopping_the_loop() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 2));
    repo.add_equivalence(equivalence("FIS-100", 3));
    let engine = engine_over(&repo);

    // Cohort of Civil 2023 is already busy on Monday morning.
    engine
        .create(assignment(FIS_CIVIL_2023, 8, 40, Weekday::Monday, "09:00", "11:00"))
        .await
        .unwrap();

    let result = engine.replicate(&monday(5, 10, "08:00", "10:00")).await.unwrap();
    assert_eq!(result.created_count, 1);
    assert_eq!(result.failed_count, 1);
    assert!(!result.details[0].success);
    assert!(result.details[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("parallel-conflict"));
    assert!(result.details[1].success);
    assert_eq!(result.details[1].program_name, "Informatics");

    // The rejected replica went through the normal create path.
    assert_eq!(repo.conflict_log_entries().len(), 1);
}

#[tokio::test]
async fn test_base_curriculum_target_is_attempted() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 1));
    repo.add_equivalence(equivalence("FIS-100", 2));
    let engine = engine_over(&repo);

    let base = engine
        .create(monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap()
        .committed()
        .unwrap();

    let result = engine.replicate(&base).await.unwrap();
    let names: Vec<&str> = result
        .details
        .iter()
        .map(|d| d.curriculum_name.as_str())
        .collect();
    assert_eq!(names, vec!["Civil 2018", "Civil 2023"]);
    assert_eq!(result.failed_count, 2);
    assert!(result.details[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("instructor-conflict"));
    assert_eq!(repo.assignment_count(), 1);
}

#[tokio::test]
async fn test_unknown_base_link_is_a_hard_failure() {
    let repo = Arc::new(seeded_repo());
    let engine = engine_over(&repo);

    let base = assignment(CourseLinkId(999), 5, 10, Weekday::Monday, "08:00", "10:00");
    assert!(engine.replicate(&base).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_store_outage_during_lookup_propagates() {
    let repo = Arc::new(seeded_repo());
    repo.add_equivalence(equivalence("FIS-100", 2));
    let engine = engine_over(&repo);
    repo.set_healthy(false);

    let err = engine
        .replicate(&monday(5, 10, "08:00", "10:00"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "store-error");
}
