//! Integration tests for the dashboard aggregation: independent sections
//! with per-section failure isolation.

use chrono::{TimeZone, Utc};
use startupcopilot_core::actions::{dashboard, AppState};
use startupcopilot_core::db::repositories::profile_repository::ProfileRepository;
use startupcopilot_core::db::repositories::project_repository::ProjectRepository;
use startupcopilot_core::db::DbPool;
use startupcopilot_core::models::profile::ProfileInsert;
use startupcopilot_core::models::project::{ProjectInsert, Stage};
use tempfile::{tempdir, TempDir};

fn setup() -> (DbPool, AppState, String, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("create db pool");

    let project_id = pool
        .with_connection(|conn| {
            ProfileRepository::ensure(
                conn,
                &ProfileInsert {
                    user_id: "user-1".to_string(),
                    display_name: "Коля".to_string(),
                    timezone: Some("UTC".to_string()),
                },
            )?;
            let project = ProjectRepository::insert(
                conn,
                &ProjectInsert {
                    owner_id: "user-1".to_string(),
                    name: "Умная теплица".to_string(),
                    stage: Stage::Idea,
                },
            )?;
            Ok(project.id)
        })
        .expect("seed");

    let state = AppState::new(pool.clone()).expect("build app state");
    (pool, state, project_id, dir)
}

#[test]
fn all_sections_render_for_a_healthy_project() {
    let (_pool, state, project_id, _dir) = setup();

    // Monday, so the weekly report section is eligible
    let monday = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
    let view = state
        .dashboard()
        .fetch_dashboard_at("user-1", &project_id, monday);

    assert!(view.quest.is_some());
    assert!(view.streak.is_some());
    assert!(view.scorecard.is_some());
    assert!(view.weekly_report.is_some());

    let quest = view.quest.unwrap();
    assert_eq!(quest.quest_date, "2025-03-17");
}

#[test]
fn weekly_report_hides_midweek() {
    let (_pool, state, project_id, _dir) = setup();

    let wednesday = Utc.with_ymd_and_hms(2025, 3, 19, 9, 0, 0).unwrap();
    let view = state
        .dashboard()
        .fetch_dashboard_at("user-1", &project_id, wednesday);

    assert!(view.weekly_report.is_none());
    assert!(view.quest.is_some());
    assert!(view.scorecard.is_some());
}

#[test]
fn one_failing_section_does_not_blank_the_rest() {
    let (_pool, state, project_id, _dir) = setup();

    // "ghost" has no profile: the streak and report sections fail, the
    // project-backed sections still render
    let monday = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
    let view = state
        .dashboard()
        .fetch_dashboard_at("ghost", &project_id, monday);

    assert!(view.streak.is_none());
    assert!(view.weekly_report.is_none());
    assert!(view.quest.is_some());
    assert!(view.scorecard.is_some());
}

#[test]
fn missing_project_degrades_to_profile_sections() {
    let (_pool, state, _project_id, _dir) = setup();

    let wednesday = Utc.with_ymd_and_hms(2025, 3, 19, 9, 0, 0).unwrap();
    let view = state
        .dashboard()
        .fetch_dashboard_at("user-1", "missing", wednesday);

    assert!(view.quest.is_none());
    assert!(view.scorecard.is_none());
    assert!(view.streak.is_some());
}

#[test]
fn active_project_is_resolved_for_the_dashboard() {
    let (_pool, state, _project_id, _dir) = setup();

    let view = dashboard::dashboard_fetch_active(&state, "user-1").expect("active project");
    assert!(view.quest.is_some());

    let err = dashboard::dashboard_fetch_active(&state, "ghost").expect_err("no projects");
    assert_eq!(err.code, "NOT_FOUND");
}
