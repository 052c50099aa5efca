//! Integration tests for the scorecard engine: scoring rules over real
//! project rows, snapshot persistence and the history throttle.

use chrono::{Duration, TimeZone, Utc};
use startupcopilot_core::db::repositories::project_repository::ProjectRepository;
use startupcopilot_core::db::repositories::scorecard_repository::ScorecardRepository;
use startupcopilot_core::db::DbPool;
use startupcopilot_core::models::project::{
    BmcData, ProjectInsert, Stage, StageProgress, StageStatus,
};
use startupcopilot_core::models::scorecard::Criterion;
use startupcopilot_core::services::scorecard_service::ScorecardService;
use tempfile::{tempdir, TempDir};

fn setup() -> (DbPool, ScorecardService, String, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("create db pool");

    let project_id = pool
        .with_connection(|conn| {
            let project = ProjectRepository::insert(
                conn,
                &ProjectInsert {
                    owner_id: "user-1".to_string(),
                    name: "Сервис доставки".to_string(),
                    stage: Stage::BusinessModel,
                },
            )?;
            Ok(project.id)
        })
        .expect("seed project");

    (pool.clone(), ScorecardService::new(pool), project_id, dir)
}

fn full_bmc() -> BmcData {
    BmcData {
        key_partners: vec!["Рестораны".to_string()],
        key_activities: vec!["Логистика".to_string()],
        key_resources: vec!["Курьеры".to_string()],
        value_propositions: vec!["Доставка за 15 минут".to_string()],
        customer_relationships: vec!["Приложение".to_string()],
        channels: vec!["App Store".to_string()],
        customer_segments: vec!["Офисные сотрудники".to_string()],
        cost_structure: vec!["Зарплата курьеров".to_string()],
        revenue_streams: vec!["Комиссия".to_string()],
    }
}

#[test]
fn business_model_project_scores_per_rule_table() {
    let (pool, service, project_id, _dir) = setup();

    pool.with_connection(|conn| {
        let mut project = ProjectRepository::find_by_id(conn, &project_id)?.unwrap();
        project.bmc = full_bmc();
        *project.progress.stage_mut(Stage::BusinessModel) = StageProgress {
            status: StageStatus::InProgress,
            completed_items: vec!["fill_bmc".to_string(), "unit_economics".to_string()],
        };
        ProjectRepository::save_bmc(conn, &project_id, &project.bmc)?;
        ProjectRepository::save_progress(conn, &project_id, &project.progress)
    })
    .expect("fill project");

    let scorecard = service
        .refresh_scorecard(&project_id)
        .expect("refresh")
        .expect("project exists");

    assert_eq!(scorecard.score_of(Criterion::Bmc), Some(100));
    assert_eq!(scorecard.score_of(Criterion::Vpc), Some(0));
    assert_eq!(scorecard.score_of(Criterion::UnitEconomics), Some(40));
    assert_eq!(scorecard.score_of(Criterion::ProblemClarity), Some(0));
    assert_eq!(scorecard.total, 14);

    // the snapshot is readable from the project row without recomputation
    let latest = service
        .latest_scorecard(&project_id)
        .expect("read latest")
        .expect("snapshot stored");
    assert_eq!(latest.total, scorecard.total);
}

#[test]
fn artifacts_raise_presence_criteria() {
    let (pool, service, project_id, _dir) = setup();

    pool.with_connection(|conn| {
        let mut project = ProjectRepository::find_by_id(conn, &project_id)?.unwrap();
        project.artifacts.problem = Some("Обед в офис едет час".to_string());
        project.artifacts.problem_evidence = Some("Опрос 80 сотрудников".to_string());
        project.artifacts.target_audience = Some("Офисные работники центра".to_string());
        ProjectRepository::save_artifacts(conn, &project_id, &project.artifacts)
    })
    .expect("save artifacts");

    let scorecard = service
        .refresh_scorecard(&project_id)
        .expect("refresh")
        .expect("project exists");

    assert_eq!(scorecard.score_of(Criterion::ProblemClarity), Some(70));
    assert_eq!(scorecard.score_of(Criterion::TargetAudience), Some(50));
}

#[test]
fn history_rows_respect_the_hourly_throttle() {
    let (pool, service, project_id, _dir) = setup();

    let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
    for offset_minutes in [0, 5, 30, 59] {
        service
            .refresh_scorecard_at(&project_id, t0 + Duration::minutes(offset_minutes))
            .expect("refresh");
    }

    let count = pool
        .with_connection(|conn| ScorecardRepository::count_for_project(conn, &project_id))
        .expect("count history");
    assert_eq!(count, 1);

    service
        .refresh_scorecard_at(&project_id, t0 + Duration::minutes(61))
        .expect("refresh past window");
    let count = pool
        .with_connection(|conn| ScorecardRepository::count_for_project(conn, &project_id))
        .expect("count history");
    assert_eq!(count, 2);
}

#[test]
fn missing_project_is_not_an_error() {
    let (_pool, service, _project_id, _dir) = setup();

    let result = service.refresh_scorecard("missing").expect("no error");
    assert!(result.is_none());
}
