//! Integration tests for the weekly report aggregator: strict
//! previous-week windowing and the generated Russian texts.

use chrono::{TimeZone, Utc};
use startupcopilot_core::db::repositories::lesson_repository::LessonRepository;
use startupcopilot_core::db::repositories::profile_repository::ProfileRepository;
use startupcopilot_core::db::repositories::project_repository::ProjectRepository;
use startupcopilot_core::db::repositories::quest_repository::QuestRepository;
use startupcopilot_core::db::repositories::scorecard_repository::ScorecardRepository;
use startupcopilot_core::db::repositories::xp_repository::XpRepository;
use startupcopilot_core::db::DbPool;
use startupcopilot_core::models::gamification::XpSource;
use startupcopilot_core::models::lesson::LessonStatus;
use startupcopilot_core::models::profile::ProfileInsert;
use startupcopilot_core::models::project::{ProjectInsert, Stage};
use startupcopilot_core::models::quest::{DailyQuestRecord, QuestKind};
use startupcopilot_core::models::scorecard::Scorecard;
use startupcopilot_core::services::report_service::ReportService;
use tempfile::{tempdir, TempDir};

fn setup() -> (DbPool, ReportService, String, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("create db pool");

    let project_id = pool
        .with_connection(|conn| {
            ProfileRepository::ensure(
                conn,
                &ProfileInsert {
                    user_id: "user-1".to_string(),
                    display_name: "Лена".to_string(),
                    timezone: Some("UTC".to_string()),
                },
            )?;
            let project = ProjectRepository::insert(
                conn,
                &ProjectInsert {
                    owner_id: "user-1".to_string(),
                    name: "Коворкинг для студентов".to_string(),
                    stage: Stage::Validation,
                },
            )?;
            Ok(project.id)
        })
        .expect("seed");

    (pool.clone(), ReportService::new(pool), project_id, dir)
}

fn seed_quest(pool: &DbPool, id: &str, project_id: &str, quest_date: &str, completed: bool) {
    pool.with_connection(|conn| {
        QuestRepository::insert(
            conn,
            &DailyQuestRecord {
                id: id.to_string(),
                user_id: "user-1".to_string(),
                project_id: project_id.to_string(),
                quest_date: quest_date.to_string(),
                kind: QuestKind::CompleteLesson,
                target: None,
                baseline: 0,
                quest_label: "Пройдите урок текущего этапа".to_string(),
                xp_reward: 30,
                completed: false,
                completed_at: None,
            },
        )?;
        if completed {
            QuestRepository::mark_completed(conn, id, &format!("{quest_date}T18:00:00+00:00"))?;
        }
        Ok(())
    })
    .expect("seed quest");
}

#[test]
fn previous_week_totals_and_texts() {
    let (pool, service, project_id, _dir) = setup();

    pool.with_connection(|conn| {
        // inside the 2025-03-10..2025-03-16 window
        XpRepository::insert(conn, "user-1", 50, XpSource::Lesson, "2025-03-11T10:00:00+00:00")?;
        XpRepository::insert(
            conn,
            "user-1",
            30,
            XpSource::ChecklistItem,
            "2025-03-13T09:00:00+00:00",
        )?;
        XpRepository::insert(
            conn,
            "user-1",
            30,
            XpSource::ChecklistItem,
            "2025-03-13T17:00:00+00:00",
        )?;
        // outside the window
        XpRepository::insert(conn, "user-1", 100, XpSource::Lesson, "2025-03-08T10:00:00+00:00")?;
        XpRepository::insert(conn, "user-1", 40, XpSource::Lesson, "2025-03-17T08:00:00+00:00")?;

        LessonRepository::upsert(
            conn,
            "user-1",
            "validation-201",
            Stage::Validation,
            LessonStatus::Completed,
            Some("2025-03-12T12:00:00+00:00"),
        )?;
        LessonRepository::upsert(
            conn,
            "user-1",
            "idea-101",
            Stage::Idea,
            LessonStatus::Completed,
            Some("2025-03-05T12:00:00+00:00"),
        )?;

        let low = Scorecard {
            criteria: vec![],
            total: 20,
        };
        let high = Scorecard {
            criteria: vec![],
            total: 32,
        };
        ScorecardRepository::append(conn, &project_id, &low, "2025-03-11T08:00:00+00:00")?;
        ScorecardRepository::append(conn, &project_id, &high, "2025-03-15T08:00:00+00:00")?;

        ProfileRepository::update_streak(conn, "user-1", 8, "2025-03-16")
    })
    .expect("seed window data");

    seed_quest(&pool, "q-in", &project_id, "2025-03-14", true);
    seed_quest(&pool, "q-old", &project_id, "2025-03-09", true);
    seed_quest(&pool, "q-open", &project_id, "2025-03-15", false);

    // Monday right after the window
    let now = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
    let report = service
        .weekly_report_at("user-1", &project_id, now)
        .expect("build report")
        .expect("profile exists");

    assert_eq!(report.week_start, "2025-03-10");
    assert_eq!(report.week_end, "2025-03-16");
    assert_eq!(report.xp_earned, 110);
    assert_eq!(report.lessons_completed, 1);
    assert_eq!(report.checklist_items_done, 2);
    assert_eq!(report.quests_completed, 1);
    assert_eq!(report.score_delta, 12);
    assert_eq!(report.streak_days, 8);

    assert_eq!(
        report.summary,
        "Вы заработали 110 XP, прошли 1 урок, закрыли 2 пункта чек-листа, выполнили 1 задание. \
         Оценка проекта выросла на 12 баллов. Серия активности: 8 дней подряд, так держать!"
    );
    assert!(report.recommendation.contains("Отличный темп"));

    assert!(service.should_show_weekly_report(now));
}

#[test]
fn quiet_week_reads_as_no_activity() {
    let (_pool, service, project_id, _dir) = setup();

    let now = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
    let report = service
        .weekly_report_at("user-1", &project_id, now)
        .expect("build report")
        .expect("profile exists");

    assert_eq!(report.xp_earned, 0);
    assert_eq!(report.score_delta, 0);
    assert_eq!(report.summary, "На этой неделе активности не было.");
    assert!(report.recommendation.contains("ежедневного задания"));
}

#[test]
fn missing_profile_yields_no_report() {
    let (_pool, service, project_id, _dir) = setup();

    let now = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
    let report = service
        .weekly_report_at("ghost", &project_id, now)
        .expect("no error");
    assert!(report.is_none());
}
