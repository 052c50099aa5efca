//! Integration tests for XP awards, level resolution and streak upkeep
//! driven through the action facade.

use chrono::{TimeZone, Utc};
use startupcopilot_core::actions::{gamification, AppState};
use startupcopilot_core::db::repositories::profile_repository::ProfileRepository;
use startupcopilot_core::db::repositories::xp_repository::XpRepository;
use startupcopilot_core::db::DbPool;
use startupcopilot_core::models::gamification::XpSource;
use startupcopilot_core::models::profile::ProfileInsert;
use tempfile::{tempdir, TempDir};

fn setup(user_id: &str) -> (DbPool, AppState, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("create db pool");
    pool.with_connection(|conn| {
        ProfileRepository::ensure(
            conn,
            &ProfileInsert {
                user_id: user_id.to_string(),
                display_name: "Маша".to_string(),
                timezone: Some("UTC".to_string()),
            },
        )
        .map(|_| ())
    })
    .expect("ensure profile");

    let state = AppState::new(pool.clone()).expect("build app state");
    (pool, state, dir)
}

#[test]
fn awards_accumulate_and_cross_levels() {
    let (pool, state, _dir) = setup("user-1");

    let first = gamification::xp_award(&state, "user-1", 60, "lesson").expect("award");
    assert_eq!(first.new_xp, 60);
    assert!(!first.leveled_up);

    let second = gamification::xp_award(&state, "user-1", 60, "checklist_item").expect("award");
    assert_eq!(second.new_xp, 120);
    assert!(second.leveled_up);
    assert_eq!(second.new_level.as_ref().unwrap().level, 2);

    let info = gamification::level_info_fetch(&state, "user-1").expect("level info");
    assert_eq!(info.level, 2);
    assert_eq!(info.title, "Explorer");
    assert_eq!(info.xp_into_level, 20);
    assert_eq!(info.next_level_xp, Some(500));

    // both transactions are in the log
    let transactions = pool
        .with_connection(|conn| XpRepository::list_for_user(conn, "user-1"))
        .expect("list transactions");
    assert_eq!(transactions.len(), 2);
    assert!(transactions
        .iter()
        .any(|tx| tx.source == XpSource::ChecklistItem));
}

#[test]
fn unknown_source_is_rejected() {
    let (_pool, state, _dir) = setup("user-1");

    let result = gamification::xp_award(&state, "user-1", 10, "lootbox");
    let err = result.expect_err("must be rejected");
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[test]
fn awards_count_as_streak_activity() {
    let (pool, state, _dir) = setup("user-1");

    gamification::xp_award(&state, "user-1", 30, "lesson").expect("award");

    let status = gamification::streak_check(&state, "user-1").expect("check");
    assert_eq!(status.streak_count, 1);
    assert!(status.active_today);
    assert_eq!(status.next_milestone, Some(3));

    let profile = pool
        .with_connection(|conn| ProfileRepository::find(conn, "user-1"))
        .expect("find")
        .expect("exists");
    assert!(profile.last_activity_date.is_some());
}

#[test]
fn freeze_refusal_outside_risk_window() {
    let (_pool, state, _dir) = setup("user-1");

    gamification::xp_award(&state, "user-1", 30, "lesson").expect("award");

    // active today, nothing to rescue
    let err = gamification::streak_use_freeze(&state, "user-1").expect_err("not at risk");
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[test]
fn missing_profile_surfaces_not_found() {
    let (_pool, state, _dir) = setup("user-1");

    let err = gamification::level_info_fetch(&state, "ghost").expect_err("no profile");
    assert_eq!(err.code, "NOT_FOUND");
}

#[test]
fn configured_levels_override_the_fallback_after_ttl() {
    use chrono::Duration;
    use startupcopilot_core::db::repositories::level_repository::LevelRepository;
    use startupcopilot_core::models::gamification::LevelDefinition;

    let (pool, state, _dir) = setup("user-1");

    pool.with_connection(|conn| {
        LevelRepository::replace_all(
            conn,
            &[
                LevelDefinition {
                    level: 1,
                    title: "Старт".to_string(),
                    min_xp: 0,
                    icon: "🌱".to_string(),
                },
                LevelDefinition {
                    level: 2,
                    title: "Рост".to_string(),
                    min_xp: 50,
                    icon: "🌿".to_string(),
                },
            ],
        )
    })
    .expect("seed levels");

    let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
    let definitions = state.levels().definitions_at(t0);
    assert_eq!(definitions.len(), 2);

    // snapshot holds inside the TTL even if config changes underneath
    pool.with_connection(|conn| LevelRepository::replace_all(conn, &[]))
        .expect("clear levels");
    let cached = state.levels().definitions_at(t0 + Duration::seconds(60));
    assert_eq!(cached.len(), 2);

    // an empty table after expiry is invalid config -> compiled fallback
    let fallback = state.levels().definitions_at(t0 + Duration::seconds(400));
    assert_eq!(fallback.len(), 5);
    assert_eq!(fallback[0].title, "Dreamer");
}
