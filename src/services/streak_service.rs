use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::profile_repository::ProfileRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::gamification::StreakStatus;
use crate::models::profile::ProfileRecord;
use crate::utils::dates::{format_date, parse_date, resolve_tz, today_in, week_start};

/// Streak-count rewards the dashboard counts down to.
const STREAK_MILESTONES: [i64; 6] = [3, 7, 14, 30, 60, 100];

/// Daily-activity continuity with a once-a-week freeze rescue. All date
/// math happens on calendar dates in the user's timezone.
pub struct StreakService {
    db: DbPool,
}

impl StreakService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn check_streak(&self, user_id: &str) -> AppResult<StreakStatus> {
        self.check_streak_at(user_id, Utc::now())
    }

    /// Evaluate continuity as of `now`. A streak that can no longer be
    /// rescued is reset here, on the check, rather than waiting for the
    /// next activity.
    pub fn check_streak_at(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<StreakStatus> {
        let conn = self.db.get_connection()?;
        let profile =
            ProfileRepository::find(&conn, user_id)?.ok_or_else(AppError::not_found)?;

        let tz = resolve_tz(profile.timezone.as_deref());
        let today = today_in(tz, now);
        let yesterday = today - Duration::days(1);
        let last_activity = profile.last_activity_date.as_deref().and_then(parse_date);

        let active_today = last_activity == Some(today);
        let continues = active_today || last_activity == Some(yesterday);
        let at_risk = profile.streak_count > 0
            && last_activity == Some(today - Duration::days(2));
        let can_use_freeze = freeze_available(&profile, today);

        let streak_count = if continues {
            profile.streak_count
        } else if at_risk && can_use_freeze {
            // rescuable until the freeze window closes
            profile.streak_count
        } else if profile.streak_count > 0 {
            debug!(target: "app::gamification", user_id, "streak broken, resetting");
            ProfileRepository::update_streak(
                &conn,
                user_id,
                0,
                &profile
                    .last_activity_date
                    .unwrap_or_else(|| format_date(today)),
            )?;
            0
        } else {
            0
        };

        Ok(StreakStatus {
            streak_count,
            active_today,
            at_risk: at_risk && streak_count > 0,
            can_use_freeze,
            next_milestone: next_milestone(streak_count),
        })
    }

    pub fn record_activity(&self, user_id: &str) -> AppResult<StreakStatus> {
        self.record_activity_at(user_id, Utc::now())
    }

    /// Register qualifying activity for "today". Keeps an already-counted
    /// day, extends from yesterday, otherwise restarts at 1.
    pub fn record_activity_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<StreakStatus> {
        let conn = self.db.get_connection()?;
        let profile =
            ProfileRepository::find(&conn, user_id)?.ok_or_else(AppError::not_found)?;

        let tz = resolve_tz(profile.timezone.as_deref());
        let today = today_in(tz, now);
        let yesterday = today - Duration::days(1);
        let last_activity = profile.last_activity_date.as_deref().and_then(parse_date);

        let streak_count = if last_activity == Some(today) {
            profile.streak_count.max(1)
        } else if last_activity == Some(yesterday) {
            profile.streak_count + 1
        } else {
            1
        };

        if last_activity != Some(today) || streak_count != profile.streak_count {
            ProfileRepository::update_streak(&conn, user_id, streak_count, &format_date(today))?;
        }

        Ok(StreakStatus {
            streak_count,
            active_today: true,
            at_risk: false,
            can_use_freeze: freeze_available(&profile, today),
            next_milestone: next_milestone(streak_count),
        })
    }

    pub fn use_freeze(&self, user_id: &str) -> AppResult<StreakStatus> {
        self.use_freeze_at(user_id, Utc::now())
    }

    /// Explicitly consume the weekly freeze to cover yesterday's missed
    /// day. Only valid while the streak is at risk.
    pub fn use_freeze_at(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<StreakStatus> {
        let conn = self.db.get_connection()?;
        let profile =
            ProfileRepository::find(&conn, user_id)?.ok_or_else(AppError::not_found)?;

        let tz = resolve_tz(profile.timezone.as_deref());
        let today = today_in(tz, now);
        let yesterday = today - Duration::days(1);
        let last_activity = profile.last_activity_date.as_deref().and_then(parse_date);

        let at_risk =
            profile.streak_count > 0 && last_activity == Some(today - Duration::days(2));
        if !at_risk {
            return Err(AppError::validation("Заморозка сейчас не нужна"));
        }
        if !freeze_available(&profile, today) {
            return Err(AppError::validation(
                "Заморозка уже использована на этой неделе",
            ));
        }

        ProfileRepository::record_freeze(
            &conn,
            user_id,
            &format_date(today),
            &format_date(yesterday),
        )?;
        info!(target: "app::gamification", user_id, "streak freeze consumed");

        Ok(StreakStatus {
            streak_count: profile.streak_count,
            active_today: false,
            at_risk: false,
            can_use_freeze: false,
            next_milestone: next_milestone(profile.streak_count),
        })
    }
}

/// One freeze per Monday-started calendar week in the user's timezone.
fn freeze_available(profile: &ProfileRecord, today: NaiveDate) -> bool {
    match profile.freeze_used_on.as_deref().and_then(parse_date) {
        Some(used_on) => week_start(used_on) != week_start(today),
        None => true,
    }
}

fn next_milestone(streak_count: i64) -> Option<i64> {
    STREAK_MILESTONES
        .iter()
        .copied()
        .find(|milestone| *milestone > streak_count)
}
