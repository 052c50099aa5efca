use crate::actions::{ActionResult, AppState};
use crate::db::repositories::profile_repository::ProfileRepository;
use crate::error::AppError;
use crate::models::gamification::{LevelInfo, StreakStatus, XpAward, XpSource};

pub fn level_info_fetch(state: &AppState, user_id: &str) -> ActionResult<LevelInfo> {
    let profile = state
        .db()
        .with_connection(|conn| ProfileRepository::find(conn, user_id))?
        .ok_or_else(AppError::not_found)?;

    Ok(state.levels().level_info(profile.xp))
}

pub fn xp_award(
    state: &AppState,
    user_id: &str,
    amount: i64,
    source: &str,
) -> ActionResult<XpAward> {
    let source = XpSource::try_from(source).map_err(AppError::validation)?;
    let award = state.levels().award_xp(user_id, amount, source)?;
    // any XP-worthy action counts as qualifying streak activity
    state.streaks().record_activity(user_id)?;
    Ok(award)
}

pub fn streak_check(state: &AppState, user_id: &str) -> ActionResult<StreakStatus> {
    Ok(state.streaks().check_streak(user_id)?)
}

pub fn streak_use_freeze(state: &AppState, user_id: &str) -> ActionResult<StreakStatus> {
    Ok(state.streaks().use_freeze(user_id)?)
}
