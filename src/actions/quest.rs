use crate::actions::{ActionResult, AppState};
use crate::models::quest::{DailyQuestRecord, QuestCompletion};
use crate::services::quest_service::quest_action_url;

pub fn quest_generate(
    state: &AppState,
    user_id: &str,
    project_id: &str,
) -> ActionResult<DailyQuestRecord> {
    Ok(state.quests().generate_daily_quest(user_id, project_id)?)
}

pub fn quest_complete(
    state: &AppState,
    user_id: &str,
    quest_id: &str,
) -> ActionResult<QuestCompletion> {
    let completion = state.quests().complete_daily_quest(user_id, quest_id)?;
    if completion.xp_awarded > 0 {
        state.streaks().record_activity(user_id)?;
    }
    Ok(completion)
}

/// Re-check today's quest against current project state; used after
/// canvas or checklist saves.
pub fn quest_sync(
    state: &AppState,
    user_id: &str,
    project_id: &str,
) -> ActionResult<Option<QuestCompletion>> {
    Ok(state.quests().sync_quest_completion(user_id, project_id)?)
}

pub fn quest_url(quest: &DailyQuestRecord) -> String {
    quest_action_url(quest)
}
