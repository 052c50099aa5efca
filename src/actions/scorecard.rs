use crate::actions::{ActionResult, AppState};
use crate::models::scorecard::Scorecard;

pub fn scorecard_refresh(state: &AppState, project_id: &str) -> ActionResult<Option<Scorecard>> {
    Ok(state.scorecards().refresh_scorecard(project_id)?)
}

pub fn scorecard_latest(state: &AppState, project_id: &str) -> ActionResult<Option<Scorecard>> {
    Ok(state.scorecards().latest_scorecard(project_id)?)
}
