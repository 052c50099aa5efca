use crate::actions::{ActionError, ActionResult, AppState};
use crate::db::repositories::project_repository::ProjectRepository;
use crate::services::dashboard_service::DashboardView;

pub fn dashboard_fetch(
    state: &AppState,
    user_id: &str,
    project_id: &str,
) -> ActionResult<DashboardView> {
    Ok(state.dashboard().fetch_dashboard(user_id, project_id))
}

/// Dashboard for the user's active (most recently touched) project.
pub fn dashboard_fetch_active(state: &AppState, user_id: &str) -> ActionResult<DashboardView> {
    let project = state
        .db()
        .with_connection(|conn| ProjectRepository::find_active_for_user(conn, user_id))?
        .ok_or_else(|| {
            ActionError::new("NOT_FOUND", "У пользователя нет активного проекта", None)
        })?;

    dashboard_fetch(state, user_id, &project.id)
}
