pub mod dashboard;
pub mod gamification;
pub mod quest;
pub mod scorecard;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::dashboard_service::DashboardService;
use crate::services::level_service::LevelService;
use crate::services::quest_service::QuestService;
use crate::services::report_service::ReportService;
use crate::services::scorecard_service::ScorecardService;
use crate::services::streak_service::StreakService;

/// Service wiring for the web layer. Server actions hold one `AppState`
/// and delegate; no business logic lives at this level.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    level_service: Arc<LevelService>,
    scorecard_service: Arc<ScorecardService>,
    streak_service: Arc<StreakService>,
    quest_service: Arc<QuestService>,
    report_service: Arc<ReportService>,
    dashboard_service: Arc<DashboardService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let level_service = Arc::new(LevelService::new(db_pool.clone()));
        let scorecard_service = Arc::new(ScorecardService::new(db_pool.clone()));
        let streak_service = Arc::new(StreakService::new(db_pool.clone()));
        let quest_service = Arc::new(QuestService::new(
            db_pool.clone(),
            Arc::clone(&level_service),
        ));
        let report_service = Arc::new(ReportService::new(db_pool.clone()));
        let dashboard_service = Arc::new(DashboardService::new(
            Arc::clone(&scorecard_service),
            Arc::clone(&streak_service),
            Arc::clone(&quest_service),
            Arc::clone(&report_service),
        ));

        Ok(Self {
            db_pool,
            level_service,
            scorecard_service,
            streak_service,
            quest_service,
            report_service,
            dashboard_service,
        })
    }

    pub fn levels(&self) -> Arc<LevelService> {
        Arc::clone(&self.level_service)
    }

    pub fn scorecards(&self) -> Arc<ScorecardService> {
        Arc::clone(&self.scorecard_service)
    }

    pub fn streaks(&self) -> Arc<StreakService> {
        Arc::clone(&self.streak_service)
    }

    pub fn quests(&self) -> Arc<QuestService> {
        Arc::clone(&self.quest_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }

    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ActionError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for ActionError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                ActionError::new("VALIDATION_ERROR", message, details)
            }
            AppError::NotFound => {
                ActionError::new("NOT_FOUND", "Запрошенный ресурс не найден", None)
            }
            AppError::Conflict { message } => ActionError::new("CONFLICT", message, None),
            AppError::Database { message } => {
                error!(target: "app::actions", %message, "database error in action");
                ActionError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::actions", error = %error, "serialization error in action");
                ActionError::new("UNKNOWN", "Сериализация не удалась", None)
            }
            AppError::Io(error) => {
                error!(target: "app::actions", error = %error, "io error in action");
                ActionError::new("UNKNOWN", "Файловая система недоступна", None)
            }
            AppError::Other(message) => {
                error!(target: "app::actions", %message, "unexpected error in action");
                ActionError::new("UNKNOWN", message, None)
            }
        }
    }
}
