use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::AppResult;
use crate::models::gamification::StreakStatus;
use crate::models::quest::DailyQuestRecord;
use crate::models::report::WeeklyReport;
use crate::models::scorecard::Scorecard;
use crate::services::quest_service::QuestService;
use crate::services::report_service::ReportService;
use crate::services::scorecard_service::ScorecardService;
use crate::services::streak_service::StreakService;

/// One dashboard view: four independent sections. A failed section is
/// omitted, never an error banner, and never blanks its neighbours.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quest: Option<DailyQuestRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorecard: Option<Scorecard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_report: Option<WeeklyReport>,
}

pub struct DashboardService {
    scorecard_service: Arc<ScorecardService>,
    streak_service: Arc<StreakService>,
    quest_service: Arc<QuestService>,
    report_service: Arc<ReportService>,
}

impl DashboardService {
    pub fn new(
        scorecard_service: Arc<ScorecardService>,
        streak_service: Arc<StreakService>,
        quest_service: Arc<QuestService>,
        report_service: Arc<ReportService>,
    ) -> Self {
        Self {
            scorecard_service,
            streak_service,
            quest_service,
            report_service,
        }
    }

    pub fn fetch_dashboard(&self, user_id: &str, project_id: &str) -> DashboardView {
        self.fetch_dashboard_at(user_id, project_id, Utc::now())
    }

    /// Settle-all over the four sections: each runs on its own scoped
    /// thread, and each failure (error or panic) is captured per section.
    pub fn fetch_dashboard_at(
        &self,
        user_id: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> DashboardView {
        thread::scope(|scope| {
            let quest = scope.spawn(|| {
                self.quest_service
                    .generate_daily_quest_at(user_id, project_id, now)
                    .map(Some)
            });
            let streak = scope.spawn(|| {
                self.streak_service.check_streak_at(user_id, now).map(Some)
            });
            let scorecard = scope.spawn(|| {
                self.scorecard_service.refresh_scorecard_at(project_id, now)
            });
            let report = scope.spawn(|| {
                if self.report_service.should_show_weekly_report(now) {
                    self.report_service.weekly_report_at(user_id, project_id, now)
                } else {
                    Ok(None)
                }
            });

            DashboardView {
                quest: settle("quest", quest),
                streak: settle("streak", streak),
                scorecard: settle("scorecard", scorecard),
                weekly_report: settle("weekly_report", report),
            }
        })
    }
}

/// Collapse one section's outcome: `Ok(Some(_))` passes through, errors
/// and panics are logged and the section renders as absent.
fn settle<T>(section: &str, handle: thread::ScopedJoinHandle<'_, AppResult<Option<T>>>) -> Option<T> {
    match handle.join() {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            warn!(target: "app::dashboard", section, error = %err, "dashboard section failed");
            None
        }
        Err(_) => {
            warn!(target: "app::dashboard", section, "dashboard section panicked");
            None
        }
    }
}
