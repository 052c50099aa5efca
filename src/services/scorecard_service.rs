use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::db::repositories::project_repository::ProjectRepository;
use crate::db::repositories::scorecard_repository::ScorecardRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::project::{
    Artifacts, BmcData, ProgressData, Stage, VpcData, BMC_BLOCK_COUNT, VPC_ZONE_COUNT,
};
use crate::models::scorecard::{Criterion, CriterionScore, Scorecard};

/// At most one history row per project per hour; canvas autosaves retrigger
/// recomputation far more often than that.
const HISTORY_THROTTLE_MINUTES: i64 = 60;

const STAGE_ITEM_POINTS: i64 = 15;
const STAGE_ITEMS_CAP: i64 = 45;
const STAGE_COMPLETED_BONUS: i64 = 20;

/// Startup-health scoring engine: ten weighted criteria computed from
/// project artifacts, stage progress and canvas fill state.
pub struct ScorecardService {
    db: DbPool,
}

impl ScorecardService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Recompute the project's scorecard and persist it. Returns `None`
    /// when the project does not exist; the caller simply retriggers on
    /// the next user action.
    pub fn refresh_scorecard(&self, project_id: &str) -> AppResult<Option<Scorecard>> {
        self.refresh_scorecard_at(project_id, Utc::now())
    }

    pub fn refresh_scorecard_at(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Scorecard>> {
        let conn = self.db.get_connection()?;

        let project = match ProjectRepository::find_by_id(&conn, project_id)? {
            Some(project) => project,
            None => {
                debug!(target: "app::scorecard", project_id, "project missing, skipping scorecard");
                return Ok(None);
            }
        };

        let scorecard = compute_scorecard(
            &project.artifacts,
            &project.progress,
            &project.bmc,
            &project.vpc,
        );

        ProjectRepository::save_scorecard(&conn, project_id, &scorecard)?;

        if self.should_append_history(&conn, project_id, now)? {
            ScorecardRepository::append(&conn, project_id, &scorecard, &now.to_rfc3339())?;
            info!(
                target: "app::scorecard",
                project_id,
                total = scorecard.total,
                "scorecard history entry appended"
            );
        }

        Ok(Some(scorecard))
    }

    pub fn latest_scorecard(&self, project_id: &str) -> AppResult<Option<Scorecard>> {
        let conn = self.db.get_connection()?;
        ProjectRepository::latest_scorecard(&conn, project_id)
    }

    fn should_append_history(
        &self,
        conn: &rusqlite::Connection,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let latest = ScorecardRepository::latest(conn, project_id)?;
        let Some(latest) = latest else {
            return Ok(true);
        };

        match DateTime::parse_from_rfc3339(&latest.created_at) {
            Ok(created) => Ok(now.signed_duration_since(created.with_timezone(&Utc))
                > Duration::minutes(HISTORY_THROTTLE_MINUTES)),
            // unreadable timestamp: append rather than silently stall the log
            Err(_) => Ok(true),
        }
    }
}

/// Pure scoring function. No I/O, no clock.
pub fn compute_scorecard(
    artifacts: &Artifacts,
    progress: &ProgressData,
    bmc: &BmcData,
    vpc: &VpcData,
) -> Scorecard {
    let criteria: Vec<CriterionScore> = Criterion::ALL
        .iter()
        .map(|&criterion| CriterionScore {
            criterion,
            score: score_criterion(criterion, artifacts, progress, bmc, vpc),
        })
        .collect();

    let weight_sum: f64 = Criterion::ALL.iter().map(|c| c.weight()).sum();
    let weighted_sum: f64 = criteria
        .iter()
        .map(|entry| entry.score as f64 * entry.criterion.weight())
        .sum();

    let total = ((weighted_sum / weight_sum).round() as i64).clamp(0, 100);

    Scorecard { criteria, total }
}

fn score_criterion(
    criterion: Criterion,
    artifacts: &Artifacts,
    progress: &ProgressData,
    bmc: &BmcData,
    vpc: &VpcData,
) -> i64 {
    let score = match criterion {
        Criterion::ProblemClarity => {
            presence_points(artifacts.has_problem(), 50)
                + presence_points(artifacts.has_problem_causes(), 30)
                + presence_points(artifacts.has_problem_evidence(), 20)
        }
        Criterion::TargetAudience => {
            presence_points(artifacts.has_target_audience(), 50)
                + presence_points(artifacts.has_audience_segments(), 30)
                + presence_points(artifacts.has_early_adopters(), 20)
        }
        Criterion::MarketSize => {
            presence_points(artifacts.has_market_size(), 50)
                + presence_points(artifacts.has_tam_sam_som(), 30)
                + presence_points(artifacts.has_competitors(), 20)
        }
        Criterion::IdeaValidation => {
            stage_items_points(progress, Stage::Validation)
                + presence_points(artifacts.has_hypotheses(), 20)
                + presence_points(artifacts.has_experiment_results(), 15)
                + stage_completed_bonus(progress, Stage::Validation)
        }
        Criterion::Custdev => {
            presence_points(artifacts.has_custdev_results(), 50)
                + presence_points(artifacts.has_interview_notes(), 30)
                + item_points(progress, Stage::Validation, "custdev_interviews", 20)
        }
        Criterion::Bmc => canvas_score(bmc.filled_blocks(), BMC_BLOCK_COUNT),
        Criterion::Vpc => canvas_score(vpc.filled_zones(), VPC_ZONE_COUNT),
        Criterion::UnitEconomics => {
            item_points(progress, Stage::BusinessModel, "unit_economics", 40)
                + presence_points(artifacts.has_revenue_model(), 40)
                + stage_completed_bonus(progress, Stage::BusinessModel)
        }
        Criterion::MvpDefinition => {
            stage_items_points(progress, Stage::Mvp)
                + presence_points(artifacts.has_mvp_description(), 35)
                + stage_completed_bonus(progress, Stage::Mvp)
        }
        Criterion::Pitch => {
            stage_items_points(progress, Stage::Pitch)
                + presence_points(artifacts.has_pitch_deck(), 35)
                + stage_completed_bonus(progress, Stage::Pitch)
        }
    };

    score.clamp(0, 100)
}

fn presence_points(present: bool, points: i64) -> i64 {
    if present {
        points
    } else {
        0
    }
}

fn stage_items_points(progress: &ProgressData, stage: Stage) -> i64 {
    let completed = progress
        .stage(stage)
        .map(|entry| entry.completed_known_items(stage) as i64)
        .unwrap_or(0);
    (completed * STAGE_ITEM_POINTS).min(STAGE_ITEMS_CAP)
}

fn item_points(progress: &ProgressData, stage: Stage, key: &str, points: i64) -> i64 {
    let has = progress
        .stage(stage)
        .map(|entry| entry.has_item(key))
        .unwrap_or(false);
    presence_points(has, points)
}

fn stage_completed_bonus(progress: &ProgressData, stage: Stage) -> i64 {
    let completed = progress
        .stage(stage)
        .map(|entry| entry.is_completed())
        .unwrap_or(false);
    presence_points(completed, STAGE_COMPLETED_BONUS)
}

fn canvas_score(filled: usize, total: usize) -> i64 {
    ((filled as f64 / total as f64) * 100.0).round() as i64
}
