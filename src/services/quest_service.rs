use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::repositories::lesson_repository::LessonRepository;
use crate::db::repositories::profile_repository::ProfileRepository;
use crate::db::repositories::project_repository::ProjectRepository;
use crate::db::repositories::quest_repository::QuestRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::gamification::XpSource;
use crate::models::project::{Artifacts, ProjectRecord, Stage, BMC_BLOCK_COUNT, VPC_ZONE_COUNT};
use crate::models::quest::{DailyQuestRecord, QuestCompletion, QuestKind};
use crate::services::level_service::LevelService;
use crate::utils::dates::{format_date, resolve_tz, today_in};

/// One generated task per user per local calendar day, derived from the
/// project's stage and progress.
pub struct QuestService {
    db: DbPool,
    level_service: Arc<LevelService>,
}

impl QuestService {
    pub fn new(db: DbPool, level_service: Arc<LevelService>) -> Self {
        Self { db, level_service }
    }

    pub fn generate_daily_quest(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> AppResult<DailyQuestRecord> {
        self.generate_daily_quest_at(user_id, project_id, Utc::now())
    }

    /// Idempotent per (user, local day): a repeat call returns the quest
    /// generated earlier the same day, never a duplicate.
    pub fn generate_daily_quest_at(
        &self,
        user_id: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<DailyQuestRecord> {
        let conn = self.db.get_connection()?;

        let timezone = ProfileRepository::find(&conn, user_id)?.and_then(|profile| profile.timezone);
        let quest_date = format_date(today_in(resolve_tz(timezone.as_deref()), now));

        if let Some(existing) = QuestRepository::find_for_date(&conn, user_id, &quest_date)? {
            debug!(target: "app::quest", user_id, quest_date, "returning existing daily quest");
            return Ok(existing);
        }

        let project =
            ProjectRepository::find_by_id(&conn, project_id)?.ok_or_else(AppError::not_found)?;

        let (kind, target, baseline, quest_label) = derive_quest(&project);
        let quest = DailyQuestRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
            quest_date: quest_date.clone(),
            kind,
            target,
            baseline,
            quest_label,
            xp_reward: kind.xp_reward(),
            completed: false,
            completed_at: None,
        };

        match QuestRepository::insert(&conn, &quest) {
            Ok(()) => {
                info!(target: "app::quest", user_id, kind = %kind, quest_date, "daily quest generated");
                Ok(quest)
            }
            // lost a same-day race: the winner's quest is the quest
            Err(AppError::Conflict { .. }) => QuestRepository::find_for_date(
                &conn, user_id, &quest_date,
            )?
            .ok_or_else(AppError::not_found),
            Err(err) => Err(err),
        }
    }

    /// Explicit completion. Awards XP exactly once: a repeat call reports
    /// success with zero XP.
    pub fn complete_daily_quest(&self, user_id: &str, quest_id: &str) -> AppResult<QuestCompletion> {
        self.complete_daily_quest_at(user_id, quest_id, Utc::now())
    }

    pub fn complete_daily_quest_at(
        &self,
        user_id: &str,
        quest_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<QuestCompletion> {
        let conn = self.db.get_connection()?;

        let quest =
            QuestRepository::find_by_id(&conn, quest_id)?.ok_or_else(AppError::not_found)?;
        if quest.user_id != user_id {
            return Err(AppError::validation("Задание принадлежит другому пользователю"));
        }

        let flipped = QuestRepository::mark_completed(&conn, quest_id, &now.to_rfc3339())?;
        drop(conn);

        if !flipped {
            debug!(target: "app::quest", quest_id, "quest already completed, no award");
            return Ok(QuestCompletion {
                success: true,
                xp_awarded: 0,
            });
        }

        self.level_service
            .award_xp_at(user_id, quest.xp_reward, XpSource::DailyQuest, now)?;
        info!(target: "app::quest", user_id, quest_id, xp = quest.xp_reward, "daily quest completed");

        Ok(QuestCompletion {
            success: true,
            xp_awarded: quest.xp_reward,
        })
    }

    /// Implicit completion: re-evaluate today's quest against the current
    /// project state and complete it when the underlying action already
    /// happened (e.g. the ninth BMC block got filled from the canvas).
    pub fn sync_quest_completion(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> AppResult<Option<QuestCompletion>> {
        self.sync_quest_completion_at(user_id, project_id, Utc::now())
    }

    pub fn sync_quest_completion_at(
        &self,
        user_id: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<QuestCompletion>> {
        let conn = self.db.get_connection()?;

        let timezone = ProfileRepository::find(&conn, user_id)?.and_then(|profile| profile.timezone);
        let quest_date = format_date(today_in(resolve_tz(timezone.as_deref()), now));

        let Some(quest) = QuestRepository::find_for_date(&conn, user_id, &quest_date)? else {
            return Ok(None);
        };
        if quest.completed || quest.project_id != project_id {
            return Ok(None);
        }

        let Some(project) = ProjectRepository::find_by_id(&conn, project_id)? else {
            return Ok(None);
        };

        let satisfied = match quest.kind {
            QuestKind::FillArtifact => quest
                .target
                .as_deref()
                .map(|key| artifact_present(&project.artifacts, key))
                .unwrap_or(false),
            QuestKind::FillBmcBlock => (project.bmc.filled_blocks() as i64) > quest.baseline,
            QuestKind::FillVpcZone => (project.vpc.filled_zones() as i64) > quest.baseline,
            QuestKind::CompleteChecklistItem => project
                .progress
                .stage(project.stage)
                .map(|entry| entry.completed_known_items(project.stage) as i64 > quest.baseline)
                .unwrap_or(false),
            QuestKind::CompleteLesson => {
                LessonRepository::has_completed_on(&conn, user_id, &quest.quest_date)?
            }
        };
        drop(conn);

        if !satisfied {
            return Ok(None);
        }

        self.complete_daily_quest_at(user_id, &quest.id, now)
            .map(Some)
    }
}

/// In-app route the quest's call-to-action points at.
pub fn quest_action_url(quest: &DailyQuestRecord) -> String {
    match quest.kind {
        QuestKind::FillArtifact => match quest.target.as_deref() {
            Some(key) => format!("/project/{}/artifacts#{key}", quest.project_id),
            None => format!("/project/{}/artifacts", quest.project_id),
        },
        QuestKind::FillBmcBlock => format!("/project/{}/canvas/bmc", quest.project_id),
        QuestKind::FillVpcZone => format!("/project/{}/canvas/vpc", quest.project_id),
        QuestKind::CompleteChecklistItem => format!("/project/{}/checklist", quest.project_id),
        QuestKind::CompleteLesson => "/lessons".to_string(),
    }
}

/// Fixed priority rules: the first meaningful next action for the
/// project's current stage wins.
fn derive_quest(project: &ProjectRecord) -> (QuestKind, Option<String>, i64, String) {
    let artifacts = &project.artifacts;
    let checklist_left = |stage: Stage| {
        let done = project
            .progress
            .stage(stage)
            .map(|entry| entry.completed_known_items(stage))
            .unwrap_or(0);
        done < stage.checklist().len()
    };
    let checklist_baseline = |stage: Stage| {
        project
            .progress
            .stage(stage)
            .map(|entry| entry.completed_known_items(stage) as i64)
            .unwrap_or(0)
    };

    match project.stage {
        Stage::Idea => {
            if !artifacts.has_problem() {
                return fill_artifact("problem", "Опишите проблему, которую решает ваш стартап");
            }
            if !artifacts.has_target_audience() {
                return fill_artifact("target_audience", "Опишите целевую аудиторию проекта");
            }
            lesson_quest()
        }
        Stage::Validation => {
            if !artifacts.has_hypotheses() {
                return fill_artifact("hypotheses", "Сформулируйте гипотезы для проверки");
            }
            if !artifacts.has_custdev_results() {
                return fill_artifact("custdev_results", "Запишите результаты CustDev-интервью");
            }
            if checklist_left(Stage::Validation) {
                return checklist_quest(
                    checklist_baseline(Stage::Validation),
                    "Закройте один пункт чек-листа этапа валидации",
                );
            }
            lesson_quest()
        }
        Stage::BusinessModel => {
            let filled = project.bmc.filled_blocks();
            if filled < BMC_BLOCK_COUNT {
                return (
                    QuestKind::FillBmcBlock,
                    None,
                    filled as i64,
                    "Заполните ещё один блок Business Model Canvas".to_string(),
                );
            }
            let zones = project.vpc.filled_zones();
            if zones < VPC_ZONE_COUNT {
                return (
                    QuestKind::FillVpcZone,
                    None,
                    zones as i64,
                    "Добавьте заметку в Value Proposition Canvas".to_string(),
                );
            }
            if !artifacts.has_revenue_model() {
                return fill_artifact("revenue_model", "Опишите модель монетизации");
            }
            lesson_quest()
        }
        Stage::Mvp => {
            if !artifacts.has_mvp_description() {
                return fill_artifact("mvp_description", "Опишите минимальную версию продукта");
            }
            if checklist_left(Stage::Mvp) {
                return checklist_quest(
                    checklist_baseline(Stage::Mvp),
                    "Закройте один пункт чек-листа этапа MVP",
                );
            }
            lesson_quest()
        }
        Stage::Pitch => {
            if !artifacts.has_pitch_deck() {
                return fill_artifact("pitch_deck", "Подготовьте структуру питч-дека");
            }
            if checklist_left(Stage::Pitch) {
                return checklist_quest(
                    checklist_baseline(Stage::Pitch),
                    "Закройте один пункт чек-листа этапа питча",
                );
            }
            lesson_quest()
        }
    }
}

fn fill_artifact(key: &str, label: &str) -> (QuestKind, Option<String>, i64, String) {
    (
        QuestKind::FillArtifact,
        Some(key.to_string()),
        0,
        label.to_string(),
    )
}

fn checklist_quest(baseline: i64, label: &str) -> (QuestKind, Option<String>, i64, String) {
    (
        QuestKind::CompleteChecklistItem,
        None,
        baseline,
        label.to_string(),
    )
}

fn lesson_quest() -> (QuestKind, Option<String>, i64, String) {
    (
        QuestKind::CompleteLesson,
        None,
        0,
        "Пройдите урок текущего этапа".to_string(),
    )
}

fn artifact_present(artifacts: &Artifacts, key: &str) -> bool {
    match key {
        "problem" => artifacts.has_problem(),
        "problem_causes" => artifacts.has_problem_causes(),
        "problem_evidence" => artifacts.has_problem_evidence(),
        "target_audience" => artifacts.has_target_audience(),
        "audience_segments" => artifacts.has_audience_segments(),
        "early_adopters" => artifacts.has_early_adopters(),
        "market_size" => artifacts.has_market_size(),
        "tam_sam_som" => artifacts.has_tam_sam_som(),
        "hypotheses" => artifacts.has_hypotheses(),
        "experiment_results" => artifacts.has_experiment_results(),
        "custdev_results" => artifacts.has_custdev_results(),
        "interview_notes" => artifacts.has_interview_notes(),
        "revenue_model" => artifacts.has_revenue_model(),
        "mvp_description" => artifacts.has_mvp_description(),
        "pitch_deck" => artifacts.has_pitch_deck(),
        _ => false,
    }
}
