use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::db::repositories::lesson_repository::LessonRepository;
use crate::db::repositories::profile_repository::ProfileRepository;
use crate::db::repositories::quest_repository::QuestRepository;
use crate::db::repositories::scorecard_repository::ScorecardRepository;
use crate::db::repositories::xp_repository::XpRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::gamification::XpSource;
use crate::models::report::WeeklyReport;
use crate::utils::dates::{format_date, is_monday_or_sunday, previous_week_bounds};
use crate::utils::plural::{checklist_items_ru, days_ru, lessons_ru, points_ru, quests_ru};

/// Aggregates the strictly previous Monday-Sunday week into a short
/// human-readable report. Nothing here is persisted.
pub struct ReportService {
    db: DbPool,
}

impl ReportService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// The report card is only surfaced around the week boundary.
    pub fn should_show_weekly_report(&self, now: DateTime<Utc>) -> bool {
        is_monday_or_sunday(now)
    }

    pub fn weekly_report(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> AppResult<Option<WeeklyReport>> {
        self.weekly_report_at(user_id, project_id, Utc::now())
    }

    pub fn weekly_report_at(
        &self,
        user_id: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WeeklyReport>> {
        let conn = self.db.get_connection()?;

        let Some(profile) = ProfileRepository::find(&conn, user_id)? else {
            debug!(target: "app::report", user_id, "no profile, skipping weekly report");
            return Ok(None);
        };

        let (week_start, week_end) = previous_week_bounds(now);
        let start = day_start_rfc3339(week_start);
        let end = day_start_rfc3339(week_end + chrono::Duration::days(1));

        let xp_earned = XpRepository::sum_between(&conn, user_id, &start, &end)?;
        let lessons_completed =
            LessonRepository::count_completed_between(&conn, user_id, &start, &end)?;
        // approximation: there is no checklist event log, only the XP
        // transactions those completions produced
        let checklist_items_done = XpRepository::count_by_source_between(
            &conn,
            user_id,
            XpSource::ChecklistItem,
            &start,
            &end,
        )?;
        let quests_completed = QuestRepository::count_completed_between(
            &conn,
            user_id,
            &format_date(week_start),
            &format_date(week_end),
        )?;

        let history = ScorecardRepository::list_between(&conn, project_id, &start, &end)?;
        let score_delta = match (history.first(), history.last()) {
            (Some(first), Some(last)) => last.total - first.total,
            _ => 0,
        };

        let streak_days = profile.streak_count;

        let summary = generate_summary(
            xp_earned,
            lessons_completed,
            checklist_items_done,
            quests_completed,
            score_delta,
            streak_days,
        );
        let recommendation = generate_recommendation(
            xp_earned,
            lessons_completed,
            checklist_items_done,
            quests_completed,
            score_delta,
        );

        Ok(Some(WeeklyReport {
            week_start: format_date(week_start),
            week_end: format_date(week_end),
            xp_earned,
            lessons_completed,
            checklist_items_done,
            quests_completed,
            score_delta,
            streak_days,
            summary,
            recommendation,
        }))
    }
}

fn day_start_rfc3339(date: NaiveDate) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).expect("midnight"), Utc)
        .to_rfc3339()
}

/// Comma-joined list of the week's accomplishments, with a score remark
/// and a streak callout when it is worth celebrating.
pub fn generate_summary(
    xp_earned: i64,
    lessons_completed: i64,
    checklist_items_done: i64,
    quests_completed: i64,
    score_delta: i64,
    streak_days: i64,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if xp_earned > 0 {
        parts.push(format!("заработали {xp_earned} XP"));
    }
    if lessons_completed > 0 {
        parts.push(format!("прошли {}", lessons_ru(lessons_completed)));
    }
    if checklist_items_done > 0 {
        parts.push(format!("закрыли {}", checklist_items_ru(checklist_items_done)));
    }
    if quests_completed > 0 {
        parts.push(format!("выполнили {}", quests_ru(quests_completed)));
    }

    let mut summary = if parts.is_empty() {
        "На этой неделе активности не было.".to_string()
    } else {
        format!("Вы {}.", parts.join(", "))
    };

    if score_delta > 0 {
        summary.push_str(&format!(
            " Оценка проекта выросла на {}.",
            points_ru(score_delta)
        ));
    } else if score_delta < 0 {
        summary.push_str(&format!(
            " Оценка проекта снизилась на {}.",
            points_ru(score_delta.abs())
        ));
    }

    if streak_days >= 7 {
        summary.push_str(&format!(
            " Серия активности: {} подряд, так держать!",
            days_ru(streak_days)
        ));
    }

    summary
}

/// Priority-ordered heuristics; the first matching rule wins.
pub fn generate_recommendation(
    xp_earned: i64,
    lessons_completed: i64,
    checklist_items_done: i64,
    quests_completed: i64,
    score_delta: i64,
) -> String {
    if xp_earned == 0 && lessons_completed == 0 && quests_completed == 0 {
        return "Начните с ежедневного задания: это быстрый способ вернуться в ритм.".to_string();
    }
    if lessons_completed > 0 && checklist_items_done == 0 {
        return "Вы прошли уроки, теперь примените знания на практике: закройте пункт чек-листа текущего этапа."
            .to_string();
    }
    if score_delta < 0 {
        return "Оценка проекта снижается. Сфокусируйтесь на бизнес-модели и целевой аудитории."
            .to_string();
    }
    if quests_completed == 0 {
        return "Загляните в ежедневные задания: они помогают двигаться маленькими шагами."
            .to_string();
    }
    "Отличный темп! Продолжайте двигаться по этапам.".to_string()
}
