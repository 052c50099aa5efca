use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::lesson::{LessonProgressRecord, LessonStatus};
use crate::models::project::Stage;

#[derive(Debug, Clone)]
pub struct LessonProgressRow {
    pub id: i64,
    pub user_id: String,
    pub lesson_id: String,
    pub stage: String,
    pub status: String,
    pub completed_at: Option<String>,
}

impl LessonProgressRow {
    pub fn into_record(self) -> AppResult<LessonProgressRecord> {
        let stage = Stage::try_from(self.stage.as_str()).map_err(AppError::validation)?;
        let status = LessonStatus::try_from(self.status.as_str()).map_err(AppError::validation)?;
        Ok(LessonProgressRecord {
            id: self.id,
            user_id: self.user_id,
            lesson_id: self.lesson_id,
            stage,
            status,
            completed_at: self.completed_at,
        })
    }
}

impl TryFrom<&Row<'_>> for LessonProgressRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            lesson_id: row.get("lesson_id")?,
            stage: row.get("stage")?,
            status: row.get("status")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

pub struct LessonRepository;

impl LessonRepository {
    pub fn upsert(
        conn: &Connection,
        user_id: &str,
        lesson_id: &str,
        stage: Stage,
        status: LessonStatus,
        completed_at: Option<&str>,
    ) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO lesson_progress (user_id, lesson_id, stage, status, completed_at)
                VALUES (:user_id, :lesson_id, :stage, :status, :completed_at)
                ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                    status = excluded.status,
                    completed_at = excluded.completed_at
            "#,
            named_params! {
                ":user_id": user_id,
                ":lesson_id": lesson_id,
                ":stage": stage.as_str(),
                ":status": status.as_str(),
                ":completed_at": completed_at,
            },
        )?;
        Ok(())
    }

    /// Lessons that transitioned to completed inside `[start, end)`.
    pub fn count_completed_between(
        conn: &Connection,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> AppResult<i64> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*) FROM lesson_progress
                WHERE user_id = :user_id
                  AND status = 'completed'
                  AND completed_at >= :start
                  AND completed_at < :end
            "#,
            named_params! {":user_id": user_id, ":start": start, ":end": end},
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Whether any lesson was completed on the given calendar date
    /// (matched against the UTC date part of `completed_at`).
    pub fn has_completed_on(conn: &Connection, user_id: &str, date: &str) -> AppResult<bool> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*) FROM lesson_progress
                WHERE user_id = :user_id
                  AND status = 'completed'
                  AND substr(completed_at, 1, 10) = :date
            "#,
            named_params! {":user_id": user_id, ":date": date},
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<LessonProgressRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, user_id, lesson_id, stage, status, completed_at
                FROM lesson_progress
                WHERE user_id = :user_id
                ORDER BY id ASC
            "#,
        )?;

        let records = stmt
            .query_map(named_params! {":user_id": user_id}, |row| {
                LessonProgressRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
