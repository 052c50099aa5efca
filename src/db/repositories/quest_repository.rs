use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::quest::{DailyQuestRecord, QuestKind};

#[derive(Debug, Clone)]
pub struct DailyQuestRow {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub quest_date: String,
    pub kind: String,
    pub target: Option<String>,
    pub baseline: i64,
    pub quest_label: String,
    pub xp_reward: i64,
    pub completed: i64,
    pub completed_at: Option<String>,
}

impl DailyQuestRow {
    pub fn into_record(self) -> AppResult<DailyQuestRecord> {
        let kind = QuestKind::try_from(self.kind.as_str()).map_err(AppError::validation)?;
        Ok(DailyQuestRecord {
            id: self.id,
            user_id: self.user_id,
            project_id: self.project_id,
            quest_date: self.quest_date,
            kind,
            target: self.target,
            baseline: self.baseline,
            quest_label: self.quest_label,
            xp_reward: self.xp_reward,
            completed: self.completed != 0,
            completed_at: self.completed_at,
        })
    }
}

impl TryFrom<&Row<'_>> for DailyQuestRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            project_id: row.get("project_id")?,
            quest_date: row.get("quest_date")?,
            kind: row.get("kind")?,
            target: row.get("target")?,
            baseline: row.get("baseline")?,
            quest_label: row.get("quest_label")?,
            xp_reward: row.get("xp_reward")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    user_id,
    project_id,
    quest_date,
    kind,
    target,
    baseline,
    quest_label,
    xp_reward,
    completed,
    completed_at
"#;

pub struct QuestRepository;

impl QuestRepository {
    pub fn insert(conn: &Connection, quest: &DailyQuestRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO daily_quests (
                    id, user_id, project_id, quest_date, kind, target, baseline,
                    quest_label, xp_reward, completed, completed_at
                ) VALUES (
                    :id, :user_id, :project_id, :quest_date, :kind, :target, :baseline,
                    :quest_label, :xp_reward, 0, NULL
                )
            "#,
            named_params! {
                ":id": &quest.id,
                ":user_id": &quest.user_id,
                ":project_id": &quest.project_id,
                ":quest_date": &quest.quest_date,
                ":kind": quest.kind.as_str(),
                ":target": &quest.target,
                ":baseline": quest.baseline,
                ":quest_label": &quest.quest_label,
                ":xp_reward": quest.xp_reward,
            },
        )?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<DailyQuestRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM daily_quests WHERE id = :id"
        ))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| DailyQuestRow::try_from(row))
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    pub fn find_for_date(
        conn: &Connection,
        user_id: &str,
        quest_date: &str,
    ) -> AppResult<Option<DailyQuestRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM daily_quests
                WHERE user_id = :user_id AND quest_date = :quest_date
            "#
        ))?;

        let row = stmt
            .query_row(
                named_params! {":user_id": user_id, ":quest_date": quest_date},
                |row| DailyQuestRow::try_from(row),
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// Flip to completed; returns false when the quest was already
    /// completed (or unknown). The award path keys off this flag.
    pub fn mark_completed(conn: &Connection, id: &str, completed_at: &str) -> AppResult<bool> {
        let affected = conn.execute(
            r#"
                UPDATE daily_quests SET
                    completed = 1,
                    completed_at = :completed_at
                WHERE id = :id AND completed = 0
            "#,
            named_params! {":id": id, ":completed_at": completed_at},
        )?;
        Ok(affected > 0)
    }

    /// Completed quests whose quest_date falls in `[start, end]` (dates
    /// inclusive, YYYY-MM-DD).
    pub fn count_completed_between(
        conn: &Connection,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<i64> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*) FROM daily_quests
                WHERE user_id = :user_id
                  AND completed = 1
                  AND quest_date >= :start_date
                  AND quest_date <= :end_date
            "#,
            named_params! {
                ":user_id": user_id,
                ":start_date": start_date,
                ":end_date": end_date,
            },
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
