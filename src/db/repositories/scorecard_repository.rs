use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::scorecard::{CriterionScore, Scorecard, ScorecardHistoryEntry};

#[derive(Debug, Clone)]
pub struct ScorecardHistoryRow {
    pub id: i64,
    pub project_id: String,
    pub total: i64,
    pub criteria_json: String,
    pub created_at: String,
}

impl ScorecardHistoryRow {
    pub fn into_record(self) -> AppResult<ScorecardHistoryEntry> {
        let criteria: Vec<CriterionScore> =
            serde_json::from_str(&self.criteria_json).map_err(|err| {
                AppError::validation_with_details(
                    "Повреждённая запись истории оценок",
                    serde_json::json!({"error": err.to_string()}),
                )
            })?;

        Ok(ScorecardHistoryEntry {
            id: self.id,
            project_id: self.project_id,
            total: self.total,
            criteria,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<&Row<'_>> for ScorecardHistoryRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            total: row.get("total")?,
            criteria_json: row.get("criteria_json")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct ScorecardRepository;

impl ScorecardRepository {
    pub fn append(
        conn: &Connection,
        project_id: &str,
        scorecard: &Scorecard,
        created_at: &str,
    ) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO scorecard_history (project_id, total, criteria_json, created_at)
                VALUES (:project_id, :total, :criteria_json, :created_at)
            "#,
            named_params! {
                ":project_id": project_id,
                ":total": scorecard.total,
                ":criteria_json": serde_json::to_string(&scorecard.criteria)?,
                ":created_at": created_at,
            },
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn latest(
        conn: &Connection,
        project_id: &str,
    ) -> AppResult<Option<ScorecardHistoryEntry>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, project_id, total, criteria_json, created_at
                FROM scorecard_history
                WHERE project_id = :project_id
                ORDER BY created_at DESC
                LIMIT 1
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":project_id": project_id}, |row| {
                ScorecardHistoryRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// History entries with `created_at` in `[start, end)`, oldest first.
    pub fn list_between(
        conn: &Connection,
        project_id: &str,
        start: &str,
        end: &str,
    ) -> AppResult<Vec<ScorecardHistoryEntry>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, project_id, total, criteria_json, created_at
                FROM scorecard_history
                WHERE project_id = :project_id
                  AND created_at >= :start
                  AND created_at < :end
                ORDER BY created_at ASC
            "#,
        )?;

        let records = stmt
            .query_map(
                named_params! {":project_id": project_id, ":start": start, ":end": end},
                |row| ScorecardHistoryRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn count_for_project(conn: &Connection, project_id: &str) -> AppResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM scorecard_history WHERE project_id = :project_id",
            named_params! {":project_id": project_id},
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
