use chrono::Utc;
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::project::{
    Artifacts, BmcData, ProgressData, ProjectInsert, ProjectRecord, Stage, UnitEconomics, VpcData,
};
use crate::models::scorecard::Scorecard;

#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub stage: String,
    pub artifacts_json: String,
    pub progress_json: String,
    pub bmc_json: String,
    pub vpc_json: String,
    pub unit_economics_json: String,
    pub scorecard_json: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectRow {
    pub fn into_record(self) -> AppResult<ProjectRecord> {
        let stage = Stage::try_from(self.stage.as_str()).map_err(AppError::validation)?;
        let artifacts: Artifacts = parse_blob(&self.artifacts_json, "artifacts")?;
        let progress: ProgressData = parse_blob(&self.progress_json, "progress")?;
        let bmc: BmcData = parse_blob(&self.bmc_json, "bmc")?;
        let vpc: VpcData = parse_blob(&self.vpc_json, "vpc")?;
        let unit_economics: UnitEconomics = parse_blob(&self.unit_economics_json, "unitEconomics")?;

        Ok(ProjectRecord {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            stage,
            artifacts,
            progress,
            bmc,
            vpc,
            unit_economics,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_blob<T: serde::de::DeserializeOwned>(raw: &str, field: &str) -> AppResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        AppError::validation_with_details(
            "Повреждённые данные проекта",
            serde_json::json!({"field": field, "error": err.to_string()}),
        )
    })
}

impl TryFrom<&Row<'_>> for ProjectRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            name: row.get("name")?,
            stage: row.get("stage")?,
            artifacts_json: row.get("artifacts_json")?,
            progress_json: row.get("progress_json")?,
            bmc_json: row.get("bmc_json")?,
            vpc_json: row.get("vpc_json")?,
            unit_economics_json: row.get("unit_economics_json")?,
            scorecard_json: row.get("scorecard_json")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id,
    owner_id,
    name,
    stage,
    artifacts_json,
    progress_json,
    bmc_json,
    vpc_json,
    unit_economics_json,
    scorecard_json,
    created_at,
    updated_at
"#;

pub struct ProjectRepository;

impl ProjectRepository {
    pub fn insert(conn: &Connection, insert: &ProjectInsert) -> AppResult<ProjectRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
                INSERT INTO projects (
                    id, owner_id, name, stage,
                    artifacts_json, progress_json, bmc_json, vpc_json, unit_economics_json,
                    created_at, updated_at
                ) VALUES (
                    :id, :owner_id, :name, :stage,
                    '{}', '{}', '{}', '{}', '{}',
                    :now, :now
                )
            "#,
            named_params! {
                ":id": &id,
                ":owner_id": &insert.owner_id,
                ":name": &insert.name,
                ":stage": insert.stage.as_str(),
                ":now": &now,
            },
        )?;

        Self::find_by_id(conn, &id)?.ok_or_else(AppError::not_found)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<ProjectRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM projects WHERE id = :id"
        ))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| ProjectRow::try_from(row))
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// The user's most recently touched project; the dashboard treats it
    /// as the active one.
    pub fn find_active_for_user(
        conn: &Connection,
        owner_id: &str,
    ) -> AppResult<Option<ProjectRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                SELECT {SELECT_COLUMNS} FROM projects
                WHERE owner_id = :owner_id
                ORDER BY updated_at DESC
                LIMIT 1
            "#
        ))?;

        let row = stmt
            .query_row(named_params! {":owner_id": owner_id}, |row| {
                ProjectRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    pub fn save_artifacts(conn: &Connection, id: &str, artifacts: &Artifacts) -> AppResult<()> {
        Self::save_json_column(conn, id, "artifacts_json", &serde_json::to_string(artifacts)?)
    }

    pub fn save_progress(conn: &Connection, id: &str, progress: &ProgressData) -> AppResult<()> {
        Self::save_json_column(conn, id, "progress_json", &serde_json::to_string(progress)?)
    }

    pub fn save_bmc(conn: &Connection, id: &str, bmc: &BmcData) -> AppResult<()> {
        Self::save_json_column(conn, id, "bmc_json", &serde_json::to_string(bmc)?)
    }

    pub fn save_vpc(conn: &Connection, id: &str, vpc: &VpcData) -> AppResult<()> {
        Self::save_json_column(conn, id, "vpc_json", &serde_json::to_string(vpc)?)
    }

    pub fn save_unit_economics(
        conn: &Connection,
        id: &str,
        unit_economics: &UnitEconomics,
    ) -> AppResult<()> {
        Self::save_json_column(
            conn,
            id,
            "unit_economics_json",
            &serde_json::to_string(unit_economics)?,
        )
    }

    pub fn set_stage(conn: &Connection, id: &str, stage: Stage) -> AppResult<()> {
        let affected = conn.execute(
            "UPDATE projects SET stage = :stage, updated_at = :now WHERE id = :id",
            named_params! {
                ":id": id,
                ":stage": stage.as_str(),
                ":now": Utc::now().to_rfc3339(),
            },
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Persist the latest scorecard snapshot onto the project row.
    pub fn save_scorecard(conn: &Connection, id: &str, scorecard: &Scorecard) -> AppResult<()> {
        Self::save_json_column(conn, id, "scorecard_json", &serde_json::to_string(scorecard)?)
    }

    pub fn latest_scorecard(conn: &Connection, id: &str) -> AppResult<Option<Scorecard>> {
        let raw: Option<Option<String>> = conn
            .query_row(
                "SELECT scorecard_json FROM projects WHERE id = :id",
                named_params! {":id": id},
                |row| row.get(0),
            )
            .optional()?;

        match raw.flatten() {
            Some(json) => Ok(Some(parse_blob(&json, "scorecard")?)),
            None => Ok(None),
        }
    }

    fn save_json_column(conn: &Connection, id: &str, column: &str, value: &str) -> AppResult<()> {
        // column names come from this module only, never from input
        let affected = conn.execute(
            &format!("UPDATE projects SET {column} = :value, updated_at = :now WHERE id = :id"),
            named_params! {
                ":id": id,
                ":value": value,
                ":now": Utc::now().to_rfc3339(),
            },
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
