use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::gamification::LevelDefinition;

#[derive(Debug, Clone)]
pub struct LevelDefinitionRow {
    pub level: i64,
    pub title: String,
    pub min_xp: i64,
    pub icon: String,
}

impl LevelDefinitionRow {
    pub fn into_record(self) -> LevelDefinition {
        LevelDefinition {
            level: self.level,
            title: self.title,
            min_xp: self.min_xp,
            icon: self.icon,
        }
    }
}

impl TryFrom<&Row<'_>> for LevelDefinitionRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            level: row.get("level")?,
            title: row.get("title")?,
            min_xp: row.get("min_xp")?,
            icon: row.get("icon")?,
        })
    }
}

pub struct LevelRepository;

impl LevelRepository {
    pub fn list(conn: &Connection) -> AppResult<Vec<LevelDefinition>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT level, title, min_xp, icon
                FROM level_definitions
                ORDER BY min_xp ASC
            "#,
        )?;

        let records = stmt
            .query_map([], |row| LevelDefinitionRow::try_from(row))?
            .map(|row| row.map_err(AppError::from).map(LevelDefinitionRow::into_record))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn replace_all(conn: &Connection, definitions: &[LevelDefinition]) -> AppResult<()> {
        conn.execute("DELETE FROM level_definitions", [])?;
        for definition in definitions {
            conn.execute(
                r#"
                    INSERT INTO level_definitions (level, title, min_xp, icon)
                    VALUES (:level, :title, :min_xp, :icon)
                "#,
                named_params! {
                    ":level": definition.level,
                    ":title": &definition.title,
                    ":min_xp": definition.min_xp,
                    ":icon": &definition.icon,
                },
            )?;
        }
        Ok(())
    }
}
