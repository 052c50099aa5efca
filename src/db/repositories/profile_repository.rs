use chrono::Utc;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::profile::{ProfileInsert, ProfileRecord};

#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub user_id: String,
    pub display_name: String,
    pub timezone: Option<String>,
    pub xp: i64,
    pub level: i64,
    pub streak_count: i64,
    pub last_activity_date: Option<String>,
    pub freeze_used_on: Option<String>,
    pub created_at: String,
}

impl ProfileRow {
    pub fn into_record(self) -> ProfileRecord {
        ProfileRecord {
            user_id: self.user_id,
            display_name: self.display_name,
            timezone: self.timezone,
            xp: self.xp,
            level: self.level,
            streak_count: self.streak_count,
            last_activity_date: self.last_activity_date,
            freeze_used_on: self.freeze_used_on,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for ProfileRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.get("user_id")?,
            display_name: row.get("display_name")?,
            timezone: row.get("timezone")?,
            xp: row.get("xp")?,
            level: row.get("level")?,
            streak_count: row.get("streak_count")?,
            last_activity_date: row.get("last_activity_date")?,
            freeze_used_on: row.get("freeze_used_on")?,
            created_at: row.get("created_at")?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    user_id,
    display_name,
    timezone,
    xp,
    level,
    streak_count,
    last_activity_date,
    freeze_used_on,
    created_at
"#;

pub struct ProfileRepository;

impl ProfileRepository {
    /// Insert-if-absent, then return the row. First touch of a user
    /// bootstraps defaults (level 1, zero XP, no streak).
    pub fn ensure(conn: &Connection, insert: &ProfileInsert) -> AppResult<ProfileRecord> {
        conn.execute(
            r#"
                INSERT OR IGNORE INTO profiles (user_id, display_name, timezone, created_at)
                VALUES (:user_id, :display_name, :timezone, :now)
            "#,
            named_params! {
                ":user_id": &insert.user_id,
                ":display_name": &insert.display_name,
                ":timezone": &insert.timezone,
                ":now": Utc::now().to_rfc3339(),
            },
        )?;

        Self::find(conn, &insert.user_id)?.ok_or_else(AppError::not_found)
    }

    pub fn find(conn: &Connection, user_id: &str) -> AppResult<Option<ProfileRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM profiles WHERE user_id = :user_id"
        ))?;

        let row = stmt
            .query_row(named_params! {":user_id": user_id}, |row| {
                ProfileRow::try_from(row)
            })
            .optional()?;

        Ok(row.map(ProfileRow::into_record))
    }

    /// Atomically bump XP and return (old, new).
    pub fn add_xp(conn: &Connection, user_id: &str, amount: i64) -> AppResult<(i64, i64)> {
        let old_xp: i64 = conn
            .query_row(
                "SELECT xp FROM profiles WHERE user_id = :user_id",
                named_params! {":user_id": user_id},
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(AppError::not_found)?;

        // never let XP go negative, it flows straight into the UI
        let new_xp = (old_xp + amount).max(0);
        conn.execute(
            "UPDATE profiles SET xp = :xp WHERE user_id = :user_id",
            named_params! {":user_id": user_id, ":xp": new_xp},
        )?;

        Ok((old_xp, new_xp))
    }

    pub fn set_level(conn: &Connection, user_id: &str, level: i64) -> AppResult<()> {
        let affected = conn.execute(
            "UPDATE profiles SET level = :level WHERE user_id = :user_id",
            named_params! {":user_id": user_id, ":level": level},
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn update_streak(
        conn: &Connection,
        user_id: &str,
        streak_count: i64,
        last_activity_date: &str,
    ) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE profiles SET
                    streak_count = :streak_count,
                    last_activity_date = :last_activity_date
                WHERE user_id = :user_id
            "#,
            named_params! {
                ":user_id": user_id,
                ":streak_count": streak_count,
                ":last_activity_date": last_activity_date,
            },
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Consume the weekly freeze: the missed day counts as covered, so
    /// `last_activity_date` moves onto it.
    pub fn record_freeze(
        conn: &Connection,
        user_id: &str,
        freeze_used_on: &str,
        covered_date: &str,
    ) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE profiles SET
                    freeze_used_on = :freeze_used_on,
                    last_activity_date = :covered_date
                WHERE user_id = :user_id
            "#,
            named_params! {
                ":user_id": user_id,
                ":freeze_used_on": freeze_used_on,
                ":covered_date": covered_date,
            },
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn set_timezone(conn: &Connection, user_id: &str, timezone: Option<&str>) -> AppResult<()> {
        let affected = conn.execute(
            "UPDATE profiles SET timezone = :timezone WHERE user_id = :user_id",
            named_params! {":user_id": user_id, ":timezone": timezone},
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
