use rusqlite::{named_params, Connection, Row};

use crate::error::{AppError, AppResult};
use crate::models::gamification::{XpSource, XpTransactionRecord};

#[derive(Debug, Clone)]
pub struct XpTransactionRow {
    pub id: i64,
    pub user_id: String,
    pub amount: i64,
    pub source: String,
    pub created_at: String,
}

impl XpTransactionRow {
    pub fn into_record(self) -> AppResult<XpTransactionRecord> {
        let source = XpSource::try_from(self.source.as_str()).map_err(AppError::validation)?;
        Ok(XpTransactionRecord {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            source,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<&Row<'_>> for XpTransactionRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            amount: row.get("amount")?,
            source: row.get("source")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct XpRepository;

impl XpRepository {
    pub fn insert(
        conn: &Connection,
        user_id: &str,
        amount: i64,
        source: XpSource,
        created_at: &str,
    ) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO xp_transactions (user_id, amount, source, created_at)
                VALUES (:user_id, :amount, :source, :created_at)
            "#,
            named_params! {
                ":user_id": user_id,
                ":amount": amount,
                ":source": source.as_str(),
                ":created_at": created_at,
            },
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Sum of XP amounts in `[start, end)` (RFC 3339 bounds).
    pub fn sum_between(
        conn: &Connection,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> AppResult<i64> {
        let total: i64 = conn.query_row(
            r#"
                SELECT COALESCE(SUM(amount), 0) FROM xp_transactions
                WHERE user_id = :user_id
                  AND created_at >= :start
                  AND created_at < :end
            "#,
            named_params! {":user_id": user_id, ":start": start, ":end": end},
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn count_by_source_between(
        conn: &Connection,
        user_id: &str,
        source: XpSource,
        start: &str,
        end: &str,
    ) -> AppResult<i64> {
        let count: i64 = conn.query_row(
            r#"
                SELECT COUNT(*) FROM xp_transactions
                WHERE user_id = :user_id
                  AND source = :source
                  AND created_at >= :start
                  AND created_at < :end
            "#,
            named_params! {
                ":user_id": user_id,
                ":source": source.as_str(),
                ":start": start,
                ":end": end,
            },
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<XpTransactionRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, user_id, amount, source, created_at
                FROM xp_transactions
                WHERE user_id = :user_id
                ORDER BY created_at DESC
            "#,
        )?;

        let records = stmt
            .query_map(named_params! {":user_id": user_id}, |row| {
                XpTransactionRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
