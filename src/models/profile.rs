use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user_id: String,
    pub display_name: String,
    /// IANA timezone name; `None` falls back to Europe/Moscow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub xp: i64,
    pub level: i64,
    pub streak_count: i64,
    /// YYYY-MM-DD in the user's timezone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    /// Date of the last consumed streak freeze, YYYY-MM-DD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_used_on: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInsert {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub timezone: Option<String>,
}
