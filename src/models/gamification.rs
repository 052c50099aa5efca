use std::fmt;

use serde::{Deserialize, Serialize};

/// A configured level threshold. Definitions are ordered ascending by
/// `min_xp` and always include level 1 at 0 XP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level: i64,
    pub title: String,
    pub min_xp: i64,
    pub icon: String,
}

/// Resolved level state for a given XP amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: i64,
    pub title: String,
    pub icon: String,
    pub xp_into_level: i64,
    pub xp_required_for_next: i64,
    /// 100 when the maximum defined level is reached.
    pub progress_percent: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level_xp: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpCheck {
    pub leveled_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<LevelDefinition>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    Lesson,
    ChecklistItem,
    DailyQuest,
    Achievement,
    Manual,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::Lesson => "lesson",
            XpSource::ChecklistItem => "checklist_item",
            XpSource::DailyQuest => "daily_quest",
            XpSource::Achievement => "achievement",
            XpSource::Manual => "manual",
        }
    }
}

impl fmt::Display for XpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for XpSource {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "lesson" => Ok(XpSource::Lesson),
            "checklist_item" => Ok(XpSource::ChecklistItem),
            "daily_quest" => Ok(XpSource::DailyQuest),
            "achievement" => Ok(XpSource::Achievement),
            "manual" => Ok(XpSource::Manual),
            other => Err(format!("unsupported xp source: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpTransactionRecord {
    pub id: i64,
    pub user_id: String,
    pub amount: i64,
    pub source: XpSource,
    pub created_at: String,
}

/// Result of an XP award, including any level boundary crossing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub old_xp: i64,
    pub new_xp: i64,
    pub leveled_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<LevelDefinition>,
}

/// Streak continuity as seen from "today" in the user's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStatus {
    pub streak_count: i64,
    /// Qualifying activity already recorded today.
    pub active_today: bool,
    /// Yesterday was missed; the streak breaks unless rescued.
    pub at_risk: bool,
    /// A freeze is still available this calendar week.
    pub can_use_freeze: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_milestone: Option<i64>,
}
