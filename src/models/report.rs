use serde::{Deserialize, Serialize};

/// Aggregated summary of the previous Monday-Sunday week. Derived on
/// demand; never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// YYYY-MM-DD of the window's Monday.
    pub week_start: String,
    /// YYYY-MM-DD of the window's Sunday.
    pub week_end: String,
    pub xp_earned: i64,
    pub lessons_completed: i64,
    /// Approximated from XP transactions tagged `checklist_item`; there is
    /// no dedicated checklist-completion event log.
    pub checklist_items_done: i64,
    pub quests_completed: i64,
    pub score_delta: i64,
    pub streak_days: i64,
    pub summary: String,
    pub recommendation: String,
}
