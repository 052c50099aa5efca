use std::fmt;

use serde::{Deserialize, Serialize};

/// What the generated daily task asks the founder to do. The kind drives
/// both the action URL and the implicit-completion predicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    FillArtifact,
    FillBmcBlock,
    FillVpcZone,
    CompleteChecklistItem,
    CompleteLesson,
}

impl QuestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestKind::FillArtifact => "fill_artifact",
            QuestKind::FillBmcBlock => "fill_bmc_block",
            QuestKind::FillVpcZone => "fill_vpc_zone",
            QuestKind::CompleteChecklistItem => "complete_checklist_item",
            QuestKind::CompleteLesson => "complete_lesson",
        }
    }

    pub fn xp_reward(&self) -> i64 {
        match self {
            QuestKind::FillArtifact => 20,
            QuestKind::FillBmcBlock | QuestKind::FillVpcZone => 25,
            QuestKind::CompleteChecklistItem | QuestKind::CompleteLesson => 30,
        }
    }
}

impl fmt::Display for QuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for QuestKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "fill_artifact" => Ok(QuestKind::FillArtifact),
            "fill_bmc_block" => Ok(QuestKind::FillBmcBlock),
            "fill_vpc_zone" => Ok(QuestKind::FillVpcZone),
            "complete_checklist_item" => Ok(QuestKind::CompleteChecklistItem),
            "complete_lesson" => Ok(QuestKind::CompleteLesson),
            other => Err(format!("unsupported quest kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestRecord {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    /// YYYY-MM-DD in the user's timezone; one quest per user per date.
    pub quest_date: String,
    pub kind: QuestKind,
    /// Artifact key or checklist item the quest targets, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Fill counter at generation time, for canvas/checklist predicates.
    pub baseline: i64,
    pub quest_label: String,
    pub xp_reward: i64,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub success: bool,
    /// Zero when the quest was already completed; awards are exactly-once.
    pub xp_awarded: i64,
}
