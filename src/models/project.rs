use std::fmt;

use serde::{Deserialize, Serialize};

/// Five ordered startup-maturity phases. The order is part of the contract:
/// quest generation and scoring both walk stages front to back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idea,
    Validation,
    BusinessModel,
    Mvp,
    Pitch,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Idea,
        Stage::Validation,
        Stage::BusinessModel,
        Stage::Mvp,
        Stage::Pitch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idea => "idea",
            Stage::Validation => "validation",
            Stage::BusinessModel => "business_model",
            Stage::Mvp => "mvp",
            Stage::Pitch => "pitch",
        }
    }

    /// Checklist item keys for this stage. The web app renders these as the
    /// stage checklist; `ProgressData` stores which of them are completed.
    pub fn checklist(&self) -> &'static [&'static str] {
        match self {
            Stage::Idea => &["define_problem", "describe_audience", "formulate_idea"],
            Stage::Validation => &["hypotheses", "custdev_interviews", "validate_problem"],
            Stage::BusinessModel => &["fill_bmc", "unit_economics", "revenue_model"],
            Stage::Mvp => &["mvp_scope", "build_mvp", "first_users"],
            Stage::Pitch => &["pitch_structure", "pitch_deck", "rehearse"],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "idea" => Ok(Stage::Idea),
            "validation" => Ok(Stage::Validation),
            "business_model" => Ok(Stage::BusinessModel),
            "mvp" => Ok(Stage::Mvp),
            "pitch" => Ok(Stage::Pitch),
            other => Err(format!("unsupported stage: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl Default for StageStatus {
    fn default() -> Self {
        StageStatus::NotStarted
    }
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::NotStarted => "not_started",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for StageStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "not_started" => Ok(StageStatus::NotStarted),
            "in_progress" => Ok(StageStatus::InProgress),
            "completed" => Ok(StageStatus::Completed),
            other => Err(format!("unsupported stage status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StageProgress {
    #[serde(default)]
    pub status: StageStatus,
    #[serde(default)]
    pub completed_items: Vec<String>,
}

impl StageProgress {
    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// Completed items that belong to `stage`'s canonical checklist.
    /// Unknown keys are ignored rather than counted.
    pub fn completed_known_items(&self, stage: Stage) -> usize {
        let known = stage.checklist();
        self.completed_items
            .iter()
            .filter(|item| known.contains(&item.as_str()))
            .count()
    }

    pub fn has_item(&self, key: &str) -> bool {
        self.completed_items.iter().any(|item| item == key)
    }
}

/// Per-stage progress. One optional slot per canonical stage key; unknown
/// keys are rejected at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ProgressData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea: Option<StageProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<StageProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_model: Option<StageProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp: Option<StageProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<StageProgress>,
}

impl ProgressData {
    pub fn stage(&self, stage: Stage) -> Option<&StageProgress> {
        match stage {
            Stage::Idea => self.idea.as_ref(),
            Stage::Validation => self.validation.as_ref(),
            Stage::BusinessModel => self.business_model.as_ref(),
            Stage::Mvp => self.mvp.as_ref(),
            Stage::Pitch => self.pitch.as_ref(),
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageProgress {
        let slot = match stage {
            Stage::Idea => &mut self.idea,
            Stage::Validation => &mut self.validation,
            Stage::BusinessModel => &mut self.business_model,
            Stage::Mvp => &mut self.mvp,
            Stage::Pitch => &mut self.pitch,
        };
        slot.get_or_insert_with(StageProgress::default)
    }
}

/// Free-text project artifacts. Explicit named fields instead of a
/// string-keyed map; unknown keys are rejected at the persistence boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Artifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_causes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_segments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_adopters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tam_sam_som: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competitors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hypotheses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_results: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custdev_results: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck: Option<String>,
}

fn present(field: &Option<String>) -> bool {
    field
        .as_deref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

impl Artifacts {
    pub fn has_problem(&self) -> bool {
        present(&self.problem)
    }

    pub fn has_problem_causes(&self) -> bool {
        present(&self.problem_causes)
    }

    pub fn has_problem_evidence(&self) -> bool {
        present(&self.problem_evidence)
    }

    pub fn has_target_audience(&self) -> bool {
        present(&self.target_audience)
    }

    pub fn has_audience_segments(&self) -> bool {
        present(&self.audience_segments)
    }

    pub fn has_early_adopters(&self) -> bool {
        present(&self.early_adopters)
    }

    pub fn has_market_size(&self) -> bool {
        present(&self.market_size)
    }

    pub fn has_tam_sam_som(&self) -> bool {
        present(&self.tam_sam_som)
    }

    pub fn has_competitors(&self) -> bool {
        self.competitors.iter().any(|entry| !entry.trim().is_empty())
    }

    pub fn has_hypotheses(&self) -> bool {
        self.hypotheses.iter().any(|entry| !entry.trim().is_empty())
    }

    pub fn has_experiment_results(&self) -> bool {
        present(&self.experiment_results)
    }

    pub fn has_custdev_results(&self) -> bool {
        present(&self.custdev_results)
    }

    pub fn has_interview_notes(&self) -> bool {
        present(&self.interview_notes)
    }

    pub fn has_revenue_model(&self) -> bool {
        present(&self.revenue_model)
    }

    pub fn has_mvp_description(&self) -> bool {
        present(&self.mvp_description)
    }

    pub fn has_pitch_deck(&self) -> bool {
        present(&self.pitch_deck)
    }
}

/// The nine Business Model Canvas blocks, each a list of sticky notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BmcData {
    #[serde(default)]
    pub key_partners: Vec<String>,
    #[serde(default)]
    pub key_activities: Vec<String>,
    #[serde(default)]
    pub key_resources: Vec<String>,
    #[serde(default)]
    pub value_propositions: Vec<String>,
    #[serde(default)]
    pub customer_relationships: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub customer_segments: Vec<String>,
    #[serde(default)]
    pub cost_structure: Vec<String>,
    #[serde(default)]
    pub revenue_streams: Vec<String>,
}

pub const BMC_BLOCK_COUNT: usize = 9;

impl BmcData {
    fn blocks(&self) -> [&Vec<String>; BMC_BLOCK_COUNT] {
        [
            &self.key_partners,
            &self.key_activities,
            &self.key_resources,
            &self.value_propositions,
            &self.customer_relationships,
            &self.channels,
            &self.customer_segments,
            &self.cost_structure,
            &self.revenue_streams,
        ]
    }

    /// Number of blocks with at least one non-empty note.
    pub fn filled_blocks(&self) -> usize {
        self.blocks()
            .iter()
            .filter(|notes| notes.iter().any(|note| !note.trim().is_empty()))
            .count()
    }
}

/// The six Value Proposition Canvas zones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VpcData {
    #[serde(default)]
    pub customer_jobs: Vec<String>,
    #[serde(default)]
    pub pains: Vec<String>,
    #[serde(default)]
    pub gains: Vec<String>,
    #[serde(default)]
    pub products_services: Vec<String>,
    #[serde(default)]
    pub pain_relievers: Vec<String>,
    #[serde(default)]
    pub gain_creators: Vec<String>,
}

pub const VPC_ZONE_COUNT: usize = 6;

impl VpcData {
    fn zones(&self) -> [&Vec<String>; VPC_ZONE_COUNT] {
        [
            &self.customer_jobs,
            &self.pains,
            &self.gains,
            &self.products_services,
            &self.pain_relievers,
            &self.gain_creators,
        ]
    }

    pub fn filled_zones(&self) -> usize {
        self.zones()
            .iter()
            .filter(|notes| notes.iter().any(|note| !note.trim().is_empty()))
            .count()
    }
}

/// Unit-economics numeric inputs entered in the calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnitEconomics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_check: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cac: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cogs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_customers: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub stage: Stage,
    pub artifacts: Artifacts,
    pub progress: ProgressData,
    pub bmc: BmcData,
    pub vpc: VpcData,
    pub unit_economics: UnitEconomics,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInsert {
    pub owner_id: String,
    pub name: String,
    #[serde(default = "default_stage")]
    pub stage: Stage,
}

fn default_stage() -> Stage {
    Stage::Idea
}
