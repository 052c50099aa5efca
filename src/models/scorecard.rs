use std::fmt;

use serde::{Deserialize, Serialize};

/// The ten scored startup-health criteria.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ProblemClarity,
    TargetAudience,
    IdeaValidation,
    MarketSize,
    Custdev,
    Bmc,
    Vpc,
    UnitEconomics,
    MvpDefinition,
    Pitch,
}

impl Criterion {
    pub const ALL: [Criterion; 10] = [
        Criterion::ProblemClarity,
        Criterion::TargetAudience,
        Criterion::IdeaValidation,
        Criterion::MarketSize,
        Criterion::Custdev,
        Criterion::Bmc,
        Criterion::Vpc,
        Criterion::UnitEconomics,
        Criterion::MvpDefinition,
        Criterion::Pitch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::ProblemClarity => "problem_clarity",
            Criterion::TargetAudience => "target_audience",
            Criterion::IdeaValidation => "idea_validation",
            Criterion::MarketSize => "market_size",
            Criterion::Custdev => "custdev",
            Criterion::Bmc => "bmc",
            Criterion::Vpc => "vpc",
            Criterion::UnitEconomics => "unit_economics",
            Criterion::MvpDefinition => "mvp_definition",
            Criterion::Pitch => "pitch",
        }
    }

    /// Fixed importance weight. CustDev, problem and audience clarity are
    /// leading indicators of founder diligence and weigh the most.
    pub fn weight(&self) -> f64 {
        match self {
            Criterion::Custdev => 1.3,
            Criterion::ProblemClarity | Criterion::TargetAudience => 1.2,
            Criterion::IdeaValidation => 1.1,
            Criterion::Bmc | Criterion::UnitEconomics | Criterion::MvpDefinition => 1.0,
            Criterion::MarketSize | Criterion::Vpc | Criterion::Pitch => 0.8,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Criterion {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "problem_clarity" => Ok(Criterion::ProblemClarity),
            "target_audience" => Ok(Criterion::TargetAudience),
            "idea_validation" => Ok(Criterion::IdeaValidation),
            "market_size" => Ok(Criterion::MarketSize),
            "custdev" => Ok(Criterion::Custdev),
            "bmc" => Ok(Criterion::Bmc),
            "vpc" => Ok(Criterion::Vpc),
            "unit_economics" => Ok(Criterion::UnitEconomics),
            "mvp_definition" => Ok(Criterion::MvpDefinition),
            "pitch" => Ok(Criterion::Pitch),
            other => Err(format!("unsupported criterion: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScore {
    pub criterion: Criterion,
    /// Clamped to [0, 100].
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub criteria: Vec<CriterionScore>,
    /// Weights-normalized average, rounded, in [0, 100].
    pub total: i64,
}

impl Scorecard {
    pub fn score_of(&self, criterion: Criterion) -> Option<i64> {
        self.criteria
            .iter()
            .find(|entry| entry.criterion == criterion)
            .map(|entry| entry.score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardHistoryEntry {
    pub id: i64,
    pub project_id: String,
    pub total: i64,
    pub criteria: Vec<CriterionScore>,
    pub created_at: String,
}
