use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use super::{CategoryKey, Gender, Scene, ScoringMetadata, SilhouetteSource};

pub const MODEL_VERSION: &str = "v1.2.0";
pub const INVALID_IMAGE: &str = "Invalid image data";

/// Per-category scores, kept in catalog order.
pub type SubscoreMap = IndexMap<CategoryKey, f64>;

/// Rounds to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub request_id: Uuid,
    pub model_version: &'static str,
    pub analyzed_at: DateTime<Utc>,
    pub user_gender: Gender,
    pub intended_scene: Scene,
    pub silhouette_source: SilhouetteSource,
}

impl ResultMetadata {
    pub fn new(metadata: ScoringMetadata, silhouette_source: SilhouetteSource) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            model_version: MODEL_VERSION,
            analyzed_at: Utc::now(),
            user_gender: metadata.user_gender,
            intended_scene: metadata.intended_scene,
            silhouette_source,
        }
    }
}

/// Outcome of one scoring call. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    overall_score: f64,
    subscores: SubscoreMap,
    warnings: Vec<String>,
    metadata: ResultMetadata,
}

impl ScoreResult {
    pub fn new(subscores: SubscoreMap, warnings: Vec<String>, metadata: ResultMetadata) -> Self {
        let overall_score = round_to_tenth(subscores.values().sum());
        Self {
            overall_score,
            subscores,
            warnings,
            metadata,
        }
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn subscores(&self) -> &SubscoreMap {
        &self.subscores
    }

    pub fn subscore(&self, key: CategoryKey) -> Option<f64> {
        self.subscores.get(&key).copied()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreOutcome {
    Scored(ScoreResult),
    Error { error: String },
}

impl ScoreOutcome {
    pub fn invalid_image() -> Self {
        ScoreOutcome::Error {
            error: INVALID_IMAGE.to_string(),
        }
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        match self {
            ScoreOutcome::Scored(result) => Some(result),
            ScoreOutcome::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScoreOutcome::Error { .. })
    }
}

/// Everything produced for one request: numeric outcome, narrative text and chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub score: ScoreOutcome,
    pub ai_feedback: Option<String>,
    pub radar_chart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
    /// Set when the chart was drawn without a font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_warning: Option<String>,
}
