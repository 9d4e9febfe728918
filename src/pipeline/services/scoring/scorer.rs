use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fallback::FallbackPolicy;
use crate::config::Settings;
use crate::error::AppError;
use crate::pipeline::rules::RuleTables;
use crate::pipeline::services::image::silhouette::SilhouetteThresholds;
use crate::pipeline::services::image::{ColorAnalysisService, LazyPoseModel, SilhouetteExtractor};
use crate::pipeline::services::preprocessing::{preprocess_image, DEFAULT_MAX_SIDE};
use crate::pipeline::types::{
    round_to_tenth, CategoryKey, ColorFeatures, ResultMetadata, ScoreOutcome, ScoreResult,
    ScoringMetadata, SilhouetteAnalysis, SilhouetteFeatures, SubscoreMap,
};

/// Turns an outfit photo into a bounded score vector.
#[derive(Debug)]
pub struct FashionScorer {
    rules: Arc<RuleTables>,
    color_analysis: ColorAnalysisService,
    silhouette: SilhouetteExtractor,
    fallback: FallbackPolicy,
    max_side: u32,
}

impl FashionScorer {
    pub fn new(rules: Arc<RuleTables>, pose_model: Arc<LazyPoseModel>) -> Self {
        Self {
            rules,
            color_analysis: ColorAnalysisService::new(),
            silhouette: SilhouetteExtractor::new(pose_model),
            fallback: FallbackPolicy::default(),
            max_side: DEFAULT_MAX_SIDE,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        pose_model: Arc<LazyPoseModel>,
    ) -> Result<Self, AppError> {
        let rules = RuleTables::standard(settings.analysis.locale);
        rules.validate().map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!("Invalid rules: {}", e)))
        })?;

        let thresholds = SilhouetteThresholds {
            min_visibility: settings.pose.min_visibility,
            min_body_height: settings.pose.min_body_height,
        };

        Ok(Self::new(Arc::new(rules), pose_model)
            .with_fallback(settings.fallback_policy())
            .with_max_side(settings.analysis.max_side)
            .with_thresholds(thresholds))
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    pub fn with_thresholds(mut self, thresholds: SilhouetteThresholds) -> Self {
        self.silhouette = self.silhouette.with_thresholds(thresholds);
        self
    }

    pub fn rules(&self) -> &Arc<RuleTables> {
        &self.rules
    }

    /// Decodes and scores `image_bytes`. Undecodable input is the only error outcome.
    pub fn analyze(&self, image_bytes: &[u8], metadata: ScoringMetadata) -> ScoreOutcome {
        let image = match image::load_from_memory(image_bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("Rejecting upload of {} bytes: {}", image_bytes.len(), e);
                return ScoreOutcome::invalid_image();
            }
        };

        let image = preprocess_image(image, self.max_side);
        let color = self.color_analysis.analyze_colors(&image);
        let silhouette = self
            .silhouette
            .extract(&image, metadata.user_gender, &self.rules.bias);

        ScoreOutcome::Scored(self.score(&color, &silhouette, metadata, image_bytes))
    }

    /// Scores already-extracted features. `seed_bytes` feeds content-seeded fallbacks.
    pub fn score(
        &self,
        color: &ColorFeatures,
        silhouette: &SilhouetteAnalysis,
        metadata: ScoringMetadata,
        seed_bytes: &[u8],
    ) -> ScoreResult {
        let mut sampler = self.fallback.sampler(seed_bytes);
        let mut subscores = SubscoreMap::with_capacity(self.rules.catalog.len());

        for category in self.rules.catalog.iter() {
            let score = match category.key {
                CategoryKey::ColorHarmony => self.score_color_harmony(color, category.max_weight),
                CategoryKey::FitAndSilhouette => {
                    self.score_fit_and_silhouette(&silhouette.features, category.max_weight)
                }
                _ => sampler.score(category.max_weight),
            };
            subscores.insert(category.key, score);
        }

        let mut warnings: Vec<String> = silhouette
            .source
            .warning()
            .map(str::to_string)
            .into_iter()
            .collect();
        if let Some(rule) = self.rules.scenes.rule_for(metadata.intended_scene) {
            warnings.extend(rule.advise(metadata.intended_scene, color, &silhouette.features));
        }

        let result = ScoreResult::new(
            subscores,
            warnings,
            ResultMetadata::new(metadata, silhouette.source),
        );

        info!(
            "Scored outfit {}: overall={} ({} warnings)",
            result.metadata().request_id,
            result.overall_score(),
            result.warnings().len()
        );
        debug!("Subscores: {:?}", result.subscores());

        result
    }

    pub fn score_color_harmony(&self, color: &ColorFeatures, max_weight: f64) -> f64 {
        let rule = &self.rules.color;
        let count = color.primary_colors_count;

        let color_term = if count <= rule.max_acceptable_colors {
            rule.color_credit * (1.0 - count as f64 / rule.max_acceptable_colors as f64 * 0.5)
        } else {
            rule.too_many_colors_credit
        };

        let (low, high) = rule.saturation_window;
        let saturation = color.avg_saturation_ratio;
        let saturation_term = if low < saturation && saturation < high {
            rule.saturation_full_credit
        } else if saturation <= low {
            rule.muted_credit
        } else {
            rule.vivid_credit
        };

        bounded(color_term + saturation_term, max_weight)
    }

    pub fn score_fit_and_silhouette(&self, features: &SilhouetteFeatures, max_weight: f64) -> f64 {
        let rule = &self.rules.fit;

        let mut score = if features.is_oversized {
            (max_weight - rule.oversized_penalty).max(0.0)
        } else {
            rule.base_credit
        };
        if features.jacket_fit_score > rule.jacket_fit_threshold {
            score += rule.jacket_fit_bonus;
        }

        bounded(score, max_weight)
    }
}

/// Clamps into `0..=max_weight` and rounds to one decimal.
fn bounded(score: f64, max_weight: f64) -> f64 {
    round_to_tenth(score.min(max_weight).max(0.0))
}
