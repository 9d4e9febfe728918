use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, warn};

use super::pose::{Landmark, LandmarkIndex, LazyPoseModel, PoseLandmarks};
use crate::pipeline::rules::BiasTable;
use crate::pipeline::types::{Gender, SilhouetteAnalysis, SilhouetteFeatures, SilhouetteSource};

/// Guards against near-degenerate poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilhouetteThresholds {
    pub min_visibility: f64,
    pub min_body_height: f64,
}

impl Default for SilhouetteThresholds {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            min_body_height: 0.1,
        }
    }
}

/// Estimates body proportions from pose landmarks. Never fails: any problem
/// yields the default feature set tagged with the reason.
#[derive(Debug)]
pub struct SilhouetteExtractor {
    model: Arc<LazyPoseModel>,
    thresholds: SilhouetteThresholds,
}

impl SilhouetteExtractor {
    pub fn new(model: Arc<LazyPoseModel>) -> Self {
        Self {
            model,
            thresholds: SilhouetteThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: SilhouetteThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn extract(
        &self,
        image: &DynamicImage,
        gender: Gender,
        bias: &BiasTable,
    ) -> SilhouetteAnalysis {
        let detector = match self.model.get() {
            Ok(detector) => detector,
            Err(_) => return SilhouetteAnalysis::fallback(SilhouetteSource::ModelUnavailable),
        };

        let rgb = image.to_rgb8();
        let landmarks = match detector.detect(&rgb) {
            Ok(Some(landmarks)) if !landmarks.is_empty() => landmarks,
            Ok(_) => {
                debug!("{} found no pose", detector.name());
                return SilhouetteAnalysis::fallback(SilhouetteSource::NoPose);
            }
            Err(e) => {
                warn!("{} failed: {}", detector.name(), e);
                return SilhouetteAnalysis::fallback(SilhouetteSource::DetectionFailed);
            }
        };

        self.features_from_landmarks(&landmarks, gender, bias)
    }

    pub fn features_from_landmarks(
        &self,
        landmarks: &PoseLandmarks,
        gender: Gender,
        bias: &BiasTable,
    ) -> SilhouetteAnalysis {
        let low_confidence = SilhouetteAnalysis::fallback(SilhouetteSource::LowConfidence);

        let required = [
            LandmarkIndex::LeftShoulder,
            LandmarkIndex::RightShoulder,
            LandmarkIndex::LeftAnkle,
            LandmarkIndex::RightAnkle,
        ]
        .map(|index| self.visible(landmarks, index));

        let [Some(left_shoulder), Some(right_shoulder), Some(left_ankle), Some(right_ankle)] =
            required
        else {
            return low_confidence;
        };

        let avg_shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.0;
        let avg_ankle_y = (left_ankle.y + right_ankle.y) / 2.0;
        let estimated_height = (avg_ankle_y - avg_shoulder_y).abs();
        if !(estimated_height >= self.thresholds.min_body_height) {
            return low_confidence;
        }

        let shoulder_ratio = (left_shoulder.x - right_shoulder.x).abs() / estimated_height;
        let detection_confidence = ((left_shoulder.visibility
            + right_shoulder.visibility
            + left_ankle.visibility
            + right_ankle.visibility)
            / 4.0)
            .clamp(0.0, 1.0);

        let hip_ratio = match (
            self.visible(landmarks, LandmarkIndex::LeftHip),
            self.visible(landmarks, LandmarkIndex::RightHip),
        ) {
            (Some(left_hip), Some(right_hip)) => {
                (left_hip.x - right_hip.x).abs() / estimated_height
            }
            _ => SilhouetteFeatures::default().hip_to_height_ratio,
        };

        let range = bias.range_for(gender);
        let features = SilhouetteFeatures {
            shoulder_to_height_ratio: shoulder_ratio,
            hip_to_height_ratio: hip_ratio,
            is_oversized: shoulder_ratio > range.upper,
            detection_confidence,
            jacket_fit_score: (1.0 - (shoulder_ratio - range.midpoint()).abs()).clamp(0.0, 1.0),
        };

        debug!(
            "Silhouette ratio {:.3} (target {:.2}..{:.2}), oversized={}",
            shoulder_ratio, range.lower, range.upper, features.is_oversized
        );

        SilhouetteAnalysis {
            features,
            source: SilhouetteSource::Detected,
        }
    }

    /// The landmark, if present, finite and visible enough.
    fn visible<'a>(
        &self,
        landmarks: &'a PoseLandmarks,
        index: LandmarkIndex,
    ) -> Option<&'a Landmark> {
        landmarks
            .get(index)
            .filter(|l| l.is_finite() && l.visibility >= self.thresholds.min_visibility)
    }
}
