use serde::Serialize;

pub const HUE_BINS: usize = 180;
pub const SATURATION_BINS: usize = 256;

/// 2-D histogram over (hue, saturation), OpenCV 8-bit HSV ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct HueSaturationHistogram {
    bins: Vec<u32>,
}

impl HueSaturationHistogram {
    pub fn new() -> Self {
        Self {
            bins: vec![0; HUE_BINS * SATURATION_BINS],
        }
    }

    pub fn increment(&mut self, hue: u8, saturation: u8) {
        let hue = (hue as usize).min(HUE_BINS - 1);
        self.bins[hue * SATURATION_BINS + saturation as usize] += 1;
    }

    pub fn count(&self, hue: u8, saturation: u8) -> u32 {
        let hue = hue as usize;
        if hue >= HUE_BINS {
            return 0;
        }
        self.bins[hue * SATURATION_BINS + saturation as usize]
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }
}

impl Default for HueSaturationHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorFeatures {
    pub histogram: HueSaturationHistogram,
    pub primary_colors_count: u32,
    pub avg_saturation_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilhouetteFeatures {
    pub shoulder_to_height_ratio: f64,
    pub hip_to_height_ratio: f64,
    pub is_oversized: bool,
    pub detection_confidence: f64,
    pub jacket_fit_score: f64,
}

impl Default for SilhouetteFeatures {
    fn default() -> Self {
        Self {
            shoulder_to_height_ratio: 0.25,
            hip_to_height_ratio: 0.3,
            is_oversized: false,
            detection_confidence: 0.0,
            jacket_fit_score: 0.0,
        }
    }
}

/// Where the silhouette features came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SilhouetteSource {
    Detected,
    ModelUnavailable,
    DetectionFailed,
    NoPose,
    LowConfidence,
}

impl SilhouetteSource {
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            SilhouetteSource::Detected => None,
            SilhouetteSource::ModelUnavailable => {
                Some("Pose model is unavailable; fit and silhouette use default proportions.")
            }
            SilhouetteSource::DetectionFailed => {
                Some("Pose detection failed; fit and silhouette use default proportions.")
            }
            SilhouetteSource::NoPose => {
                Some("No person was detected; fit and silhouette use default proportions.")
            }
            SilhouetteSource::LowConfidence => Some(concat!(
                "Shoulders and ankles were not clearly visible; ",
                "fit and silhouette use default proportions."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilhouetteAnalysis {
    pub features: SilhouetteFeatures,
    pub source: SilhouetteSource,
}

impl SilhouetteAnalysis {
    pub fn fallback(source: SilhouetteSource) -> Self {
        Self {
            features: SilhouetteFeatures::default(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let mut hist = HueSaturationHistogram::new();
        hist.increment(10, 200);
        hist.increment(10, 200);
        hist.increment(179, 0);
        assert_eq!(hist.count(10, 200), 2);
        assert_eq!(hist.count(179, 0), 1);
        assert_eq!(hist.count(200, 0), 0);
        assert_eq!(hist.total(), 3);
        assert_eq!(hist.count(HUE_BINS as u8 - 1, u8::MAX), 0);
    }

    #[test]
    fn test_default_silhouette_features() {
        let features = SilhouetteFeatures::default();
        assert_eq!(features.shoulder_to_height_ratio, 0.25);
        assert_eq!(features.hip_to_height_ratio, 0.3);
        assert!(!features.is_oversized);
        assert_eq!(features.detection_confidence, 0.0);
        assert_eq!(features.jacket_fit_score, 0.0);
    }

    #[test]
    fn test_only_detected_source_is_silent() {
        assert!(SilhouetteSource::Detected.warning().is_none());
        assert!(SilhouetteSource::LowConfidence.warning().is_some());
    }
}
