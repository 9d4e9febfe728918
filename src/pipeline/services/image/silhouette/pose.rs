//! Narrow seam around the pose-estimation model.
//!
//! The engine only ever sees [`PoseDetector::detect`]. The model itself is
//! built lazily, at most once, by [`LazyPoseModel`].
use image::RgbImage;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::error::PoseError;

/// Number of landmarks in the full-body pose topology.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Indices of the landmarks the silhouette extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIndex {
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftHip = 23,
    RightHip = 24,
    LeftAnkle = 27,
    RightAnkle = 28,
}

/// Normalized image coordinates (0..1) plus visibility (0..1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub visibility: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility.is_finite()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseLandmarks {
    points: Vec<Landmark>,
}

impl PoseLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Full topology with only the named landmarks visible.
    pub fn from_named(named: &[(LandmarkIndex, Landmark)]) -> Self {
        let mut points = vec![Landmark::new(0.0, 0.0, 0.0); POSE_LANDMARK_COUNT];
        for (index, landmark) in named {
            points[*index as usize] = *landmark;
        }
        Self { points }
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.points.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Pose estimation backend. `Ok(None)` means no person was found.
pub trait PoseDetector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError>;
    fn name(&self) -> &'static str;
}

type PoseFactory = Box<dyn Fn() -> Result<Arc<dyn PoseDetector>, PoseError> + Send + Sync>;

/// Initialize-once holder for the pose model.
///
/// Concurrent first use blocks on the same initialization, so the factory
/// runs at most once. A failed initialization is remembered and every later
/// call sees the same error.
pub struct LazyPoseModel {
    factory: PoseFactory,
    model: OnceLock<Result<Arc<dyn PoseDetector>, PoseError>>,
}

impl LazyPoseModel {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PoseDetector>, PoseError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            model: OnceLock::new(),
        }
    }

    /// A model slot with no backend; every call degrades to default features.
    pub fn disabled() -> Self {
        Self::new(|| Err(PoseError::Unavailable("no pose backend is configured".to_string())))
    }

    pub fn with_detector(detector: Arc<dyn PoseDetector>) -> Self {
        Self::new(move || Ok(detector.clone()))
    }

    pub fn get(&self) -> Result<Arc<dyn PoseDetector>, PoseError> {
        self.model
            .get_or_init(|| match (self.factory)() {
                Ok(model) => {
                    info!("Pose model '{}' initialized", model.name());
                    Ok(model)
                }
                Err(e) => {
                    warn!("Failed to initialize pose model: {}", e);
                    Err(e)
                }
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.model.get().is_some()
    }
}

impl std::fmt::Debug for LazyPoseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.model.get() {
            None => "uninitialized".to_string(),
            Some(Ok(model)) => format!("ready({})", model.name()),
            Some(Err(e)) => format!("failed({})", e),
        };
        f.debug_struct("LazyPoseModel").field("state", &state).finish()
    }
}

impl Default for LazyPoseModel {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Returns the same landmarks for every image. Useful for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPoseDetector {
    landmarks: Option<PoseLandmarks>,
}

impl StaticPoseDetector {
    pub fn new(landmarks: Option<PoseLandmarks>) -> Self {
        Self { landmarks }
    }
}

impl PoseDetector for StaticPoseDetector {
    fn detect(&self, _image: &RgbImage) -> Result<Option<PoseLandmarks>, PoseError> {
        Ok(self.landmarks.clone())
    }

    fn name(&self) -> &'static str {
        "StaticPoseDetector"
    }
}
