pub mod extractor;
pub mod pose;

pub use extractor::{SilhouetteExtractor, SilhouetteThresholds};
pub use pose::{
    Landmark, LandmarkIndex, LazyPoseModel, PoseDetector, PoseLandmarks, StaticPoseDetector,
    POSE_LANDMARK_COUNT,
};
