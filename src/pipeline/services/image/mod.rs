pub mod color_analysis_service;
pub mod silhouette;

pub use color_analysis_service::ColorAnalysisService;
pub use silhouette::{LazyPoseModel, PoseDetector, SilhouetteExtractor};
