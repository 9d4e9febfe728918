pub mod chart;
pub mod feedback;
pub mod image;
pub mod preprocessing;
pub mod scoring;

pub use chart::{RadarChart, RadarRenderer};
pub use feedback::{FeedbackProvider, NoFeedback};
pub use image::{ColorAnalysisService, LazyPoseModel, PoseDetector, SilhouetteExtractor};
pub use scoring::{FallbackPolicy, FashionScorer, ScoringRequest, ScoringService};
