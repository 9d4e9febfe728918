mod fallback;
mod scorer;
mod scoring_service;

pub use fallback::{FallbackPolicy, FallbackSampler, FALLBACK_MAX_RATIO, FALLBACK_MIN_RATIO};
pub use scorer::FashionScorer;
pub use scoring_service::{ScoringRequest, ScoringService, UNLABELED_CHART};
