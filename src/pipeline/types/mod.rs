mod features;
mod metadata;
mod score_category;
mod score_result;

pub use features::{
    ColorFeatures, HueSaturationHistogram, SilhouetteAnalysis, SilhouetteFeatures,
    SilhouetteSource, HUE_BINS, SATURATION_BINS,
};
pub use metadata::{Gender, Scene, ScoringMetadata};
pub use score_category::{CategoryCatalog, CategoryKey, Locale, ScoreCategory};
pub use score_result::{
    round_to_tenth, AnalysisReport, ResultMetadata, ScoreOutcome, ScoreResult, SubscoreMap,
    INVALID_IMAGE, MODEL_VERSION,
};
