pub mod rules;
pub mod services;
pub mod types;

pub use rules::RuleTables;
pub use services::{FashionScorer, ScoringRequest, ScoringService};
pub use types::{AnalysisReport, ScoreOutcome, ScoreResult, ScoringMetadata};
