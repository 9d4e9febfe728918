use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::FeedbackError;
use crate::pipeline::types::{ScoreResult, SubscoreMap};

/// Narrative feedback collaborator. Implementations talk to whatever text
/// service is deployed; the engine only needs this one call.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    async fn generate_feedback(
        &self,
        image_base64: &str,
        subscores: &SubscoreMap,
        overall_score: f64,
    ) -> Result<String, FeedbackError>;

    fn name(&self) -> &'static str;
}

/// Provider used when no feedback service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

#[async_trait]
impl FeedbackProvider for NoFeedback {
    async fn generate_feedback(
        &self,
        _image_base64: &str,
        _subscores: &SubscoreMap,
        _overall_score: f64,
    ) -> Result<String, FeedbackError> {
        Err(FeedbackError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

pub fn feedback_placeholder(error: &FeedbackError) -> String {
    format!("AI feedback is unavailable: {}", error)
}

/// Asks `provider` for feedback on a scored image. Failures turn into the
/// placeholder text and never reach the caller.
pub async fn request_feedback(
    provider: &dyn FeedbackProvider,
    image_bytes: &[u8],
    result: &ScoreResult,
) -> String {
    let encoded = STANDARD.encode(image_bytes);

    match provider
        .generate_feedback(&encoded, result.subscores(), result.overall_score())
        .await
    {
        Ok(text) => {
            debug!("{} returned {} characters of feedback", provider.name(), text.len());
            text
        }
        Err(e) => {
            warn!("Feedback from {} failed: {}", provider.name(), e);
            feedback_placeholder(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{
        CategoryKey, ResultMetadata, ScoringMetadata, SilhouetteSource,
    };
    use std::sync::Mutex;

    struct RecordingFeedback {
        seen: Mutex<Option<(String, f64, usize)>>,
    }

    #[async_trait]
    impl FeedbackProvider for RecordingFeedback {
        async fn generate_feedback(
            &self,
            image_base64: &str,
            subscores: &SubscoreMap,
            overall_score: f64,
        ) -> Result<String, FeedbackError> {
            *self.seen.lock().unwrap() =
                Some((image_base64.to_string(), overall_score, subscores.len()));
            Ok("Nice balance of tones.".to_string())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct BrokenFeedback;

    #[async_trait]
    impl FeedbackProvider for BrokenFeedback {
        async fn generate_feedback(
            &self,
            _image_base64: &str,
            _subscores: &SubscoreMap,
            _overall_score: f64,
        ) -> Result<String, FeedbackError> {
            Err(FeedbackError::Request("HTTP 503".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn result() -> ScoreResult {
        let mut subscores = SubscoreMap::new();
        subscores.insert(CategoryKey::ColorHarmony, 15.0);
        subscores.insert(CategoryKey::FitAndSilhouette, 12.5);
        ScoreResult::new(
            subscores,
            vec![],
            ResultMetadata::new(ScoringMetadata::default(), SilhouetteSource::Detected),
        )
    }

    #[tokio::test]
    async fn test_provider_receives_base64_and_scores() {
        let provider = RecordingFeedback {
            seen: Mutex::new(None),
        };
        let text = request_feedback(&provider, b"abc", &result()).await;

        assert_eq!(text, "Nice balance of tones.");
        let seen = provider.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen, ("YWJj".to_string(), 27.5, 2));
    }

    #[tokio::test]
    async fn test_failure_becomes_placeholder() {
        let text = request_feedback(&BrokenFeedback, b"abc", &result()).await;
        assert!(text.starts_with("AI feedback is unavailable: "));
        assert!(text.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_no_feedback_is_unavailable() {
        let text = request_feedback(&NoFeedback, b"", &result()).await;
        assert_eq!(text, feedback_placeholder(&FeedbackError::Unavailable));
    }
}
