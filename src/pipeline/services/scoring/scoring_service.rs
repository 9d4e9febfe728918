use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{info, warn};

use super::scorer::FashionScorer;
use crate::config::Settings;
use crate::error::AppError;
use crate::pipeline::services::chart::RadarRenderer;
use crate::pipeline::services::feedback::{request_feedback, FeedbackProvider, NoFeedback};
use crate::pipeline::services::image::LazyPoseModel;
use crate::pipeline::types::{AnalysisReport, ScoreOutcome, ScoringMetadata};

/// Report note for a chart drawn without a font.
pub const UNLABELED_CHART: &str =
    "Radar chart has no title or axis labels; set chart.font_path to draw them";

#[derive(Debug, Clone)]
pub struct ScoringRequest {
    pub image: Vec<u8>,
    pub metadata: ScoringMetadata,
}

impl ScoringRequest {
    pub fn new(image: Vec<u8>, metadata: ScoringMetadata) -> Self {
        Self { image, metadata }
    }
}

/// Runs one upload end to end: score, feedback, then the optional chart.
#[derive(Clone)]
pub struct ScoringService {
    scorer: Arc<FashionScorer>,
    feedback: Arc<dyn FeedbackProvider>,
    renderer: Option<Arc<RadarRenderer>>,
}

impl ScoringService {
    pub fn new(scorer: Arc<FashionScorer>) -> Self {
        Self {
            scorer,
            feedback: Arc::new(NoFeedback),
            renderer: None,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        pose_model: Arc<LazyPoseModel>,
    ) -> Result<Self, AppError> {
        let scorer = FashionScorer::from_settings(settings, pose_model)?;
        let renderer = RadarRenderer::from_settings(&settings.chart, settings.analysis.locale)?;
        Ok(Self::new(Arc::new(scorer)).with_renderer(renderer))
    }

    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackProvider>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_renderer(mut self, renderer: RadarRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn scorer(&self) -> &Arc<FashionScorer> {
        &self.scorer
    }

    pub fn renderer(&self) -> Option<&Arc<RadarRenderer>> {
        self.renderer.as_ref()
    }
}

impl Service<ScoringRequest> for ScoringService {
    type Response = AnalysisReport;
    type Error = AppError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ScoringRequest) -> Self::Future {
        let scorer = self.scorer.clone();
        let feedback = self.feedback.clone();
        let renderer = self.renderer.clone();

        Box::pin(async move {
            let image = Arc::new(request.image);
            let metadata = request.metadata;

            let outcome = {
                let scorer = scorer.clone();
                let image = image.clone();
                tokio::task::spawn_blocking(move || scorer.analyze(&image, metadata))
                    .await
                    .map_err(|e| AppError::Task(e.to_string()))?
            };

            let result = match outcome {
                ScoreOutcome::Scored(result) => result,
                error => {
                    info!("Upload rejected before scoring");
                    return Ok(AnalysisReport {
                        score: error,
                        ai_feedback: None,
                        radar_chart: None,
                        chart_error: None,
                        chart_warning: None,
                    });
                }
            };

            let ai_feedback = request_feedback(feedback.as_ref(), &image, &result).await;

            let mut chart_warning = None;
            let (radar_chart, chart_error) = match renderer {
                Some(renderer) => {
                    let subscores = result.subscores().clone();
                    let rules = scorer.rules().clone();
                    let rendered = tokio::task::spawn_blocking(move || {
                        renderer.render(&subscores, &rules.catalog)
                    })
                    .await
                    .map_err(|e| AppError::Task(e.to_string()))?;

                    match rendered {
                        Ok(chart) => {
                            if !chart.labeled {
                                chart_warning = Some(UNLABELED_CHART.to_string());
                            }
                            (Some(chart.data_uri()), None)
                        }
                        Err(e) => {
                            warn!("Chart for {} not rendered: {}", result.metadata().request_id, e);
                            (None, Some(e.to_string()))
                        }
                    }
                }
                None => (None, None),
            };

            Ok(AnalysisReport {
                score: ScoreOutcome::Scored(result),
                ai_feedback: Some(ai_feedback),
                radar_chart,
                chart_error,
                chart_warning,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedbackError;
    use crate::pipeline::rules::RuleTables;
    use crate::pipeline::types::{CategoryCatalog, Locale, SubscoreMap, INVALID_IMAGE};
    use async_trait::async_trait;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;
    use tower::ServiceExt;

    struct CannedFeedback;

    #[async_trait]
    impl FeedbackProvider for CannedFeedback {
        async fn generate_feedback(
            &self,
            _image_base64: &str,
            _subscores: &SubscoreMap,
            overall_score: f64,
        ) -> Result<String, FeedbackError> {
            Ok(format!("Solid outfit, {} points.", overall_score))
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn png() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            120,
            160,
            Rgb([60, 60, 140]),
        ));
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn scorer(rules: RuleTables) -> Arc<FashionScorer> {
        Arc::new(FashionScorer::new(Arc::new(rules), Arc::new(LazyPoseModel::disabled())))
    }

    #[tokio::test]
    async fn test_invalid_upload_skips_feedback_and_chart() {
        let service = ScoringService::new(scorer(RuleTables::default()))
            .with_renderer(RadarRenderer::new(128));
        let report = service
            .oneshot(ScoringRequest::new(b"garbage".to_vec(), ScoringMetadata::default()))
            .await
            .unwrap();

        assert_eq!(
            report.score,
            ScoreOutcome::Error {
                error: INVALID_IMAGE.to_string()
            }
        );
        assert!(report.ai_feedback.is_none());
        assert!(report.radar_chart.is_none());
    }

    #[tokio::test]
    async fn test_full_report_with_chart() {
        let service = ScoringService::new(scorer(RuleTables::standard(Locale::En)))
            .with_renderer(RadarRenderer::new(200));
        let report = service
            .oneshot(ScoringRequest::new(png(), ScoringMetadata::from_keys("male", "casual")))
            .await
            .unwrap();

        let result = report.score.result().unwrap();
        assert_eq!(result.subscores().len(), 8);
        assert!(report.radar_chart.unwrap().starts_with("data:image/png;base64,"));
        assert!(report.chart_error.is_none());
        assert_eq!(report.chart_warning.as_deref(), Some(UNLABELED_CHART));
        assert!(
            report
                .ai_feedback
                .unwrap()
                .starts_with("AI feedback is unavailable")
        );
    }

    #[tokio::test]
    async fn test_feedback_provider_text_is_returned() {
        let service = ScoringService::new(scorer(RuleTables::default()))
            .with_feedback(Arc::new(CannedFeedback));
        let report = service
            .oneshot(ScoringRequest::new(png(), ScoringMetadata::default()))
            .await
            .unwrap();

        let overall = report.score.result().unwrap().overall_score();
        assert_eq!(
            report.ai_feedback,
            Some(format!("Solid outfit, {} points.", overall))
        );
        assert!(report.radar_chart.is_none());
    }

    #[tokio::test]
    async fn test_render_failure_keeps_score() {
        let rules = RuleTables::default().with_catalog(CategoryCatalog::new(vec![]));
        let service = ScoringService::new(scorer(rules)).with_renderer(RadarRenderer::new(128));
        let report = service
            .oneshot(ScoringRequest::new(png(), ScoringMetadata::default()))
            .await
            .unwrap();

        assert!(!report.score.is_error());
        assert!(report.radar_chart.is_none());
        assert!(report.chart_error.is_some());
    }

    #[tokio::test]
    async fn test_from_settings_builds_chart_service() {
        let service = ScoringService::from_settings(
            &Settings::default(),
            Arc::new(LazyPoseModel::disabled()),
        )
        .unwrap();
        let report = service
            .oneshot(ScoringRequest::new(png(), ScoringMetadata::default()))
            .await
            .unwrap();

        assert!(report.radar_chart.is_some());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["score"]["overall_score"].is_number());
        assert!(json.get("chart_error").is_none());
        assert_eq!(json["chart_warning"], UNLABELED_CHART);
    }

    #[tokio::test]
    async fn test_labeled_chart_has_no_warning() {
        let font = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");
        let renderer = RadarRenderer::new(200).with_font_file(font).unwrap();
        let service =
            ScoringService::new(scorer(RuleTables::standard(Locale::En))).with_renderer(renderer);
        let report = service
            .oneshot(ScoringRequest::new(png(), ScoringMetadata::default()))
            .await
            .unwrap();

        assert!(report.radar_chart.is_some());
        assert!(report.chart_warning.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("chart_warning").is_none());
    }
}
