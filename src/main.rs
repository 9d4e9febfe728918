use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stylescore::config::{FallbackKind, Settings};
use stylescore::error::{AppError, RenderError};
use stylescore::pipeline::services::chart::decode_data_uri;
use stylescore::pipeline::services::image::LazyPoseModel;
use stylescore::pipeline::{ScoringMetadata, ScoringRequest, ScoringService};

/// Score an outfit photo and print the report as JSON.
#[derive(Parser, Debug)]
#[command(name = "stylescore", version, about, long_about = None)]
struct Args {
    /// Outfit photo (PNG, JPEG, WebP, ...)
    image: PathBuf,

    /// male, female or neutral
    #[arg(long, default_value = "neutral")]
    gender: String,

    /// date, work, casual or formal
    #[arg(long, default_value = "date")]
    scene: String,

    /// Also write the radar chart PNG here
    #[arg(long)]
    chart_out: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long, env = "STYLESCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Reproducible fallback scores
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.fallback.policy = FallbackKind::Uniform;
        settings.fallback.seed = Some(seed);
    }
    init_logging(&settings.log_level);

    let service = ScoringService::from_settings(&settings, Arc::new(LazyPoseModel::disabled()))?;
    let image = tokio::fs::read(&args.image).await?;
    let metadata = ScoringMetadata::from_keys(&args.gender, &args.scene);
    info!(
        "Scoring {} ({} bytes) for {:?}/{:?}",
        args.image.display(),
        image.len(),
        metadata.user_gender,
        metadata.intended_scene
    );

    let report = service
        .oneshot(ScoringRequest::new(image, metadata))
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &args.chart_out {
        match (&report.radar_chart, report.score.result()) {
            (Some(uri), _) => {
                tokio::fs::write(path, decode_data_uri(uri)?).await?;
                info!("Wrote radar chart to {}", path.display());
            }
            (None, Some(_)) => {
                let reason = report.chart_error.clone().unwrap_or_default();
                return Err(RenderError::Missing(reason).into());
            }
            (None, None) => info!("No chart for a rejected upload"),
        }
    }

    Ok(())
}
