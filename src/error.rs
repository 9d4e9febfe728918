use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render Error: {0}")]
    Render(#[from] RenderError),
    #[error("Scoring task failed: {0}")]
    Task(String),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

// Pose model errors never leave the silhouette extractor, they are folded into defaults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("Pose model is unavailable: {0}")]
    Unavailable(String),
    #[error("Pose detection failed: {0}")]
    Detection(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to encode chart: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to load chart font: {0}")]
    Font(String),
    #[error("Rasterization failed: {0}")]
    Rasterize(String),
    #[error("Cannot render a chart without categories")]
    EmptyCatalog,
    #[error("Invalid chart data URI: {0}")]
    DataUri(String),
    #[error("No chart was rendered: {0}")]
    Missing(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedbackError {
    #[error("No feedback provider is configured")]
    Unavailable,
    #[error("Feedback request failed: {0}")]
    Request(String),
}
