pub mod config;
pub mod error;
pub mod pipeline;

pub use config::Settings;
pub use error::{AppError, FeedbackError, PoseError, RenderError};
