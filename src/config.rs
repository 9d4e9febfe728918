use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;
use crate::pipeline::services::scoring::FallbackPolicy;
use crate::pipeline::types::Locale;

const DEFAULT_CONFIG_FILE: &str = "stylescore";
const ENV_PREFIX: &str = "STYLESCORE";

/// Process-wide settings, layered from defaults, an optional TOML file and
/// `STYLESCORE__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub analysis: AnalysisSettings,
    pub pose: PoseSettings,
    pub fallback: FallbackSettings,
    pub chart: ChartSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    pub max_side: u32,
    pub locale: Locale,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseSettings {
    pub min_visibility: f64,
    pub min_body_height: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    ContentSeeded,
    Uniform,
    Baseline,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallbackSettings {
    pub policy: FallbackKind,
    pub seed: Option<u64>,
    pub ratio: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub size: u32,
    pub font_path: Option<PathBuf>,
    pub title: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            analysis: AnalysisSettings::default(),
            pose: PoseSettings::default(),
            fallback: FallbackSettings::default(),
            chart: ChartSettings::default(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_side: 400,
            locale: Locale::default(),
        }
    }
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            min_body_height: 0.1,
        }
    }
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            policy: FallbackKind::ContentSeeded,
            seed: None,
            ratio: 0.8,
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            size: 600,
            font_path: None,
            title: None,
        }
    }
}

impl Settings {
    /// Loads settings. An explicit `path` must exist; without one, `stylescore.toml`
    /// in the working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy::from(&self.fallback)
    }
}

impl From<&FallbackSettings> for FallbackPolicy {
    fn from(settings: &FallbackSettings) -> Self {
        match settings.policy {
            FallbackKind::ContentSeeded => FallbackPolicy::ContentSeeded,
            FallbackKind::Uniform => FallbackPolicy::Uniform {
                seed: settings.seed,
            },
            FallbackKind::Baseline => FallbackPolicy::Baseline {
                ratio: settings.ratio,
            },
        }
    }
}
