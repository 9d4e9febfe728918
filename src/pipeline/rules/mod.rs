//! Read-only rule tables consulted by the scoring engine.

mod bias;
mod scene;

pub use bias::{BiasTable, SilhouetteRange};
pub use scene::{SceneRule, SceneRules};

use crate::pipeline::types::{CategoryCatalog, Locale};

/// Constants of the color-harmony rule (two sub-terms of 10 by default).
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHarmonyRule {
    pub max_acceptable_colors: u32,
    pub color_credit: f64,
    pub too_many_colors_credit: f64,
    pub saturation_window: (f64, f64),
    pub saturation_full_credit: f64,
    pub muted_credit: f64,
    pub vivid_credit: f64,
}

impl Default for ColorHarmonyRule {
    fn default() -> Self {
        Self {
            max_acceptable_colors: 4,
            color_credit: 10.0,
            too_many_colors_credit: 3.0,
            saturation_window: (0.2, 0.6),
            saturation_full_credit: 10.0,
            muted_credit: 5.0,
            vivid_credit: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitRule {
    pub base_credit: f64,
    pub oversized_penalty: f64,
    pub jacket_fit_threshold: f64,
    pub jacket_fit_bonus: f64,
}

impl Default for FitRule {
    fn default() -> Self {
        Self {
            base_credit: 15.0,
            oversized_penalty: 10.0,
            jacket_fit_threshold: 0.8,
            jacket_fit_bonus: 5.0,
        }
    }
}

/// Everything the engine consults, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTables {
    pub catalog: CategoryCatalog,
    pub bias: BiasTable,
    pub scenes: SceneRules,
    pub color: ColorHarmonyRule,
    pub fit: FitRule,
}

impl RuleTables {
    pub fn standard(locale: Locale) -> Self {
        Self {
            catalog: CategoryCatalog::standard(locale),
            bias: BiasTable::default(),
            scenes: SceneRules::default(),
            color: ColorHarmonyRule::default(),
            fit: FitRule::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: CategoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_bias(mut self, bias: BiasTable) -> Self {
        self.bias = bias;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.catalog.validate()?;

        if self.color.max_acceptable_colors == 0 {
            return Err("Maximum acceptable colors must be greater than 0".to_string());
        }

        let (low, high) = self.color.saturation_window;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(
                "Saturation window must be an increasing range within 0.0..=1.0".to_string(),
            );
        }

        if !(0.0..=1.0).contains(&self.fit.jacket_fit_threshold) {
            return Err("Jacket fit threshold must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::standard(Locale::default())
    }
}
