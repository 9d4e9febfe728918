use std::collections::HashMap;

use crate::pipeline::types::{ColorFeatures, Scene, SilhouetteFeatures};

/// Advisory thresholds for one scene. Rules only emit warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRule {
    pub max_primary_colors: u32,
    pub saturation_window: (f64, f64),
    pub allows_oversized: bool,
}

impl SceneRule {
    pub fn advise(
        &self,
        scene: Scene,
        color: &ColorFeatures,
        silhouette: &SilhouetteFeatures,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if color.primary_colors_count > self.max_primary_colors {
            warnings.push(format!(
                "{} colors is busy for a {} outfit; {} or fewer usually reads cleaner.",
                color.primary_colors_count,
                scene.as_str(),
                self.max_primary_colors
            ));
        }

        let (low, high) = self.saturation_window;
        if color.avg_saturation_ratio < low {
            warnings.push(format!(
                "Colors look muted for a {} outfit.",
                scene.as_str()
            ));
        } else if color.avg_saturation_ratio > high {
            warnings.push(format!(
                "Colors look very vivid for a {} outfit.",
                scene.as_str()
            ));
        }

        if silhouette.is_oversized && !self.allows_oversized {
            warnings.push(format!(
                "An oversized silhouette may look too relaxed for a {} setting.",
                scene.as_str()
            ));
        }

        warnings
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneRules {
    rules: HashMap<Scene, SceneRule>,
}

impl SceneRules {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, scene: Scene, rule: SceneRule) -> Self {
        self.rules.insert(scene, rule);
        self
    }

    /// Rule for `scene`, falling back to the date rule.
    pub fn rule_for(&self, scene: Scene) -> Option<&SceneRule> {
        self.rules
            .get(&scene)
            .or_else(|| self.rules.get(&Scene::Date))
    }
}

impl Default for SceneRules {
    fn default() -> Self {
        Self::new()
            .with_rule(
                Scene::Date,
                SceneRule {
                    max_primary_colors: 3,
                    saturation_window: (0.15, 0.65),
                    allows_oversized: true,
                },
            )
            .with_rule(
                Scene::Work,
                SceneRule {
                    max_primary_colors: 2,
                    saturation_window: (0.05, 0.45),
                    allows_oversized: false,
                },
            )
            .with_rule(
                Scene::Casual,
                SceneRule {
                    max_primary_colors: 4,
                    saturation_window: (0.1, 0.8),
                    allows_oversized: true,
                },
            )
            .with_rule(
                Scene::Formal,
                SceneRule {
                    max_primary_colors: 2,
                    saturation_window: (0.0, 0.4),
                    allows_oversized: false,
                },
            )
    }
}
