use serde::{Deserialize, Serialize};

/// Gender category used to pick the silhouette target range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Neutral,
}

impl Gender {
    /// Parses a form key. Anything unrecognized is `Neutral`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
        }
    }
}

/// Intended scene (TPO) of the outfit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    #[default]
    Date,
    Work,
    Casual,
    Formal,
}

impl Scene {
    /// Parses a form key. Anything unrecognized is `Date`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "work" => Scene::Work,
            "casual" => Scene::Casual,
            "formal" => Scene::Formal,
            _ => Scene::Date,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Date => "date",
            Scene::Work => "work",
            Scene::Casual => "casual",
            Scene::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringMetadata {
    pub user_gender: Gender,
    pub intended_scene: Scene,
}

impl ScoringMetadata {
    pub fn new(user_gender: Gender, intended_scene: Scene) -> Self {
        Self {
            user_gender,
            intended_scene,
        }
    }

    pub fn from_keys(user_gender: &str, intended_scene: &str) -> Self {
        Self::new(Gender::from_key(user_gender), Scene::from_key(intended_scene))
    }
}
