use serde::{Deserialize, Serialize};

/// Evaluation categories of the outfit rubric, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    ColorHarmony,
    FitAndSilhouette,
    ItemCoordination,
    CleanlinessMaterial,
    AccessoriesBalance,
    Trendness,
    TpoSuitability,
    PhotogenicQuality,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 8] = [
        CategoryKey::ColorHarmony,
        CategoryKey::FitAndSilhouette,
        CategoryKey::ItemCoordination,
        CategoryKey::CleanlinessMaterial,
        CategoryKey::AccessoriesBalance,
        CategoryKey::Trendness,
        CategoryKey::TpoSuitability,
        CategoryKey::PhotogenicQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::ColorHarmony => "color_harmony",
            CategoryKey::FitAndSilhouette => "fit_and_silhouette",
            CategoryKey::ItemCoordination => "item_coordination",
            CategoryKey::CleanlinessMaterial => "cleanliness_material",
            CategoryKey::AccessoriesBalance => "accessories_balance",
            CategoryKey::Trendness => "trendness",
            CategoryKey::TpoSuitability => "tpo_suitability",
            CategoryKey::PhotogenicQuality => "photogenic_quality",
        }
    }

    fn standard_weight(&self) -> f64 {
        match self {
            CategoryKey::ColorHarmony | CategoryKey::FitAndSilhouette => 20.0,
            CategoryKey::ItemCoordination | CategoryKey::CleanlinessMaterial => 15.0,
            CategoryKey::AccessoriesBalance | CategoryKey::Trendness => 10.0,
            CategoryKey::TpoSuitability | CategoryKey::PhotogenicQuality => 5.0,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Ja, CategoryKey::ColorHarmony) => "色の調和",
            (Locale::Ja, CategoryKey::FitAndSilhouette) => "フィット感とシルエット",
            (Locale::Ja, CategoryKey::ItemCoordination) => "アイテムの組み合わせ",
            (Locale::Ja, CategoryKey::CleanlinessMaterial) => "清潔感と素材",
            (Locale::Ja, CategoryKey::AccessoriesBalance) => "小物のバランス",
            (Locale::Ja, CategoryKey::Trendness) => "トレンド感",
            (Locale::Ja, CategoryKey::TpoSuitability) => "TPO適合性",
            (Locale::Ja, CategoryKey::PhotogenicQuality) => "写真映え",
            (Locale::En, CategoryKey::ColorHarmony) => "Color harmony",
            (Locale::En, CategoryKey::FitAndSilhouette) => "Fit & silhouette",
            (Locale::En, CategoryKey::ItemCoordination) => "Item coordination",
            (Locale::En, CategoryKey::CleanlinessMaterial) => "Cleanliness & material",
            (Locale::En, CategoryKey::AccessoriesBalance) => "Accessories balance",
            (Locale::En, CategoryKey::Trendness) => "Trend",
            (Locale::En, CategoryKey::TpoSuitability) => "TPO suitability",
            (Locale::En, CategoryKey::PhotogenicQuality) => "Photogenic quality",
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing locale for labels and titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    pub fn chart_title(&self) -> &'static str {
        match self {
            Locale::Ja => "ファッション採点レーダーチャート",
            Locale::En => "Outfit score radar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCategory {
    pub key: CategoryKey,
    pub display_label: String,
    pub max_weight: f64,
}

impl ScoreCategory {
    pub fn new(key: CategoryKey, display_label: impl Into<String>, max_weight: f64) -> Self {
        Self {
            key,
            display_label: display_label.into(),
            max_weight,
        }
    }
}

/// Ordered, read-only catalog of scoring categories.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCatalog {
    categories: Vec<ScoreCategory>,
}

impl CategoryCatalog {
    pub const TOTAL_WEIGHT: f64 = 100.0;

    pub fn new(categories: Vec<ScoreCategory>) -> Self {
        Self { categories }
    }

    /// The eight-category rubric, weights 20/20/15/15/10/10/5/5.
    pub fn standard(locale: Locale) -> Self {
        let categories = CategoryKey::ALL
            .iter()
            .map(|key| ScoreCategory::new(*key, key.label(locale), key.standard_weight()))
            .collect();
        Self { categories }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, key: CategoryKey) -> Option<&ScoreCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Max weight of `key`, or 0 when the catalog does not carry it.
    pub fn max_weight(&self, key: CategoryKey) -> f64 {
        self.get(key).map(|c| c.max_weight).unwrap_or(0.0)
    }

    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.max_weight).sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("Catalog must contain at least one category".to_string());
        }

        for category in &self.categories {
            if !category.max_weight.is_finite() || category.max_weight < 0.0 {
                return Err(format!(
                    "Category {} has an invalid weight {}",
                    category.key, category.max_weight
                ));
            }
        }

        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.key == category.key) {
                return Err(format!("Category {} is listed twice", category.key));
            }
        }

        let total = self.total_weight();
        if (total - Self::TOTAL_WEIGHT).abs() > 1e-9 {
            return Err(format!("Category weights must sum to 100, got {}", total));
        }

        Ok(())
    }
}
