use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::xxh3_64;

use crate::pipeline::types::round_to_tenth;

/// Share of a category's weight a fallback score may take.
pub const FALLBACK_MIN_RATIO: f64 = 0.7;
pub const FALLBACK_MAX_RATIO: f64 = 0.9;

/// How categories without a measured feature get their score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FallbackPolicy {
    /// Uniform draw seeded from the image bytes: same image, same scores.
    #[default]
    ContentSeeded,
    /// Uniform draw; a fixed seed makes it reproducible.
    Uniform { seed: Option<u64> },
    /// Fixed share of the weight, clamped into the fallback band.
    Baseline { ratio: f64 },
}

impl FallbackPolicy {
    /// Creates a sampler for one scoring call over `image_bytes`.
    pub fn sampler(&self, image_bytes: &[u8]) -> FallbackSampler {
        match *self {
            FallbackPolicy::ContentSeeded => {
                FallbackSampler::Random(ChaCha8Rng::seed_from_u64(content_seed(image_bytes)))
            }
            FallbackPolicy::Uniform { seed: Some(seed) } => {
                FallbackSampler::Random(ChaCha8Rng::seed_from_u64(seed))
            }
            FallbackPolicy::Uniform { seed: None } => {
                FallbackSampler::Random(ChaCha8Rng::from_os_rng())
            }
            FallbackPolicy::Baseline { ratio } => {
                let ratio = if ratio.is_finite() {
                    ratio.clamp(FALLBACK_MIN_RATIO, FALLBACK_MAX_RATIO)
                } else {
                    (FALLBACK_MIN_RATIO + FALLBACK_MAX_RATIO) / 2.0
                };
                FallbackSampler::Fixed(ratio)
            }
        }
    }
}

/// Seed derived from the upload. xxh3 and ChaCha8 are both fixed algorithms,
/// so a photo keeps its scores across builds and platforms.
pub fn content_seed(image_bytes: &[u8]) -> u64 {
    xxh3_64(image_bytes)
}

pub enum FallbackSampler {
    Random(ChaCha8Rng),
    Fixed(f64),
}

impl FallbackSampler {
    /// A score within 70%..90% of `max_weight`, rounded to one decimal.
    pub fn score(&mut self, max_weight: f64) -> f64 {
        if !(max_weight > 0.0) {
            return 0.0;
        }

        let ratio = match self {
            FallbackSampler::Random(rng) => {
                rng.random_range(FALLBACK_MIN_RATIO..=FALLBACK_MAX_RATIO)
            }
            FallbackSampler::Fixed(ratio) => *ratio,
        };

        round_to_tenth(max_weight * ratio).min(max_weight).max(0.0)
    }
}
