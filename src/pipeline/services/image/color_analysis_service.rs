use image::{DynamicImage, RgbImage};
use std::collections::HashSet;

use crate::pipeline::types::{ColorFeatures, HueSaturationHistogram, HUE_BINS};

/// Hue values per "primary color" bucket.
const HUES_PER_COLOR: usize = 50;
const MAX_PRIMARY_COLORS: u32 = 6;

/// Derives hue/saturation statistics from an image. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorAnalysisService;

impl ColorAnalysisService {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_colors(&self, image: &DynamicImage) -> ColorFeatures {
        let rgb_image = image.to_rgb8();
        self.analyze_rgb(&rgb_image)
    }

    fn analyze_rgb(&self, image: &RgbImage) -> ColorFeatures {
        let mut histogram = HueSaturationHistogram::new();
        let mut hues = HashSet::with_capacity(HUE_BINS);
        let mut saturation_sum = 0u64;
        let mut pixels = 0u64;

        for px in image.pixels() {
            let (h, s, _v) = self.rgb_to_hsv(px[0], px[1], px[2]);
            histogram.increment(h, s);
            hues.insert(h);
            saturation_sum += s as u64;
            pixels += 1;
        }

        let avg_saturation_ratio = if pixels == 0 {
            0.0
        } else {
            saturation_sum as f64 / pixels as f64 / 255.0
        };

        ColorFeatures {
            histogram,
            primary_colors_count: ((hues.len() / HUES_PER_COLOR) as u32).min(MAX_PRIMARY_COLORS),
            avg_saturation_ratio,
        }
    }

    /// 8-bit HSV with hue in 0..180, as OpenCV lays it out.
    fn rgb_to_hsv(&self, r: u8, g: u8, b: u8) -> (u8, u8, u8) {
        let v = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = (v - min) as f64;

        let s = if v == 0 {
            0
        } else {
            (diff * 255.0 / v as f64).round() as u8
        };

        if diff == 0.0 {
            return (0, s, v);
        }

        let (r, g, b) = (r as f64, g as f64, b as f64);
        let mut h = if v as f64 == r {
            60.0 * (g - b) / diff
        } else if v as f64 == g {
            120.0 + 60.0 * (b - r) / diff
        } else {
            240.0 + 60.0 * (r - g) / diff
        };
        if h < 0.0 {
            h += 360.0;
        }

        let h = ((h / 2.0).round() as usize % HUE_BINS) as u8;
        (h, s, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid(color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            8,
            8,
            Rgb(color),
        ))
    }

    #[test]
    fn test_hsv_conversion_primaries() {
        let service = ColorAnalysisService::new();
        assert_eq!(service.rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(service.rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(service.rgb_to_hsv(0, 0, 255), (120, 255, 255));
        assert_eq!(service.rgb_to_hsv(128, 128, 128), (0, 0, 128));
        assert_eq!(service.rgb_to_hsv(0, 0, 0), (0, 0, 0));
    }

    #[test]
    fn test_gray_image_has_no_saturation() {
        let features = ColorAnalysisService::new().analyze_colors(&solid([90, 90, 90]));
        assert_eq!(features.avg_saturation_ratio, 0.0);
        assert_eq!(features.primary_colors_count, 0);
        assert_eq!(features.histogram.count(0, 0), 64);
        assert_eq!(features.histogram.total(), 64);
    }

    #[test]
    fn test_saturated_image_has_full_ratio() {
        let features = ColorAnalysisService::new().analyze_colors(&solid([255, 0, 0]));
        assert!((features.avg_saturation_ratio - 1.0).abs() < 1e-12);
        assert_eq!(features.histogram.count(0, 255), 64);
    }

    #[test]
    fn test_full_hue_wheel_caps_distinct_buckets() {
        // Walk the six edges of the RGB cube so every hue value appears.
        let mut pixels = Vec::new();
        for t in 0..=255u8 {
            pixels.push([255, t, 0]);
            pixels.push([255 - t, 255, 0]);
            pixels.push([0, 255, t]);
            pixels.push([0, 255 - t, 255]);
            pixels.push([t, 0, 255]);
            pixels.push([255, 0, 255 - t]);
        }
        let width = pixels.len() as u32;
        let image = ImageBuffer::from_fn(width, 1, |x, _| Rgb(pixels[x as usize]));

        let features = ColorAnalysisService::new().analyze_colors(&DynamicImage::ImageRgb8(image));
        // 180 distinct hues / 50
        assert_eq!(features.primary_colors_count, 3);
    }

    #[test]
    fn test_empty_image_yields_zero_features() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let features = ColorAnalysisService::new().analyze_colors(&image);
        assert_eq!(features.avg_saturation_ratio, 0.0);
        assert_eq!(features.primary_colors_count, 0);
        assert_eq!(features.histogram.total(), 0);
    }
}
