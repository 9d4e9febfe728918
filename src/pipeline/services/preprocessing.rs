use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

pub const DEFAULT_MAX_SIDE: u32 = 400;

/// Downscales `image` so its longer side is at most `max_side`. Never upscales.
pub fn preprocess_image(image: DynamicImage, max_side: u32) -> DynamicImage {
    let max_side = max_side.max(1);
    let (width, height) = image.dimensions();
    let longest = width.max(height);

    if longest <= max_side {
        return image;
    }

    let scale = max_side as f64 / longest as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);

    debug!(
        "Downscaling {}x{} to {}x{}",
        width, height, new_width, new_height
    );

    image.resize_exact(new_width, new_height, FilterType::Triangle)
}
