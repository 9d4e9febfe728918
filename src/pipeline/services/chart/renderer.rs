use ab_glyph::{FontVec, PxScale};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size, Blend,
};
use imageproc::point::Point;
use std::any::Any;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use super::radar::{normalize, point_at, RadarLayout, TICK_LABELS};
use crate::config::ChartSettings;
use crate::error::RenderError;
use crate::pipeline::types::{CategoryCatalog, Locale, SubscoreMap};

pub const DEFAULT_CHART_SIZE: u32 = 600;
const MIN_CHART_SIZE: u32 = 64;

/// Plot radius as a share of the canvas side; the rest holds labels.
const PLOT_RADIUS_RATIO: f32 = 0.34;
const LABEL_RADIUS: f64 = 1.15;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID: Rgba<u8> = Rgba([200, 200, 200, 255]);
const FILL: Rgba<u8> = Rgba([135, 206, 235, 64]);
const OUTLINE: Rgba<u8> = Rgba([30, 100, 200, 255]);
const TEXT: Rgba<u8> = Rgba([40, 40, 40, 255]);
const GRID_TEXT: Rgba<u8> = Rgba([130, 130, 130, 255]);

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A rendered chart: the PNG bytes and the layout they were drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub layout: RadarLayout,
    pub png: Vec<u8>,
    /// Whether the title, axis labels and tick labels were drawn.
    pub labeled: bool,
}

impl RadarChart {
    pub fn data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&self.png))
    }
}

/// PNG bytes back out of a `data:image/png;base64,` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, RenderError> {
    let payload = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| RenderError::DataUri("not a base64 PNG data URI".to_string()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| RenderError::DataUri(e.to_string()))
}

#[derive(Clone)]
pub struct RadarRenderer {
    size: u32,
    title: String,
    font: Option<Arc<FontVec>>,
}

impl RadarRenderer {
    /// `size` is the square canvas side in pixels, clamped to at least 64.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(MIN_CHART_SIZE),
            title: Locale::default().chart_title().to_string(),
            font: None,
        }
    }

    pub fn from_settings(settings: &ChartSettings, locale: Locale) -> Result<Self, RenderError> {
        let title = settings
            .title
            .clone()
            .unwrap_or_else(|| locale.chart_title().to_string());
        let renderer = Self::new(settings.size).with_title(title);

        match &settings.font_path {
            Some(path) => renderer.with_font_file(path),
            None => {
                warn!("No chart font configured; radar charts are drawn without title or labels");
                Ok(renderer)
            }
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Loads a TrueType/OpenType font for labels. Without one, the chart has no text.
    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        self.font = Some(Arc::new(font));
        Ok(self)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn layout(&self, subscores: &SubscoreMap, catalog: &CategoryCatalog) -> RadarLayout {
        RadarLayout::compute(normalize(subscores, catalog), self.title.clone())
    }

    pub fn render(
        &self,
        subscores: &SubscoreMap,
        catalog: &CategoryCatalog,
    ) -> Result<RadarChart, RenderError> {
        if catalog.is_empty() {
            return Err(RenderError::EmptyCatalog);
        }

        let layout = self.layout(subscores, catalog);
        let canvas = guard_rasterize(|| self.rasterize(&layout))?;

        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas).write_to(&mut png, ImageFormat::Png)?;
        let png = png.into_inner();

        debug!(
            "Rendered {}x{} radar chart with {} axes ({} bytes)",
            self.size,
            self.size,
            layout.len(),
            png.len()
        );

        Ok(RadarChart {
            layout,
            png,
            labeled: self.has_font(),
        })
    }

    fn rasterize(&self, layout: &RadarLayout) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.size, self.size, BACKGROUND);
        let center = self.size as f32 / 2.0;
        let radius = self.size as f32 * PLOT_RADIUS_RATIO;
        let to_pixel =
            |(x, y): (f64, f64)| (center + x as f32 * radius, center + y as f32 * radius);

        for tick in layout.ticks {
            let ring = (radius * tick as f32 / 100.0).round() as i32;
            draw_hollow_circle_mut(&mut canvas, (center as i32, center as i32), ring, GRID);
        }
        for angle in layout.angles.iter().take(layout.len()) {
            let end = to_pixel(point_at(*angle, 1.0));
            draw_line_segment_mut(&mut canvas, (center, center), end, GRID);
        }

        let polygon = polygon_points(layout.vertices.iter().map(|v| to_pixel(*v)));
        if polygon.len() >= 3 {
            let mut blend = Blend(canvas);
            draw_polygon_mut(&mut blend, &polygon, FILL);
            canvas = blend.0;
        }

        for pair in layout.vertices.windows(2) {
            draw_line_segment_mut(&mut canvas, to_pixel(pair[0]), to_pixel(pair[1]), OUTLINE);
        }
        for vertex in layout.vertices.iter().take(layout.len()) {
            let (x, y) = to_pixel(*vertex);
            let center = (x.round() as i32, y.round() as i32);
            draw_filled_circle_mut(&mut canvas, center, 3, OUTLINE);
        }

        if let Some(font) = &self.font {
            self.draw_labels(&mut canvas, font.as_ref(), layout, center, radius);
        }

        canvas
    }

    fn draw_labels(
        &self,
        canvas: &mut RgbaImage,
        font: &FontVec,
        layout: &RadarLayout,
        center: f32,
        radius: f32,
    ) {
        let label_scale = PxScale::from((self.size as f32 / 40.0).max(10.0));
        let tick_scale = PxScale::from((self.size as f32 / 55.0).max(8.0));
        let title_scale = PxScale::from((self.size as f32 / 30.0).max(12.0));

        for (axis, angle) in layout.axes.iter().zip(&layout.angles) {
            let (x, y) = point_at(*angle, LABEL_RADIUS);
            let (w, h) = text_size(label_scale, font, &axis.label);
            let x = center + x as f32 * radius - w as f32 / 2.0;
            let y = center + y as f32 * radius - h as f32 / 2.0;
            draw_text_mut(canvas, TEXT, x as i32, y as i32, label_scale, font, &axis.label);
        }

        for (tick, label) in layout.ticks.iter().zip(TICK_LABELS) {
            let y = center - radius * *tick as f32 / 100.0;
            let x = center as i32 + 4;
            draw_text_mut(canvas, GRID_TEXT, x, y as i32, tick_scale, font, label);
        }

        let (w, _) = text_size(title_scale, font, &layout.title);
        let x = ((self.size as f32 - w as f32) / 2.0) as i32;
        let y = (self.size as f32 * 0.02) as i32;
        draw_text_mut(canvas, TEXT, x, y, title_scale, font, &layout.title);
    }
}

impl std::fmt::Debug for RadarRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarRenderer")
            .field("size", &self.size)
            .field("title", &self.title)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Default for RadarRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_SIZE)
    }
}

/// Integer polygon with repeated points removed. Degenerate shapes come back
/// with fewer than three points.
fn polygon_points(points: impl Iterator<Item = (f32, f32)>) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = Vec::new();
    for (x, y) in points {
        let point = Point::new(x.round() as i32, y.round() as i32);
        if polygon.last() != Some(&point) {
            polygon.push(point);
        }
    }
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

/// Runs a drawing closure, turning a panic into `RenderError::Rasterize`.
fn guard_rasterize<F>(draw: F) -> Result<RgbaImage, RenderError>
where
    F: FnOnce() -> RgbaImage,
{
    panic::catch_unwind(AssertUnwindSafe(draw))
        .map_err(|payload| RenderError::Rasterize(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while drawing chart".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{CategoryKey, ScoreCategory};
    use std::io::Write;
    use std::ops::Range;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const FIXTURE_FONT: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");

    fn ink(image: &RgbaImage, xs: Range<u32>, ys: Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|(x, y)| image.get_pixel(*x, *y).0 != WHITE)
            .count()
    }

    fn render_en(renderer: &RadarRenderer) -> (RadarChart, RgbaImage) {
        let catalog = CategoryCatalog::standard(Locale::En);
        let chart = renderer.render(&full_scores(&catalog), &catalog).unwrap();
        let image = image::load_from_memory(&chart.png).unwrap().to_rgba8();
        (chart, image)
    }

    fn full_scores(catalog: &CategoryCatalog) -> SubscoreMap {
        catalog.iter().map(|c| (c.key, c.max_weight)).collect()
    }

    /// Pixel between the first two spokes, at 60% of the plot radius.
    fn inner_pixel(renderer: &RadarRenderer, axes: usize) -> (u32, u32) {
        let size = renderer.size() as f64;
        let radius = size * PLOT_RADIUS_RATIO as f64 * 0.6;
        let angle = std::f64::consts::PI / axes as f64;
        let (x, y) = point_at(angle, radius);
        ((size / 2.0 + x).round() as u32, (size / 2.0 + y).round() as u32)
    }

    #[test]
    fn test_render_produces_png() {
        let catalog = CategoryCatalog::standard(Locale::Ja);
        let chart = RadarRenderer::default()
            .render(&full_scores(&catalog), &catalog)
            .unwrap();

        assert_eq!(&chart.png[..4], &[0x89, b'P', b'N', b'G']);
        let decoded = image::load_from_memory(&chart.png).unwrap();
        assert_eq!(decoded.width(), DEFAULT_CHART_SIZE);
        assert_eq!(decoded.height(), DEFAULT_CHART_SIZE);
        assert_eq!(chart.layout.title, "ファッション採点レーダーチャート");
    }

    #[test]
    fn test_data_uri_prefix() {
        let catalog = CategoryCatalog::standard(Locale::En);
        let chart = RadarRenderer::new(128)
            .render(&full_scores(&catalog), &catalog)
            .unwrap();
        let uri = chart.data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_polygon_is_filled_for_full_scores() {
        let catalog = CategoryCatalog::standard(Locale::En);
        let renderer = RadarRenderer::new(400);
        let chart = renderer.render(&full_scores(&catalog), &catalog).unwrap();
        let image = image::load_from_memory(&chart.png).unwrap().to_rgba8();

        assert_eq!(image.get_pixel(0, 0).0, WHITE);
        let (x, y) = inner_pixel(&renderer, catalog.len());
        assert_ne!(image.get_pixel(x, y).0, WHITE);
    }

    #[test]
    fn test_all_zero_scores_render_without_fill() {
        let catalog = CategoryCatalog::standard(Locale::En);
        let renderer = RadarRenderer::new(400);
        let chart = renderer.render(&SubscoreMap::new(), &catalog).unwrap();
        let image = image::load_from_memory(&chart.png).unwrap().to_rgba8();

        let (x, y) = inner_pixel(&renderer, catalog.len());
        assert_eq!(image.get_pixel(x, y).0, WHITE);
        assert!(chart.layout.axes.iter().all(|a| a.normalized == 0.0));
    }

    #[test]
    fn test_single_category_chart() {
        let catalog = CategoryCatalog::new(vec![ScoreCategory::new(
            CategoryKey::ColorHarmony,
            "Color",
            100.0,
        )]);
        let mut subscores = SubscoreMap::new();
        subscores.insert(CategoryKey::ColorHarmony, 60.0);
        let chart = RadarRenderer::new(200).render(&subscores, &catalog).unwrap();
        assert_eq!(chart.layout.vertices.len(), 2);
    }

    #[test]
    fn test_repeated_renders_share_geometry() {
        let catalog = CategoryCatalog::standard(Locale::En);
        let mut subscores = full_scores(&catalog);
        subscores.insert(CategoryKey::Trendness, 3.3);
        let renderer = RadarRenderer::new(300);

        let first = renderer.render(&subscores, &catalog).unwrap();
        let second = renderer.render(&subscores, &catalog).unwrap();
        assert_eq!(first.layout.vertices, second.layout.vertices);
        assert_eq!(first.png, second.png);
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let empty = CategoryCatalog::new(vec![]);
        let result = RadarRenderer::default().render(&SubscoreMap::new(), &empty);
        assert!(matches!(result, Err(RenderError::EmptyCatalog)));
    }

    #[test]
    fn test_font_draws_title_and_axis_labels() {
        let renderer = RadarRenderer::new(400)
            .with_title("Outfit radar")
            .with_font_file(FIXTURE_FONT)
            .unwrap();
        let (chart, image) = render_en(&renderer);

        assert!(chart.labeled);
        // Title band above the plot.
        assert!(ink(&image, 0..400, 0..24) > 0);
        // Left-hand axis label, outside the outer ring.
        assert!(ink(&image, 0..56, 192..208) > 0);
    }

    #[test]
    fn test_chart_without_font_has_no_text() {
        let (chart, image) = render_en(&RadarRenderer::new(400));

        assert!(!chart.labeled);
        assert_eq!(ink(&image, 0..400, 0..24), 0);
        assert_eq!(ink(&image, 0..56, 192..208), 0);
    }

    #[test]
    fn test_from_settings_loads_configured_font() {
        let settings = ChartSettings {
            size: 300,
            font_path: Some(FIXTURE_FONT.into()),
            title: Some("Outfit radar".to_string()),
        };
        let renderer = RadarRenderer::from_settings(&settings, Locale::En).unwrap();
        assert!(renderer.has_font());
        assert!(render_en(&renderer).0.labeled);
    }

    #[test]
    fn test_panic_while_drawing_becomes_rasterize_error() {
        let result = guard_rasterize(|| -> RgbaImage { panic!("polygon collapsed") });
        assert!(matches!(result, Err(RenderError::Rasterize(ref m)) if m == "polygon collapsed"));

        let result = guard_rasterize(|| -> RgbaImage { panic!("ring {} out of range", 4) });
        assert!(matches!(result, Err(RenderError::Rasterize(ref m)) if m == "ring 4 out of range"));

        let result = guard_rasterize(|| RgbaImage::new(2, 2));
        assert_eq!(result.unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_data_uri_decodes_to_png() {
        let (chart, _) = render_en(&RadarRenderer::new(128));
        assert_eq!(decode_data_uri(&chart.data_uri()).unwrap(), chart.png);
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(RenderError::DataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@"),
            Err(RenderError::DataUri(_))
        ));
    }

    #[test]
    fn test_missing_font_file() {
        let result = RadarRenderer::default().with_font_file("/nonexistent/chart-font.ttf");
        assert!(matches!(result, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a font").unwrap();
        let result = RadarRenderer::default().with_font_file(file.path());
        assert!(matches!(result, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_from_settings_title_and_size() {
        let settings = ChartSettings {
            size: 10,
            font_path: None,
            title: None,
        };
        let renderer = RadarRenderer::from_settings(&settings, Locale::En).unwrap();
        assert_eq!(renderer.size(), MIN_CHART_SIZE);
        assert!(!renderer.has_font());
        let layout = renderer.layout(&SubscoreMap::new(), &CategoryCatalog::standard(Locale::En));
        assert_eq!(layout.title, Locale::En.chart_title());
    }

    #[test]
    fn test_polygon_points_drop_duplicates() {
        let points = polygon_points([(1.0, 1.0), (1.2, 0.8), (5.0, 1.0), (1.0, 1.0)].into_iter());
        assert_eq!(points, vec![Point::new(1, 1), Point::new(5, 1)]);
        assert!(polygon_points(std::iter::repeat((3.0, 3.0)).take(9)).len() < 3);
    }
}
