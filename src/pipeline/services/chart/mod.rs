//! Radar chart of a score vector.

mod radar;
mod renderer;

pub use radar::{normalize, normalize_value, point_at, RadarAxis, RadarLayout, TICKS, TICK_LABELS};
pub use renderer::{decode_data_uri, RadarChart, RadarRenderer, DEFAULT_CHART_SIZE};
