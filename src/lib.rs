// Library exports for incidash

pub mod data;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod palette;
pub mod runtime;
pub mod view;

// Aggregation and chart-building pipeline
pub mod aggregate;
pub mod charts;
pub mod ir;
pub mod scale;

pub use data::{Dataset, IncidentRecord};
pub use error::DashboardError;
pub use runtime::{render_dashboard, Dashboard};
pub use view::{select_view, Selection, View};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// Settings for the static renderer. Unset dimensions fall back to the chart's own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// Animation frame (year) to draw; defaults to the latest.
    #[serde(default)]
    pub frame: Option<i32>,
}

impl RenderOptions {
    pub fn dimensions(&self, chart: &ir::ChartDescriptor) -> (u32, u32) {
        (
            self.width.unwrap_or(chart.width),
            self.height.unwrap_or(chart.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.format, OutputFormat::Png);
        assert_eq!(options.width, None);
        assert_eq!(options.frame, None);
    }

    #[test]
    fn test_render_options_from_json() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"type": "svg", "width": 640, "frame": 2001}"#).unwrap();
        assert_eq!(options.format, OutputFormat::Svg);
        assert_eq!(options.width, Some(640));
        assert_eq!(options.height, None);
        assert_eq!(options.frame, Some(2001));
        assert_eq!(options.format.extension(), "svg");
    }
}
