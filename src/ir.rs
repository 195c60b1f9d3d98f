//! Chart descriptors: the complete, rendering-agnostic description of one chart.
//!
//! Builders in [`crate::charts`] produce these; [`crate::graph`] draws them, and
//! the CLI serializes them to JSON for any front end that prefers its own
//! charting library.

use crate::palette::ColorStop;
use serde::Serialize;

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub title: Title,
    pub width: u32,
    pub height: u32,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub color: ColorEncoding,
    pub hover: HoverSpec,
    pub body: ChartBody,
}

impl ChartDescriptor {
    /// Number of data marks (markers, bars, bubbles) across the whole chart.
    pub fn mark_count(&self) -> usize {
        match &self.body {
            ChartBody::GeoScatter(map) => map.markers.len(),
            ChartBody::AnimatedBar(bars) => bars.frames.iter().map(|f| f.bars.len()).sum(),
            ChartBody::StackedBar(bars) => bars
                .series
                .iter()
                .map(|s| s.values.iter().filter(|v| v.is_some()).count())
                .sum(),
            ChartBody::Bubble(bubbles) => bubbles.bubbles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mark_count() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    /// `None` keeps the renderer's default title; `Some("")` hides it.
    pub title: Option<String>,
    pub scale: AxisScale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_angle: Option<i32>,
    /// Data-space extent of the axis, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<(f64, f64)>,
}

/// How color is mapped onto the marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorEncoding {
    /// Continuous scale over a numeric field; values outside `range` are clipped.
    Continuous {
        field: String,
        stops: Vec<ColorStop>,
        range: (f64, f64),
    },
    /// One fixed color per category.
    Discrete {
        field: String,
        legend: Vec<LegendEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Custom hover configuration. Only the listed fields are shown, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverSpec {
    pub fields: Vec<String>,
    pub template: String,
    pub label: HoverLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bordercolor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    GeoScatter(GeoScatter),
    AnimatedBar(AnimatedBar),
    StackedBar(StackedBar),
    Bubble(BubbleChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoScatter {
    pub map_style: String,
    pub zoom: u32,
    /// (latitude, longitude)
    pub center: (f64, f64),
    pub size_max: f64,
    pub opacity: f64,
    pub markers: Vec<GeoMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub state: String,
    pub total_kills: u64,
    pub total_injuries: u64,
    /// Marker diameter in pixels.
    pub size: f64,
    pub color: String,
    /// Values for the hover fields, in [`HoverSpec::fields`] order.
    pub custom_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimatedBar {
    pub frame_field: String,
    pub frames: Vec<BarFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarFrame {
    pub key: i32,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub color: String,
    pub custom_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBar {
    pub categories: Vec<String>,
    /// Stacked bottom to top in this order.
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    /// One slot per category; `None` where the category has no data in this series.
    pub values: Vec<Option<f64>>,
    /// Hover values per category slot, in [`HoverSpec::fields`] order; empty where `values` is `None`.
    pub custom_data: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleChart {
    pub size_max: f64,
    pub bubbles: Vec<Bubble>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub category: String,
    pub value: f64,
    /// Bubble diameter in pixels.
    pub size: f64,
    pub color: String,
    pub custom_data: Vec<String>,
}
