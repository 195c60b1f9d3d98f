//! Chart builders: aggregated slices in, chart descriptors out.
//!
//! All three charts share one policy: magnitudes on a log axis, casualty
//! intensity on the red ramp, fixed pixel sizes, and hover text restricted to
//! an explicit list of fields.

use crate::aggregate::{LocationAggregate, StateRangeTotal, WeaponTotal, YearCountryTotal, YearRange};
use crate::error::DashboardError;
use crate::ir::{
    AnimatedBar, Axis, AxisScale, Bar, BarFrame, BarSeries, Bubble, BubbleChart, ChartBody,
    ChartDescriptor, ColorEncoding, Font, GeoMarker, GeoScatter, HoverLabel, HoverSpec,
    LegendEntry, StackedBar, Title,
};
use crate::palette::{year_range_color, ColorPalette, ColorRamp};
use crate::scale::{area_diameter, centroid, log_domain, pad_range, MinMax};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

const TITLE_FONT_SIZE: u32 = 24;
const TITLE_FONT_FAMILY: &str = "Arial";
const HOVER_FONT_SIZE: u32 = 12;
const CHART_WIDTH: u32 = 1200;

const MAP_HEIGHT: u32 = 700;
const MAP_STYLE: &str = "carto-positron";
const MAP_SIZE_MAX: f64 = 40.0;
const GLOBAL_ZOOM: u32 = 1;
const COUNTRY_ZOOM: u32 = 3;
const GLOBAL_INJURY_RANGE: (f64, f64) = (1000.0, 50000.0);

const YEAR_BAR_HEIGHT: u32 = 800;
const STATE_BAR_HEIGHT: u32 = 600;
const BUBBLE_HEIGHT: u32 = 550;
const GLOBAL_BUBBLE_SIZE_MAX: f64 = 60.0;
const COUNTRY_BUBBLE_SIZE_MAX: f64 = 70.0;
const TICK_ANGLE: i32 = -45;

const UNSELECTED_TITLE: &str = "Select a country to plot";
const FATALITIES_LABEL: &str = "Total Fatalities";

/// Which slice of the data a chart describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartContext<'a> {
    Global,
    Country(&'a str),
    /// Empty placeholder charts shown before anything is selected.
    Unselected,
}

impl ChartContext<'_> {
    fn is_global(&self) -> bool {
        matches!(self, ChartContext::Global)
    }
}

/// Accepted spellings of the dataset's date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%Y-%m-%d %H:%M:%S"];

fn parse_date(raw: &str) -> Result<NaiveDate, DashboardError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| DashboardError::InvalidDate { value: raw.to_string() })
}

/// Format a dataset date as `19 April, 2015`.
pub fn format_display_date(raw: &str) -> Result<String, DashboardError> {
    Ok(parse_date(raw)?.format("%d %B, %Y").to_string())
}

/// Hover template showing exactly `fields`, bound to `customdata` in order.
pub fn hover_template(fields: &[&str]) -> String {
    let lines: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| format!("<b>{field}:</b> %{{customdata[{i}]}}"))
        .collect();
    format!("{}<extra></extra>", lines.join("<br>"))
}

fn title(text: String, family: Option<&str>) -> Title {
    Title {
        text,
        font: Font {
            family: family.map(str::to_string),
            size: TITLE_FONT_SIZE,
            color: None,
        },
    }
}

fn hover_label(bgcolor: Option<&str>, bordercolor: Option<&str>) -> HoverLabel {
    let styled = bgcolor.is_some();
    HoverLabel {
        font: Font {
            family: styled.then(|| TITLE_FONT_FAMILY.to_string()),
            size: HOVER_FONT_SIZE,
            color: styled.then(|| "white".to_string()),
        },
        bgcolor: bgcolor.map(str::to_string),
        bordercolor: bordercolor.map(str::to_string),
    }
}

fn log_axis<I: IntoIterator<Item = f64>>(values: I) -> Axis {
    Axis {
        title: Some(FATALITIES_LABEL.to_string()),
        scale: AxisScale::Log,
        tick_angle: None,
        domain: Some(log_domain(values)),
    }
}

fn category_axis(title: &str, tick_angle: Option<i32>) -> Axis {
    Axis {
        title: Some(title.to_string()),
        scale: AxisScale::Linear,
        tick_angle,
        domain: None,
    }
}

fn hover(fields: &[&str], label: HoverLabel) -> HoverSpec {
    HoverSpec {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        template: hover_template(fields),
        label,
    }
}

/// Geo-scatter of casualties per (country, state, date).
///
/// Marker area follows `total_kills`, marker color follows `total_injuries`.
/// Rows without coordinates get no marker. Fails if any row's date cannot be
/// parsed.
pub fn build_geo_scatter(
    rows: &[LocationAggregate],
    ctx: ChartContext<'_>,
) -> Result<ChartDescriptor, DashboardError> {
    let fields: &[&str] = if ctx.is_global() {
        &["Country", "State", "Date", "Total Kills", "Total Injuries"]
    } else {
        &["State", "Date", "Total Kills", "Total Injuries"]
    };

    let color_range = if ctx.is_global() {
        GLOBAL_INJURY_RANGE
    } else {
        let max = rows.iter().map(|r| r.total_injuries).max().unwrap_or(0);
        (0.0, max as f64)
    };

    let located: Vec<(&LocationAggregate, f64, f64)> = rows
        .iter()
        .filter_map(|r| Some((r, r.latitude?, r.longitude?)))
        .collect();
    let max_kills = located.iter().map(|(r, _, _)| r.total_kills).max().unwrap_or(0) as f64;

    let ramp = ColorRamp::red();
    let mut markers = Vec::with_capacity(located.len());
    for row in rows {
        let date = format_display_date(&row.date)?;
        let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
            continue;
        };

        let mut custom_data = Vec::with_capacity(fields.len());
        if ctx.is_global() {
            custom_data.push(row.country.clone());
        }
        custom_data.push(row.state.clone());
        custom_data.push(date);
        custom_data.push(row.total_kills.to_string());
        custom_data.push(row.total_injuries.to_string());

        markers.push(GeoMarker {
            latitude,
            longitude,
            country: row.country.clone(),
            state: row.state.clone(),
            total_kills: row.total_kills,
            total_injuries: row.total_injuries,
            size: area_diameter(row.total_kills as f64, max_kills, MAP_SIZE_MAX),
            color: ramp.color_for(row.total_injuries as f64, color_range).to_hex(),
            custom_data,
        });
    }

    let center = centroid(markers.iter().map(|m| (m.latitude, m.longitude)));
    let (lon_domain, lat_domain) = if ctx.is_global() {
        (Some((-180.0, 180.0)), Some((-90.0, 90.0)))
    } else {
        (
            MinMax::of(markers.iter().map(|m| m.longitude)).map(|mm| pad_range(mm.min, mm.max)),
            MinMax::of(markers.iter().map(|m| m.latitude)).map(|mm| pad_range(mm.min, mm.max)),
        )
    };

    let text = match ctx {
        ChartContext::Global => "Total Kills and Injuries".to_string(),
        ChartContext::Country(country) => format!("Total Kills and Injuries in {country}"),
        ChartContext::Unselected => UNSELECTED_TITLE.to_string(),
    };

    Ok(ChartDescriptor {
        title: title(text, Some(TITLE_FONT_FAMILY)),
        width: CHART_WIDTH,
        height: MAP_HEIGHT,
        x_axis: Axis {
            title: Some("Longitude".to_string()),
            scale: AxisScale::Linear,
            tick_angle: None,
            domain: lon_domain,
        },
        y_axis: Axis {
            title: Some("Latitude".to_string()),
            scale: AxisScale::Linear,
            tick_angle: None,
            domain: lat_domain,
        },
        color: ColorEncoding::Continuous {
            field: "total_injuries".to_string(),
            stops: ramp.stops.clone(),
            range: color_range,
        },
        hover: hover(fields, hover_label(Some("rgb(250, 99, 71)"), None)),
        body: ChartBody::GeoScatter(GeoScatter {
            map_style: MAP_STYLE.to_string(),
            zoom: if ctx.is_global() { GLOBAL_ZOOM } else { COUNTRY_ZOOM },
            center,
            size_max: MAP_SIZE_MAX,
            opacity: 1.0,
            markers,
        }),
    })
}

/// Animated bar chart: one frame per year, one bar per country.
pub fn build_year_bars(rows: &[YearCountryTotal]) -> ChartDescriptor {
    let countries: Vec<String> = rows
        .iter()
        .map(|r| r.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let colors = ColorPalette::plotly().assign_colors(&countries);

    let mut frames: BTreeMap<i32, Vec<Bar>> = BTreeMap::new();
    for row in rows {
        frames.entry(row.year).or_default().push(Bar {
            category: row.country.clone(),
            value: row.fatalities as f64,
            color: colors[&row.country].clone(),
            custom_data: vec![row.year.to_string(), row.fatalities.to_string()],
        });
    }
    for bars in frames.values_mut() {
        bars.sort_by(|a, b| a.category.cmp(&b.category));
    }

    let fields = ["Year", FATALITIES_LABEL];
    ChartDescriptor {
        title: title("Total Fatalities by Country Over the Years".to_string(), Some(TITLE_FONT_FAMILY)),
        width: CHART_WIDTH,
        height: YEAR_BAR_HEIGHT,
        x_axis: category_axis("", None),
        y_axis: log_axis(rows.iter().map(|r| r.fatalities as f64)),
        color: ColorEncoding::Discrete {
            field: "country".to_string(),
            legend: countries
                .iter()
                .map(|c| LegendEntry { label: c.clone(), color: colors[c].clone() })
                .collect(),
        },
        hover: hover(&fields, hover_label(Some("rgb(255, 187, 0)"), Some("white"))),
        body: ChartBody::AnimatedBar(AnimatedBar {
            frame_field: "year".to_string(),
            frames: frames
                .into_iter()
                .map(|(key, bars)| BarFrame { key, bars })
                .collect(),
        }),
    }
}

/// Stacked bars per state, one segment per year range.
pub fn build_state_bars(rows: &[StateRangeTotal], ctx: ChartContext<'_>) -> ChartDescriptor {
    let categories: Vec<String> = rows
        .iter()
        .map(|r| r.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let series: Vec<BarSeries> = YearRange::ALL
        .iter()
        .map(|&range| {
            let mut values = vec![None; categories.len()];
            let mut custom_data = vec![Vec::new(); categories.len()];
            for row in rows.iter().filter(|r| r.range == range) {
                let slot = index[row.state.as_str()];
                values[slot] = Some(row.fatalities as f64);
                custom_data[slot] = vec![range.label().to_string(), row.fatalities.to_string()];
            }
            BarSeries {
                name: range.label().to_string(),
                color: year_range_color(range).to_string(),
                values,
                custom_data,
            }
        })
        .collect();

    // Log domain has to cover the tallest stack, not just the tallest segment.
    let stack_heights: Vec<f64> = (0..categories.len())
        .map(|i| series.iter().filter_map(|s| s.values[i]).sum::<f64>())
        .collect();
    let smallest_segments = rows.iter().map(|r| r.fatalities as f64);

    let text = match ctx {
        ChartContext::Country(country) => format!("Total Fatalities by State in {country} Over Years"),
        ChartContext::Global | ChartContext::Unselected => UNSELECTED_TITLE.to_string(),
    };

    let fields = ["Year Range", FATALITIES_LABEL];
    ChartDescriptor {
        title: title(text, None),
        width: CHART_WIDTH,
        height: STATE_BAR_HEIGHT,
        x_axis: category_axis("States", Some(TICK_ANGLE)),
        y_axis: log_axis(stack_heights.into_iter().chain(smallest_segments)),
        color: ColorEncoding::Discrete {
            field: "year_range".to_string(),
            legend: series
                .iter()
                .map(|s| LegendEntry { label: s.name.clone(), color: s.color.clone() })
                .collect(),
        },
        hover: hover(&fields, hover_label(None, None)),
        body: ChartBody::StackedBar(StackedBar { categories, series }),
    }
}

/// Bubble chart of fatalities per weapon category.
pub fn build_weapon_bubbles(rows: &[WeaponTotal], ctx: ChartContext<'_>) -> ChartDescriptor {
    let size_max = if ctx.is_global() {
        GLOBAL_BUBBLE_SIZE_MAX
    } else {
        COUNTRY_BUBBLE_SIZE_MAX
    };
    let max = rows.iter().map(|r| r.fatalities).max().unwrap_or(0) as f64;
    let palette = ColorPalette::plotly();

    let bubbles: Vec<Bubble> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| Bubble {
            category: row.weapon.clone(),
            value: row.fatalities as f64,
            size: area_diameter(row.fatalities as f64, max, size_max),
            color: palette.color(i).to_string(),
            custom_data: vec![row.weapon.clone(), row.fatalities.to_string()],
        })
        .collect();

    let text = match ctx {
        ChartContext::Global => "Weapon Used Globally For Attacks".to_string(),
        ChartContext::Country(country) => format!("Weapons Used in {country} for Attacks"),
        ChartContext::Unselected => UNSELECTED_TITLE.to_string(),
    };

    let fields = ["Weapon", FATALITIES_LABEL];
    ChartDescriptor {
        title: title(text, None),
        width: CHART_WIDTH,
        height: BUBBLE_HEIGHT,
        x_axis: category_axis("Weapon", Some(TICK_ANGLE)),
        y_axis: log_axis(rows.iter().map(|r| r.fatalities as f64)),
        color: ColorEncoding::Discrete {
            field: "weapon".to_string(),
            legend: bubbles
                .iter()
                .map(|b| LegendEntry { label: b.category.clone(), color: b.color.clone() })
                .collect(),
        },
        hover: hover(&fields, hover_label(None, None)),
        body: ChartBody::Bubble(BubbleChart { size_max, bubbles }),
    }
}
