use anyhow::{anyhow, bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::ir::{AnimatedBar, BarFrame, BubbleChart, ChartBody, ChartDescriptor, GeoScatter, StackedBar};
use crate::palette::Rgb;
use crate::{OutputFormat, RenderOptions};

/// Bar width as a share of one category slot
const BAR_WIDTH: f64 = 0.8;

/// Largest accepted image side, in pixels.
const MAX_DIMENSION: u32 = 16_384;

/// Render one chart descriptor to PNG or SVG bytes.
///
/// Maps are drawn as a plain longitude/latitude scatter (no basemap tiles);
/// animated bar charts are drawn for a single frame, `options.frame` or the
/// latest one.
pub fn render_chart(chart: &ChartDescriptor, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = options.dimensions(chart);
    check_dimensions(width, height)?;

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; rgb_buffer_len(width, height)?];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
                draw_chart(&root, chart, options)?;
                root.present().map_err(|e| anyhow!("Failed to present drawing: {e}"))?;
            }
            encode_png(&buffer, width, height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                draw_chart(&root, chart, options)?;
                root.present().map_err(|e| anyhow!("Failed to present drawing: {e}"))?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("image dimensions must be non-zero, got {width}x{height}");
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!("image dimensions too large: {width}x{height} (max {MAX_DIMENSION} per side)");
    }
    Ok(())
}

/// Byte length of an RGB buffer for the given size.
fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| anyhow!("image dimensions too large: {width}x{height}"))
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    options: &RenderOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("Failed to fill background: {e}"))?;

    match &chart.body {
        ChartBody::GeoScatter(map) => draw_geo_scatter(root, chart, map),
        ChartBody::AnimatedBar(bars) => {
            let frame = pick_frame(bars, options.frame);
            draw_frame(root, chart, frame)
        }
        ChartBody::StackedBar(bars) => draw_stacked_bars(root, chart, bars),
        ChartBody::Bubble(bubbles) => draw_bubbles(root, chart, bubbles),
    }
}

/// The requested frame if present, otherwise the latest.
fn pick_frame(bars: &AnimatedBar, key: Option<i32>) -> Option<&BarFrame> {
    key.and_then(|k| bars.frames.iter().find(|f| f.key == k))
        .or_else(|| bars.frames.last())
}

fn draw_geo_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    map: &GeoScatter,
) -> Result<()> {
    let (x0, x1) = chart.x_axis.domain.unwrap_or((-180.0, 180.0));
    let (y0, y1) = chart.y_axis.domain.unwrap_or((-90.0, 90.0));

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title.text, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| anyhow!("Failed to build chart: {e}"))?;

    ctx.configure_mesh()
        .x_desc(chart.x_axis.title.clone().unwrap_or_default())
        .y_desc(chart.y_axis.title.clone().unwrap_or_default())
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {e}"))?;

    ctx.draw_series(map.markers.iter().map(|m| {
        let radius = (m.size / 2.0).max(1.0).round() as i32;
        Circle::new(
            (m.longitude, m.latitude),
            radius,
            parse_color(&m.color).mix(map.opacity).filled(),
        )
    }))
    .map_err(|e| anyhow!("Failed to draw markers: {e}"))?;

    Ok(())
}

fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    frame: Option<&BarFrame>,
) -> Result<()> {
    let (lo, hi) = chart.y_axis.domain.unwrap_or((1.0, 10.0));
    let bars = frame.map(|f| f.bars.as_slice()).unwrap_or_default();
    let categories: Vec<String> = bars.iter().map(|b| b.category.clone()).collect();
    let caption = match frame {
        Some(f) => format!("{} ({})", chart.title.text, f.key),
        None => chart.title.text.clone(),
    };

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(caption, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..(categories.len().max(1) as f64), (lo..hi).log_scale())
        .map_err(|e| anyhow!("Failed to build chart: {e}"))?;

    ctx.configure_mesh()
        .x_labels(categories.len().max(1))
        .x_label_formatter(&|x| category_label(&categories, *x))
        .y_desc(chart.y_axis.title.clone().unwrap_or_default())
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {e}"))?;

    for (cat_idx, bar) in bars.iter().enumerate() {
        if bar.value <= 0.0 {
            continue;
        }
        let x_center = cat_idx as f64 + 0.5;
        ctx.draw_series(std::iter::once(Rectangle::new(
            [
                (x_center - BAR_WIDTH / 2.0, lo),
                (x_center + BAR_WIDTH / 2.0, bar.value),
            ],
            parse_color(&bar.color).filled(),
        )))
        .map_err(|e| anyhow!("Failed to draw bar: {e}"))?;
    }

    Ok(())
}

fn draw_stacked_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    bars: &StackedBar,
) -> Result<()> {
    let (lo, hi) = chart.y_axis.domain.unwrap_or((1.0, 10.0));
    let num_categories = bars.categories.len();

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title.text, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..(num_categories.max(1) as f64), (lo..hi).log_scale())
        .map_err(|e| anyhow!("Failed to build chart: {e}"))?;

    ctx.configure_mesh()
        .x_labels(num_categories.max(1))
        .x_label_formatter(&|x| category_label(&bars.categories, *x))
        .x_desc(chart.x_axis.title.clone().unwrap_or_default())
        .y_desc(chart.y_axis.title.clone().unwrap_or_default())
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {e}"))?;

    // Stacking happens in data space; the log axis only changes how it is drawn.
    let mut tops = vec![0.0f64; num_categories];
    for series in &bars.series {
        let color = parse_color(&series.color);
        let mut rects = Vec::new();
        for (cat_idx, value) in series.values.iter().enumerate() {
            let Some(value) = value.filter(|v| *v > 0.0) else {
                continue;
            };
            let x_center = cat_idx as f64 + 0.5;
            let bottom = if tops[cat_idx] > 0.0 { tops[cat_idx] } else { lo };
            tops[cat_idx] += value;
            rects.push(Rectangle::new(
                [
                    (x_center - BAR_WIDTH / 2.0, bottom),
                    (x_center + BAR_WIDTH / 2.0, tops[cat_idx]),
                ],
                color.filled(),
            ));
        }

        ctx.draw_series(rects)
            .map_err(|e| anyhow!("Failed to draw bar: {e}"))?
            .label(series.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("Failed to draw legend: {e}"))?;

    Ok(())
}

fn draw_bubbles<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartDescriptor,
    bubbles: &BubbleChart,
) -> Result<()> {
    let (lo, hi) = chart.y_axis.domain.unwrap_or((1.0, 10.0));
    let categories: Vec<String> = bubbles.bubbles.iter().map(|b| b.category.clone()).collect();

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title.text, ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..(categories.len().max(1) as f64), (lo..hi).log_scale())
        .map_err(|e| anyhow!("Failed to build chart: {e}"))?;

    ctx.configure_mesh()
        .x_labels(categories.len().max(1))
        .x_label_formatter(&|x| category_label(&categories, *x))
        .x_desc(chart.x_axis.title.clone().unwrap_or_default())
        .y_desc(chart.y_axis.title.clone().unwrap_or_default())
        .draw()
        .map_err(|e| anyhow!("Failed to draw mesh: {e}"))?;

    ctx.draw_series(
        bubbles
            .bubbles
            .iter()
            .enumerate()
            .filter(|(_, b)| b.value > 0.0)
            .map(|(i, b)| {
                let radius = (b.size / 2.0).max(1.0).round() as i32;
                Circle::new((i as f64 + 0.5, b.value), radius, parse_color(&b.color).mix(0.8).filled())
            }),
    )
    .map_err(|e| anyhow!("Failed to draw bubbles: {e}"))?;

    Ok(())
}

/// Label for the category slot containing `x`.
fn category_label(categories: &[String], x: f64) -> String {
    if x < 0.0 {
        return String::new();
    }
    categories.get(x as usize).cloned().unwrap_or_default()
}

/// Parse a descriptor color, falling back to blue.
fn parse_color(color: &str) -> RGBColor {
    match Rgb::parse(color) {
        Some(Rgb(r, g, b)) => RGBColor(r, g, b),
        None => BLUE,
    }
}
