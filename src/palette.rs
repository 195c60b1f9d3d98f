//! Color vocabulary shared by the chart builders and the static renderer.

use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::YearRange;

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse a CSS-style name (`"darkred"`), `#rrggbb`, or `rgb(r, g, b)`.
    pub fn parse(color: &str) -> Option<Rgb> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            if hex.len() != 6 {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return Some(Rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        if let Some(body) = color.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let mut parts = body.split(',').map(|p| p.trim().parse::<u8>().ok());
            let r = parts.next()??;
            let g = parts.next()??;
            let b = parts.next()??;
            return parts.next().is_none().then_some(Rgb(r, g, b));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(color))
            .map(|(_, rgb)| *rgb)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("lightcoral", Rgb(240, 128, 128)),
    ("red", Rgb(255, 0, 0)),
    ("darkred", Rgb(139, 0, 0)),
    ("blue", Rgb(0, 0, 255)),
    ("orange", Rgb(255, 165, 0)),
    ("green", Rgb(0, 128, 0)),
    ("purple", Rgb(128, 0, 128)),
    ("white", Rgb(255, 255, 255)),
    ("black", Rgb(0, 0, 0)),
    ("gray", Rgb(128, 128, 128)),
];

/// One stop of a continuous color scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// Piecewise-linear color scale over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRamp {
    pub stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// lightcoral -> red -> darkred
    pub fn red() -> Self {
        Self {
            stops: vec![
                ColorStop { offset: 0.0, color: "lightcoral".to_string() },
                ColorStop { offset: 0.5, color: "red".to_string() },
                ColorStop { offset: 1.0, color: "darkred".to_string() },
            ],
        }
    }

    /// Color for `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let parsed: Vec<(f64, Rgb)> = self
            .stops
            .iter()
            .map(|s| (s.offset, Rgb::parse(&s.color).unwrap_or(Rgb(0, 0, 0))))
            .collect();

        let Some(&(first_offset, first)) = parsed.first() else {
            return Rgb(0, 0, 0);
        };
        if t <= first_offset {
            return first;
        }
        for pair in parsed.windows(2) {
            let (lo, lo_color) = pair[0];
            let (hi, hi_color) = pair[1];
            if t <= hi {
                let span = hi - lo;
                let local = if span > 0.0 { (t - lo) / span } else { 1.0 };
                return lo_color.lerp(hi_color, local);
            }
        }
        parsed.last().map_or(first, |&(_, c)| c)
    }

    /// Color for `value` with the scale stretched over `range`; values outside are clipped.
    pub fn color_for(&self, value: f64, range: (f64, f64)) -> Rgb {
        let (lo, hi) = range;
        let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.0 };
        self.sample(t)
    }
}

/// Categorical palette handing out colors in a fixed order.
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// Plotly's default qualitative sequence.
    pub fn plotly() -> Self {
        Self {
            colors: vec![
                "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a",
                "#19d3f3", "#ff6692", "#b6e880", "#ff97ff", "#fecb52",
            ],
        }
    }

    pub fn color(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }

    /// Assign colors to keys in the given order, cycling when keys outnumber colors.
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), self.color(i).to_string()))
            .collect()
    }
}

/// Fixed color per year range in the per-state bar chart.
pub fn year_range_color(range: YearRange) -> &'static str {
    match range {
        YearRange::Seventies => "blue",
        YearRange::Eighties => "orange",
        YearRange::Nineties => "green",
        YearRange::Noughties => "red",
        YearRange::Tens => "purple",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Rgb::parse("darkred"), Some(Rgb(139, 0, 0)));
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb(255, 128, 0)));
        assert_eq!(Rgb::parse("rgb(250, 99, 71)"), Some(Rgb(250, 99, 71)));
        assert_eq!(Rgb::parse("rgb(1, 2)"), None);
        assert_eq!(Rgb::parse("#12"), None);
        assert_eq!(Rgb::parse("chartreuse-ish"), None);
    }

    #[test]
    fn test_red_ramp_stops() {
        let ramp = ColorRamp::red();
        assert_eq!(ramp.sample(0.0), Rgb(240, 128, 128));
        assert_eq!(ramp.sample(0.5), Rgb(255, 0, 0));
        assert_eq!(ramp.sample(1.0), Rgb(139, 0, 0));
        assert_eq!(ramp.sample(7.0), Rgb(139, 0, 0));
        assert_eq!(ramp.sample(-1.0), Rgb(240, 128, 128));
    }

    #[test]
    fn test_color_for_clips_to_range() {
        let ramp = ColorRamp::red();
        assert_eq!(ramp.color_for(10.0, (1000.0, 50000.0)), Rgb(240, 128, 128));
        assert_eq!(ramp.color_for(90000.0, (1000.0, 50000.0)), Rgb(139, 0, 0));
        assert_eq!(ramp.color_for(5.0, (0.0, 0.0)), Rgb(240, 128, 128));
    }

    #[test]
    fn test_assign_colors_cycles() {
        let keys: Vec<String> = (0..12).map(|i| format!("k{i}")).collect();
        let colors = ColorPalette::plotly().assign_colors(&keys);
        assert_eq!(colors["k0"], "#636efa");
        assert_eq!(colors["k10"], "#636efa");
        assert_eq!(colors["k11"], "#ef553b");
    }

    #[test]
    fn test_year_range_colors_distinct() {
        let colors: std::collections::HashSet<_> = YearRange::ALL.iter().map(|r| year_range_color(*r)).collect();
        assert_eq!(colors.len(), 5);
    }
}
