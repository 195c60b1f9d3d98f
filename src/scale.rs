//! Axis domains and mark sizing shared by the chart builders and the renderer.

#[derive(Debug, Clone, Default)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Extent of the finite values, `None` when there are none.
    pub fn of<I>(values: I) -> Option<MinMax>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for val in values.into_iter().filter(|v| v.is_finite()) {
            if val < min { min = val; }
            if val > max { max = val; }
        }
        (min <= max).then_some(MinMax { min, max })
    }
}

/// Extend a range by 5% on each side; a degenerate range is widened by 1.
pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

/// Log-axis domain covering every positive value, snapped to whole decades.
///
/// Zero and negative values cannot sit on a log axis and are ignored. With no
/// positive values the domain is `(1, 10)`.
pub fn log_domain<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    match MinMax::of(values.into_iter().filter(|v| *v > 0.0)) {
        Some(mm) => {
            let lo = 10f64.powi(mm.min.log10().floor() as i32);
            let mut hi = 10f64.powi(mm.max.log10().ceil() as i32);
            if hi <= lo {
                hi = lo * 10.0;
            }
            (lo, hi)
        }
        None => (1.0, 10.0),
    }
}

/// Diameter for an area-proportional mark: the largest value gets `size_max`.
pub fn area_diameter(value: f64, max: f64, size_max: f64) -> f64 {
    if max <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    size_max * (value / max).sqrt()
}

/// Mean (latitude, longitude) of the points, `(0, 0)` for none.
pub fn centroid<I>(points: I) -> (f64, f64)
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for (la, lo) in points {
        lat += la;
        lon += lo;
        n += 1;
    }
    if n == 0 {
        (0.0, 0.0)
    } else {
        (lat / n as f64, lon / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_range() {
        assert_eq!(pad_range(5.0, 5.0), (4.0, 6.0));
        let (lo, hi) = pad_range(0.0, 100.0);
        assert_eq!((lo, hi), (-5.0, 105.0));
    }

    #[test]
    fn test_min_max_skips_non_finite() {
        let mm = MinMax::of(vec![3.0, f64::NAN, -2.0, f64::INFINITY]).unwrap();
        assert_eq!((mm.min, mm.max), (-2.0, 3.0));
        assert!(MinMax::of(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_log_domain_decades() {
        assert_eq!(log_domain(vec![3.0, 450.0]), (1.0, 1000.0));
        assert_eq!(log_domain(vec![0.0, 20.0, 20.0]), (10.0, 100.0));
        assert_eq!(log_domain(vec![100.0]), (100.0, 1000.0));
        assert_eq!(log_domain(vec![0.0]), (1.0, 10.0));
    }

    #[test]
    fn test_area_diameter() {
        assert_eq!(area_diameter(100.0, 100.0, 40.0), 40.0);
        assert_eq!(area_diameter(25.0, 100.0, 40.0), 20.0);
        assert_eq!(area_diameter(0.0, 100.0, 40.0), 0.0);
        assert_eq!(area_diameter(5.0, 0.0, 40.0), 0.0);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(vec![(10.0, 20.0), (30.0, 40.0)]), (20.0, 30.0));
        assert_eq!(centroid(Vec::<(f64, f64)>::new()), (0.0, 0.0));
    }
}
