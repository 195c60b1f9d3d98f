// Runtime executor: one dashboard run from raw data to chart descriptors

use crate::aggregate::{
    aggregate_by_location, aggregate_by_state_and_year_range, aggregate_by_weapon,
    aggregate_by_year_and_country,
};
use crate::charts::{build_geo_scatter, build_state_bars, build_weapon_bubbles, build_year_bars, ChartContext};
use crate::data::Dataset;
use crate::error::DashboardError;
use crate::ir::ChartDescriptor;
use crate::normalize::{normalize, CleanDataset};
use crate::view::{select_view, Selection, View};
use serde::Serialize;

/// Output of one run: the chosen view and its three charts (map, bars, weapons).
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub view: View,
    pub charts: Vec<ChartDescriptor>,
}

impl Dashboard {
    pub fn map(&self) -> &ChartDescriptor {
        &self.charts[0]
    }

    pub fn bars(&self) -> &ChartDescriptor {
        &self.charts[1]
    }

    pub fn weapons(&self) -> &ChartDescriptor {
        &self.charts[2]
    }
}

/// Normalize `raw`, pick the view for `selection`, and build its charts.
///
/// All-or-nothing: any failure (e.g. an unparseable date) aborts the run.
pub fn render_dashboard(
    raw: &Dataset,
    selection: &Selection,
    plot_requested: bool,
) -> Result<Dashboard, DashboardError> {
    let clean = normalize(raw);
    let view = select_view(selection, plot_requested);
    log::debug!("selection '{selection}' (plot requested: {plot_requested}) -> {view:?}");

    let charts = match &view {
        View::Global => global_charts(&clean)?,
        View::Country(country) => country_charts(&clean, country)?,
        View::Unselected => vec![
            build_geo_scatter(&[], ChartContext::Unselected)?,
            build_state_bars(&[], ChartContext::Unselected),
            build_weapon_bubbles(&[], ChartContext::Unselected),
        ],
    };

    Ok(Dashboard { view, charts })
}

fn global_charts(clean: &CleanDataset) -> Result<Vec<ChartDescriptor>, DashboardError> {
    let locations = aggregate_by_location(&clean.all);
    let years = aggregate_by_year_and_country(&clean.known_regions);
    let weapons = aggregate_by_weapon(&clean.known_regions, None);

    Ok(vec![
        build_geo_scatter(&locations, ChartContext::Global)?,
        build_year_bars(&years),
        build_weapon_bubbles(&weapons, ChartContext::Global),
    ])
}

fn country_charts(clean: &CleanDataset, country: &str) -> Result<Vec<ChartDescriptor>, DashboardError> {
    if !clean.all.iter().any(|r| r.country == country) {
        log::warn!("no incidents recorded for '{country}'; charts will be empty");
    }

    let locations: Vec<_> = aggregate_by_location(&clean.all)
        .into_iter()
        .filter(|r| r.country == country)
        .collect();
    let ranges = aggregate_by_state_and_year_range(&clean.known_regions, country);
    let weapons = aggregate_by_weapon(&clean.known_regions, Some(country));

    let ctx = ChartContext::Country(country);
    Ok(vec![
        build_geo_scatter(&locations, ctx)?,
        build_state_bars(&ranges, ctx),
        build_weapon_bubbles(&weapons, ctx),
    ])
}
