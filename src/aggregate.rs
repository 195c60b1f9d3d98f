//! Grouping passes over normalized incident records.
//!
//! Every operation is a pure function of its input slice. Groups come back in
//! ascending key order.

use crate::data::IncidentRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Fixed, right-closed year buckets used by the per-state bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum YearRange {
    #[serde(rename = "1970-1980")]
    Seventies,
    #[serde(rename = "1981-1990")]
    Eighties,
    #[serde(rename = "1991-2000")]
    Nineties,
    #[serde(rename = "2001-2010")]
    Noughties,
    #[serde(rename = "2011-2017")]
    Tens,
}

impl YearRange {
    pub const ALL: [YearRange; 5] = [
        YearRange::Seventies,
        YearRange::Eighties,
        YearRange::Nineties,
        YearRange::Noughties,
        YearRange::Tens,
    ];

    /// Exclusive lower edge of the first bucket.
    const FIRST_LOWER: i32 = 1969;

    /// Inclusive upper edge of this bucket.
    pub const fn upper(self) -> i32 {
        match self {
            YearRange::Seventies => 1980,
            YearRange::Eighties => 1990,
            YearRange::Nineties => 2000,
            YearRange::Noughties => 2010,
            YearRange::Tens => 2017,
        }
    }

    /// Inclusive lower edge of this bucket.
    pub const fn lower(self) -> i32 {
        match self {
            YearRange::Seventies => Self::FIRST_LOWER + 1,
            YearRange::Eighties => YearRange::Seventies.upper() + 1,
            YearRange::Nineties => YearRange::Eighties.upper() + 1,
            YearRange::Noughties => YearRange::Nineties.upper() + 1,
            YearRange::Tens => YearRange::Noughties.upper() + 1,
        }
    }

    /// Bucket for `year`: the first bucket whose upper edge is >= year and whose
    /// predecessor's upper edge is < year. `None` outside 1970-2017.
    pub fn from_year(year: i32) -> Option<YearRange> {
        let mut previous_upper = Self::FIRST_LOWER;
        for range in Self::ALL {
            if year > previous_upper && year <= range.upper() {
                return Some(range);
            }
            previous_upper = range.upper();
        }
        None
    }

    pub fn label(self) -> &'static str {
        match self {
            YearRange::Seventies => "1970-1980",
            YearRange::Eighties => "1981-1990",
            YearRange::Nineties => "1991-2000",
            YearRange::Noughties => "2001-2010",
            YearRange::Tens => "2011-2017",
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Casualties per (country, state, date) with the centroid of the group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAggregate {
    pub country: String,
    pub state: String,
    pub date: String,
    pub total_kills: u64,
    pub total_injuries: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCountryTotal {
    pub year: i32,
    pub country: String,
    pub fatalities: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateRangeTotal {
    pub state: String,
    pub range: YearRange,
    pub fatalities: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponTotal {
    pub weapon: String,
    pub fatalities: u64,
}

/// Running mean that skips missing values.
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct LocationAccumulator {
    kills: u64,
    injuries: u64,
    latitude: Mean,
    longitude: Mean,
}

pub fn aggregate_by_location(records: &[IncidentRecord]) -> Vec<LocationAggregate> {
    let mut groups: BTreeMap<(&str, &str, &str), LocationAccumulator> = BTreeMap::new();

    for record in records {
        let acc = groups
            .entry((record.country.as_str(), record.state.as_str(), record.date.as_str()))
            .or_default();
        acc.kills += u64::from(record.fatalities);
        acc.injuries += u64::from(record.injuries);
        acc.latitude.push(record.latitude);
        acc.longitude.push(record.longitude);
    }

    groups
        .into_iter()
        .map(|((country, state, date), acc)| LocationAggregate {
            country: country.to_string(),
            state: state.to_string(),
            date: date.to_string(),
            total_kills: acc.kills,
            total_injuries: acc.injuries,
            latitude: acc.latitude.value(),
            longitude: acc.longitude.value(),
        })
        .collect()
}

pub fn aggregate_by_year_and_country(records: &[IncidentRecord]) -> Vec<YearCountryTotal> {
    let mut groups: BTreeMap<(i32, &str), u64> = BTreeMap::new();
    for record in records {
        *groups.entry((record.year, record.country.as_str())).or_default() += u64::from(record.fatalities);
    }

    groups
        .into_iter()
        .map(|((year, country), fatalities)| YearCountryTotal {
            year,
            country: country.to_string(),
            fatalities,
        })
        .collect()
}

/// Fatalities per weapon, optionally restricted to one country.
pub fn aggregate_by_weapon(records: &[IncidentRecord], country: Option<&str>) -> Vec<WeaponTotal> {
    let mut groups: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| country.map_or(true, |c| r.country == c))
    {
        *groups.entry(record.weapon.as_str()).or_default() += u64::from(record.fatalities);
    }

    groups
        .into_iter()
        .map(|(weapon, fatalities)| WeaponTotal {
            weapon: weapon.to_string(),
            fatalities,
        })
        .collect()
}

/// Fatalities per (state, year range) within one country.
///
/// Records whose year has no bucket are dropped.
pub fn aggregate_by_state_and_year_range(
    records: &[IncidentRecord],
    country: &str,
) -> Vec<StateRangeTotal> {
    let mut groups: BTreeMap<(&str, YearRange), u64> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records.iter().filter(|r| r.country == country) {
        match YearRange::from_year(record.year) {
            Some(range) => {
                *groups.entry((record.state.as_str(), range)).or_default() += u64::from(record.fatalities);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!("{dropped} records in {country} fall outside 1970-2017 and were left out of the year ranges");
    }

    groups
        .into_iter()
        .map(|((state, range), fatalities)| StateRangeTotal {
            state: state.to_string(),
            range,
            fatalities,
        })
        .collect()
}
