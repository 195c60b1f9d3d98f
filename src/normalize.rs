//! One-time cleanup of the raw incident table.
//!
//! Region names come from many transliterations of the same place; they are
//! folded onto one canonical spelling through an exact alias table and a
//! small table of prefix patterns. The result is a new dataset, the raw one
//! is left untouched.

use crate::data::{Dataset, IncidentRecord};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Region value used by the source data when the region is not known.
pub const UNKNOWN_REGION: &str = "Unknown";

const REGION_ALIASES: &[(&str, &str)] = &[
    ("Paktika Province", "Paktika"),
    ("Fier (County)", "Fier"),
    ("Kukës (County)", "Kukes"),
    ("Aïn Defla", "Aïn Defla (Province)"),
    ("Bordj Bou Arréridj", "Bordj Bou Arreridj"),
];

const REGION_PATTERNS: &[(&str, &str)] = &[
    (r"^Batna.*", "Batna(Province)"),
    (r"^Bejaia.*", "Bejaia(Province)"),
    (r"^Boumerdés.*", "Boumerdes Province"),
];

const WEAPON_ALIASES: &[(&str, &str)] = &[(
    "Vehicle (not to include vehicle-borne explosives, i.e., car or truck bombs)",
    "Vehicle",
)];

static REGION_TABLE: LazyLock<RegionTable> = LazyLock::new(RegionTable::new);

/// Lookup tables for region canonicalization.
pub struct RegionTable {
    aliases: HashMap<&'static str, &'static str>,
    patterns: Vec<(Regex, &'static str)>,
}

impl RegionTable {
    pub fn new() -> Self {
        let aliases = REGION_ALIASES.iter().copied().collect();
        let patterns = REGION_PATTERNS
            .iter()
            .map(|&(pattern, canonical)| {
                (Regex::new(pattern).unwrap_or_else(|_| unreachable!()), canonical)
            })
            .collect();
        Self { aliases, patterns }
    }

    /// Process-wide table, built on first use.
    pub fn shared() -> &'static RegionTable {
        &REGION_TABLE
    }

    /// Canonical spelling for `region`. Canonical names map to themselves.
    pub fn canonical<'a>(&self, region: &'a str) -> &'a str {
        if let Some(canonical) = self.aliases.get(region) {
            return *canonical;
        }
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(region))
            .map_or(region, |(_, canonical)| *canonical)
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn canonical_weapon(weapon: &str) -> &str {
    WEAPON_ALIASES
        .iter()
        .find(|(variant, _)| *variant == weapon)
        .map_or(weapon, |(_, canonical)| *canonical)
}

/// Normalized dataset with the two views downstream aggregates read from.
#[derive(Debug, Clone, Default)]
pub struct CleanDataset {
    /// Every record, canonicalized. The location aggregate reads this view.
    pub all: Vec<IncidentRecord>,
    /// Canonicalized records without the `Unknown` region.
    pub known_regions: Vec<IncidentRecord>,
}

impl CleanDataset {
    /// Sorted distinct canonical region names.
    pub fn regions(&self) -> Vec<String> {
        self.all
            .iter()
            .map(|r| r.state.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Canonicalize one record's region and weapon labels.
pub fn normalize_record(record: &IncidentRecord, regions: &RegionTable) -> IncidentRecord {
    IncidentRecord {
        state: regions.canonical(&record.state).to_string(),
        weapon: canonical_weapon(&record.weapon).to_string(),
        ..record.clone()
    }
}

pub fn normalize(raw: &Dataset) -> CleanDataset {
    let regions = RegionTable::shared();

    let all: Vec<IncidentRecord> = raw
        .records
        .iter()
        .map(|r| normalize_record(r, regions))
        .collect();

    let known_regions: Vec<IncidentRecord> = all
        .iter()
        .filter(|r| r.state != UNKNOWN_REGION)
        .cloned()
        .collect();

    log::debug!(
        "normalized {} records ({} with unknown region)",
        all.len(),
        all.len() - known_regions.len()
    );

    CleanDataset { all, known_regions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, weapon: &str) -> IncidentRecord {
        IncidentRecord {
            country: "Algeria".to_string(),
            state: state.to_string(),
            date: "1995-03-01".to_string(),
            year: 1995,
            latitude: Some(36.0),
            longitude: Some(3.0),
            fatalities: 1,
            injuries: 0,
            weapon: weapon.to_string(),
        }
    }

    #[test]
    fn test_alias_table() {
        let table = RegionTable::new();
        assert_eq!(table.canonical("Paktika Province"), "Paktika");
        assert_eq!(table.canonical("Kukës (County)"), "Kukes");
        assert_eq!(table.canonical("Aïn Defla"), "Aïn Defla (Province)");
        assert_eq!(table.canonical("Baghdad"), "Baghdad");
    }

    #[test]
    fn test_shared_table_built_once() {
        let first = RegionTable::shared();
        let second = RegionTable::shared();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.canonical("Bejaia Province"), "Bejaia(Province)");
    }

    #[test]
    fn test_prefix_patterns() {
        let table = RegionTable::new();
        assert_eq!(table.canonical("Batna"), "Batna(Province)");
        assert_eq!(table.canonical("Batna (Province)"), "Batna(Province)");
        assert_eq!(table.canonical("Boumerdés (Province)"), "Boumerdes Province");
    }

    #[test]
    fn test_region_normalization_idempotent() {
        let table = RegionTable::new();
        let names = [
            "Paktika Province",
            "Fier (County)",
            "Kukës (County)",
            "Aïn Defla",
            "Bordj Bou Arréridj",
            "Batna",
            "Bejaia Province",
            "Boumerdés",
            "Unknown",
            "Lima",
        ];
        for name in names {
            let once = table.canonical(name);
            assert_eq!(table.canonical(once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn test_weapon_label() {
        assert_eq!(
            canonical_weapon("Vehicle (not to include vehicle-borne explosives, i.e., car or truck bombs)"),
            "Vehicle"
        );
        assert_eq!(canonical_weapon("Firearms"), "Firearms");
    }

    #[test]
    fn test_unknown_only_leaves_known_view() {
        let raw = Dataset::new(vec![
            record("Unknown", "Firearms"),
            record("Batna", "Explosives"),
        ]);
        let clean = normalize(&raw);
        assert_eq!(clean.all.len(), 2);
        assert_eq!(clean.known_regions.len(), 1);
        assert_eq!(clean.known_regions[0].state, "Batna(Province)");
    }

    #[test]
    fn test_normalize_does_not_touch_raw() {
        let raw = Dataset::new(vec![record("Paktika Province", "Firearms")]);
        let clean = normalize(&raw);
        assert_eq!(raw.records[0].state, "Paktika Province");
        assert_eq!(clean.all[0].state, "Paktika");
    }

    #[test]
    fn test_regions_deduplicated() {
        let raw = Dataset::new(vec![
            record("Fier (County)", "Firearms"),
            record("Fier", "Firearms"),
            record("Tirana", "Firearms"),
        ]);
        assert_eq!(normalize(&raw).regions(), vec!["Fier", "Tirana"]);
    }
}
