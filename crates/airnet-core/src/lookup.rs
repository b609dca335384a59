//! Read-only reference lookups passed into every engine call.
//!
//! These are built once by the ingestion layer and never mutated by the
//! scoring or simulation code.

use crate::models::normalize_code;
use crate::spatial::haversine_miles;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Metro-area resolution for one airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CbsaResolution {
    /// Airport sits inside a U.S. Core-Based Statistical Area
    Metro { id: String, name: String },
    /// Airport is outside the domestic metro-area lookup
    NonUs,
    /// Airport is not present in the lookup at all
    Unresolved,
}

impl CbsaResolution {
    pub fn is_metro(&self) -> bool {
        matches!(self, CbsaResolution::Metro { .. })
    }

    pub fn metro_id(&self) -> Option<&str> {
        match self {
            CbsaResolution::Metro { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Airport code -> CBSA resolution.
#[derive(Debug, Clone, Default)]
pub struct CbsaLookup {
    entries: BTreeMap<String, CbsaResolution>,
}

impl CbsaLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an airport inside a metro area.
    pub fn insert_metro(&mut self, airport: &str, cbsa_id: &str, cbsa_name: &str) {
        let Some(code) = normalize_code(airport) else {
            return;
        };
        self.entries.insert(
            code,
            CbsaResolution::Metro {
                id: cbsa_id.trim().to_string(),
                name: cbsa_name.trim().to_string(),
            },
        );
    }

    /// Record an airport that is known but outside the domestic lookup.
    pub fn insert_non_us(&mut self, airport: &str) {
        if let Some(code) = normalize_code(airport) {
            self.entries.insert(code, CbsaResolution::NonUs);
        }
    }

    /// Resolve an airport. Codes never inserted resolve to `Unresolved`.
    pub fn resolve(&self, airport: &str) -> CbsaResolution {
        normalize_code(airport)
            .and_then(|code| self.entries.get(&code).cloned())
            .unwrap_or(CbsaResolution::Unresolved)
    }

    /// Airports resolving to a metro area, in code order.
    pub fn metro_airports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(code, resolution)| {
            resolution.metro_id().map(|id| (code.as_str(), id))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Airport code -> (latitude, longitude) in degrees.
#[derive(Debug, Clone, Default)]
pub struct AirportCoords {
    coords: BTreeMap<String, (f64, f64)>,
}

impl AirportCoords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a coordinate pair. Out-of-range or non-finite values are rejected.
    pub fn insert(&mut self, airport: &str, lat: f64, lon: f64) -> bool {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        match normalize_code(airport) {
            Some(code) if valid => {
                self.coords.insert(code, (lat, lon));
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, airport: &str) -> Option<(f64, f64)> {
        normalize_code(airport).and_then(|code| self.coords.get(&code).copied())
    }

    /// Great-circle distance in miles, `None` when either airport lacks coordinates.
    pub fn distance_miles(&self, from: &str, to: &str) -> Option<f64> {
        let (lat1, lon1) = self.get(from)?;
        let (lat2, lon2) = self.get(to)?;
        Some(haversine_miles(lat1, lon1, lat2, lon2))
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Broad airframe class used for capability matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Regional,
    Narrowbody,
    Widebody,
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EquipmentCategory::Regional => "regional",
            EquipmentCategory::Narrowbody => "narrowbody",
            EquipmentCategory::Widebody => "widebody",
        };
        f.write_str(label)
    }
}

/// Static performance figures for one equipment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    pub code: String,
    pub seats: u32,
    pub max_range_miles: f64,
    pub category: EquipmentCategory,
    pub typical_stage_miles: f64,
    pub typical_load_factor: f64,
}

// code, seats, max range (mi), category, typical stage (mi), typical load factor
const DEFAULT_EQUIPMENT: &[(&str, u32, f64, EquipmentCategory, f64, f64)] = &[
    ("A319", 128, 3_400.0, EquipmentCategory::Narrowbody, 1_000.0, 0.83),
    ("A320", 150, 3_000.0, EquipmentCategory::Narrowbody, 1_100.0, 0.84),
    ("A321", 190, 3_400.0, EquipmentCategory::Narrowbody, 1_300.0, 0.85),
    ("A20N", 165, 3_900.0, EquipmentCategory::Narrowbody, 1_200.0, 0.85),
    ("A21N", 196, 4_000.0, EquipmentCategory::Narrowbody, 1_500.0, 0.86),
    ("B737", 143, 3_000.0, EquipmentCategory::Narrowbody, 800.0, 0.82),
    ("B738", 166, 3_500.0, EquipmentCategory::Narrowbody, 1_100.0, 0.85),
    ("B739", 179, 3_400.0, EquipmentCategory::Narrowbody, 1_200.0, 0.85),
    ("B38M", 172, 4_000.0, EquipmentCategory::Narrowbody, 1_150.0, 0.85),
    ("B39M", 193, 4_000.0, EquipmentCategory::Narrowbody, 1_300.0, 0.86),
    ("B752", 176, 4_500.0, EquipmentCategory::Narrowbody, 1_900.0, 0.84),
    ("B763", 211, 6_000.0, EquipmentCategory::Widebody, 3_000.0, 0.83),
    ("B772", 276, 7_700.0, EquipmentCategory::Widebody, 4_500.0, 0.84),
    ("B77W", 350, 8_400.0, EquipmentCategory::Widebody, 5_200.0, 0.85),
    ("B788", 242, 8_400.0, EquipmentCategory::Widebody, 4_500.0, 0.85),
    ("B789", 290, 8_800.0, EquipmentCategory::Widebody, 5_000.0, 0.86),
    ("A332", 247, 8_300.0, EquipmentCategory::Widebody, 4_000.0, 0.84),
    ("A333", 290, 7_200.0, EquipmentCategory::Widebody, 3_800.0, 0.85),
    ("A359", 306, 9_300.0, EquipmentCategory::Widebody, 5_500.0, 0.86),
    ("E170", 72, 2_100.0, EquipmentCategory::Regional, 500.0, 0.79),
    ("E175", 76, 2_200.0, EquipmentCategory::Regional, 550.0, 0.80),
    ("E190", 100, 2_600.0, EquipmentCategory::Regional, 700.0, 0.80),
    ("CRJ2", 50, 1_500.0, EquipmentCategory::Regional, 400.0, 0.77),
    ("CRJ7", 70, 1_600.0, EquipmentCategory::Regional, 450.0, 0.79),
    ("CRJ9", 76, 1_800.0, EquipmentCategory::Regional, 500.0, 0.80),
    ("DH8D", 76, 1_200.0, EquipmentCategory::Regional, 300.0, 0.76),
    ("AT72", 70, 900.0, EquipmentCategory::Regional, 250.0, 0.75),
];

/// Equipment code -> static figures.
#[derive(Debug, Clone)]
pub struct EquipmentTable {
    specs: HashMap<String, EquipmentSpec>,
}

impl Default for EquipmentTable {
    fn default() -> Self {
        let specs = DEFAULT_EQUIPMENT
            .iter()
            .map(|&(code, seats, range, category, stage, load_factor)| {
                (
                    code.to_string(),
                    EquipmentSpec {
                        code: code.to_string(),
                        seats,
                        max_range_miles: range,
                        category,
                        typical_stage_miles: stage,
                        typical_load_factor: load_factor,
                    },
                )
            })
            .collect();
        Self { specs }
    }
}

impl EquipmentTable {
    /// A table with no entries, for callers that supply every spec themselves.
    pub fn empty() -> Self {
        Self { specs: HashMap::new() }
    }

    pub fn insert(&mut self, spec: EquipmentSpec) {
        self.specs.insert(spec.code.to_ascii_uppercase(), spec);
    }

    pub fn get(&self, code: &str) -> Option<&EquipmentSpec> {
        normalize_code(code).and_then(|code| self.specs.get(&code))
    }

    pub fn category_of(&self, code: &str) -> Option<EquipmentCategory> {
        self.get(code).map(|spec| spec.category)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
