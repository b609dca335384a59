//! Immutable data snapshot shared by every request.

use crate::error::{DataError, DataResult};
use crate::loader::{
    read_airports, read_carrier_groups, read_cbsa, read_demand, read_equipment, read_segments,
    FileTally, SegmentTally,
};
use airnet_core::{
    aggregate, AirportCoords, CarrierGroups, CbsaLookup, DemandRecord, EquipmentTable,
    MarketAggregation, SegmentRecord,
};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SEGMENTS_FILE: &str = "segments.csv";
pub const CBSA_FILE: &str = "cbsa.csv";
pub const AIRPORTS_FILE: &str = "airports.csv";
pub const EQUIPMENT_FILE: &str = "equipment.csv";
pub const DEMAND_FILE: &str = "demand.csv";
pub const CARRIER_GROUPS_FILE: &str = "carrier_groups.csv";

/// What was read and what was thrown away while loading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub segments: SegmentTally,
    pub cbsa: FileTally,
    pub airports: FileTally,
    pub equipment: Option<FileTally>,
    pub demand: Option<FileTally>,
    pub carrier_groups: Option<FileTally>,
    /// Segment rows dropped by aggregation for blank codes
    pub segments_without_codes: usize,
    pub markets: usize,
    pub carriers: usize,
}

#[derive(Debug, Clone)]
pub struct DataSnapshot {
    pub aggregation: MarketAggregation,
    pub cbsa: CbsaLookup,
    pub coords: AirportCoords,
    pub equipment: EquipmentTable,
    /// Present only when a demand file was supplied
    pub demand: Option<Vec<DemandRecord>>,
    /// Empty unless a carrier group file was supplied
    pub carrier_groups: CarrierGroups,
    pub report: LoadReport,
}

impl DataSnapshot {
    /// Assemble a snapshot from in-memory parts.
    pub fn from_parts(
        segments: &[SegmentRecord],
        cbsa: CbsaLookup,
        coords: AirportCoords,
        equipment: EquipmentTable,
        demand: Option<Vec<DemandRecord>>,
    ) -> Self {
        let aggregation = aggregate(segments);
        let report = LoadReport {
            segments: SegmentTally {
                file: FileTally {
                    rows: segments.len(),
                    dropped: 0,
                },
                ..SegmentTally::default()
            },
            segments_without_codes: aggregation.dropped,
            markets: aggregation.len(),
            carriers: aggregation.carriers().len(),
            ..LoadReport::default()
        };
        Self {
            aggregation,
            cbsa,
            coords,
            equipment,
            demand,
            carrier_groups: CarrierGroups::new(),
            report,
        }
    }

    pub fn with_carrier_groups(mut self, groups: CarrierGroups) -> Self {
        self.carrier_groups = groups;
        self
    }
}

fn open(path: &Path) -> DataResult<File> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn require(dir: &Path, name: &str) -> DataResult<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DataError::MissingFile(path))
    }
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> DataError + '_ {
    move |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Load every input file from `dir`.
///
/// `segments.csv`, `cbsa.csv` and `airports.csv` are required;
/// `equipment.csv`, `demand.csv` and `carrier_groups.csv` are optional.
pub fn load_snapshot(dir: impl AsRef<Path>) -> DataResult<DataSnapshot> {
    let dir = dir.as_ref();
    let segments_path = require(dir, SEGMENTS_FILE)?;
    let cbsa_path = require(dir, CBSA_FILE)?;
    let airports_path = require(dir, AIRPORTS_FILE)?;

    let (equipment, equipment_tally) = match optional(dir, EQUIPMENT_FILE) {
        Some(path) => {
            let (table, tally) =
                read_equipment(open(&path)?, EquipmentTable::default()).map_err(csv_err(&path))?;
            (table, Some(tally))
        }
        None => (EquipmentTable::default(), None),
    };

    let (cbsa, cbsa_tally) = read_cbsa(open(&cbsa_path)?).map_err(csv_err(&cbsa_path))?;
    let (coords, airports_tally) =
        read_airports(open(&airports_path)?).map_err(csv_err(&airports_path))?;
    let (segments, segment_tally) = read_segments(open(&segments_path)?, &equipment, &coords)
        .map_err(csv_err(&segments_path))?;

    let (demand, demand_tally) = match optional(dir, DEMAND_FILE) {
        Some(path) => {
            let (records, tally) = read_demand(open(&path)?).map_err(csv_err(&path))?;
            (Some(records), Some(tally))
        }
        None => (None, None),
    };

    let (carrier_groups, groups_tally) = match optional(dir, CARRIER_GROUPS_FILE) {
        Some(path) => {
            let (groups, tally) = read_carrier_groups(open(&path)?).map_err(csv_err(&path))?;
            (groups, Some(tally))
        }
        None => (CarrierGroups::new(), None),
    };

    let aggregation = aggregate(&segments);
    let report = LoadReport {
        segments: segment_tally,
        cbsa: cbsa_tally,
        airports: airports_tally,
        equipment: equipment_tally,
        demand: demand_tally,
        carrier_groups: groups_tally,
        segments_without_codes: aggregation.dropped,
        markets: aggregation.len(),
        carriers: aggregation.carriers().len(),
    };

    let total_dropped = report.segments.file.dropped
        + report.cbsa.dropped
        + report.airports.dropped
        + report.segments_without_codes;
    if total_dropped > 0 {
        warn!(
            segments = report.segments.file.dropped,
            cbsa = report.cbsa.dropped,
            airports = report.airports.dropped,
            without_codes = report.segments_without_codes,
            "Skipped malformed rows while loading {}",
            dir.display()
        );
    }
    info!(
        markets = report.markets,
        carriers = report.carriers,
        airports = coords.len(),
        demand_rows = demand.as_ref().map_or(0, Vec::len),
        grouped_carriers = carrier_groups.len(),
        "Loaded data snapshot"
    );

    Ok(DataSnapshot {
        aggregation,
        cbsa,
        coords,
        equipment,
        demand,
        carrier_groups,
        report,
    })
}
