//! CSV readers for each input file.
//!
//! Rows that fail to parse are counted and skipped. Only I/O failures and
//! unreadable files abort a load.

use airnet_core::models::normalize_code;
use airnet_core::{
    AirportCoords, CarrierGroups, CbsaLookup, DemandRecord, EquipmentSpec, EquipmentTable,
    SeatSource, SegmentRecord,
};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Rows read and rows skipped for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileTally {
    pub rows: usize,
    pub dropped: usize,
}

impl FileTally {
    fn accepted(&mut self) {
        self.rows += 1;
    }

    fn rejected(&mut self) {
        self.rows += 1;
        self.dropped += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentTally {
    #[serde(flatten)]
    pub file: FileTally,
    /// Seat counts filled from the equipment table
    pub seats_estimated: usize,
    /// Distances filled from airport coordinates
    pub distances_filled: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input)
}

/// Row-level parse errors are data problems; anything else is fatal.
fn row_or_skip<T>(row: Result<T, csv::Error>, tally: &mut FileTally) -> Result<Option<T>, csv::Error> {
    match row {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_io_error() => Err(err),
        Err(_) => {
            tally.rejected();
            Ok(None)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SegmentRow {
    carrier: String,
    source: String,
    destination: String,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    seats: Option<f64>,
    #[serde(default)]
    distance_miles: Option<f64>,
    #[serde(default)]
    seat_source: Option<String>,
}

/// Read `carrier,source,destination,equipment,seats,distance_miles,seat_source`.
///
/// Missing seats are estimated from the equipment table and tagged as such;
/// missing distances are computed from coordinates when both ends are known.
pub fn read_segments<R: Read>(
    input: R,
    equipment: &EquipmentTable,
    coords: &AirportCoords,
) -> Result<(Vec<SegmentRecord>, SegmentTally), csv::Error> {
    let mut tally = SegmentTally::default();
    let mut records = Vec::new();

    for row in reader(input).deserialize::<SegmentRow>() {
        let Some(row) = row_or_skip(row, &mut tally.file)? else {
            continue;
        };
        tally.file.accepted();

        let equipment_code = row.equipment.as_deref().and_then(normalize_code);
        let tagged = row.seat_source.as_deref().map(SeatSource::parse);
        let (seats, seat_source) = match row.seats.filter(|s| s.is_finite() && *s > 0.0) {
            Some(seats) => (Some(seats), tagged.unwrap_or(SeatSource::AirlineConfig)),
            None => match equipment_code.as_deref().and_then(|c| equipment.get(c)) {
                Some(spec) => {
                    tally.seats_estimated += 1;
                    (Some(spec.seats as f64), SeatSource::EquipmentEstimate)
                }
                None => (None, SeatSource::Unknown),
            },
        };

        let distance_miles = match row.distance_miles.filter(|d| d.is_finite() && *d > 0.0) {
            Some(d) => Some(d),
            None => {
                let filled = coords.distance_miles(&row.source, &row.destination);
                if filled.is_some() {
                    tally.distances_filled += 1;
                }
                filled
            }
        };

        records.push(SegmentRecord {
            source: row.source,
            destination: row.destination,
            carrier: row.carrier,
            equipment: equipment_code,
            seats,
            distance_miles,
            seat_source,
        });
    }
    Ok((records, tally))
}

#[derive(Debug, Deserialize)]
struct CbsaRow {
    airport: String,
    #[serde(default)]
    cbsa_id: Option<String>,
    #[serde(default)]
    cbsa_name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

fn is_domestic(country: Option<&str>) -> bool {
    match country.map(|c| c.trim().to_ascii_uppercase()) {
        None => true,
        Some(c) => c.is_empty() || c == "US" || c == "USA" || c == "UNITED STATES",
    }
}

/// Read `airport,cbsa_id,cbsa_name,country`.
///
/// A foreign country marks the airport non-US. A domestic airport without a
/// CBSA id is skipped and will resolve as unresolved.
pub fn read_cbsa<R: Read>(input: R) -> Result<(CbsaLookup, FileTally), csv::Error> {
    let mut tally = FileTally::default();
    let mut lookup = CbsaLookup::new();

    for row in reader(input).deserialize::<CbsaRow>() {
        let Some(row) = row_or_skip(row, &mut tally)? else {
            continue;
        };
        if normalize_code(&row.airport).is_none() {
            tally.rejected();
            continue;
        }
        if !is_domestic(row.country.as_deref()) {
            lookup.insert_non_us(&row.airport);
            tally.accepted();
            continue;
        }
        match row.cbsa_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let name = row.cbsa_name.as_deref().unwrap_or(id);
                lookup.insert_metro(&row.airport, id, name);
                tally.accepted();
            }
            None => tally.rejected(),
        }
    }
    Ok((lookup, tally))
}

#[derive(Debug, Deserialize)]
struct AirportRow {
    airport: String,
    latitude: f64,
    longitude: f64,
}

/// Read `airport,latitude,longitude`.
pub fn read_airports<R: Read>(input: R) -> Result<(AirportCoords, FileTally), csv::Error> {
    let mut tally = FileTally::default();
    let mut coords = AirportCoords::new();
    for row in reader(input).deserialize::<AirportRow>() {
        let Some(row) = row_or_skip(row, &mut tally)? else {
            continue;
        };
        if coords.insert(&row.airport, row.latitude, row.longitude) {
            tally.accepted();
        } else {
            tally.rejected();
        }
    }
    Ok((coords, tally))
}

/// Read `code,seats,max_range_miles,category,typical_stage_miles,typical_load_factor`
/// on top of `base`, replacing entries with the same code.
pub fn read_equipment<R: Read>(
    input: R,
    mut base: EquipmentTable,
) -> Result<(EquipmentTable, FileTally), csv::Error> {
    let mut tally = FileTally::default();
    for row in reader(input).deserialize::<EquipmentSpec>() {
        let Some(mut spec) = row_or_skip(row, &mut tally)? else {
            continue;
        };
        let Some(code) = normalize_code(&spec.code) else {
            tally.rejected();
            continue;
        };
        if spec.seats == 0 || spec.max_range_miles <= 0.0 {
            tally.rejected();
            continue;
        }
        spec.code = code;
        base.insert(spec);
        tally.accepted();
    }
    Ok((base, tally))
}

/// Read `year,quarter,origin,dest,passengers,avg_fare,distance`.
pub fn read_demand<R: Read>(input: R) -> Result<(Vec<DemandRecord>, FileTally), csv::Error> {
    let mut tally = FileTally::default();
    let mut records = Vec::new();
    for row in reader(input).deserialize::<DemandRecord>() {
        let Some(row) = row_or_skip(row, &mut tally)? else {
            continue;
        };
        tally.accepted();
        records.push(row);
    }
    Ok((records, tally))
}

#[derive(Debug, Deserialize)]
struct CarrierGroupRow {
    carrier: String,
    carrier_group: u32,
    #[serde(default)]
    group_name: Option<String>,
}

/// Read `carrier,carrier_group,group_name`; the name column is optional and
/// the first non-blank name seen for a code wins.
pub fn read_carrier_groups<R: Read>(input: R) -> Result<(CarrierGroups, FileTally), csv::Error> {
    let mut tally = FileTally::default();
    let mut groups = CarrierGroups::new();
    let mut named = std::collections::BTreeSet::new();
    for row in reader(input).deserialize::<CarrierGroupRow>() {
        let Some(row) = row_or_skip(row, &mut tally)? else {
            continue;
        };
        if !groups.assign(&row.carrier, row.carrier_group) {
            tally.rejected();
            continue;
        }
        if let Some(name) = row.group_name.as_deref().filter(|n| !n.trim().is_empty()) {
            if named.insert(row.carrier_group) {
                groups.set_name(row.carrier_group, name);
            }
        }
        tally.accepted();
    }
    Ok((groups, tally))
}
