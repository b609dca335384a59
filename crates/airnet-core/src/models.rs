//! Core data models for the planning engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a segment's seat count came from.
///
/// Variants are ordered from least to most reliable so that a market mixing
/// several sources can report the weakest one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SeatSource {
    #[default]
    Unknown,
    EquipmentEstimate,
    AirlineConfig,
}

impl SeatSource {
    /// Parse a loosely formatted seat-source tag. Anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "airline_config" => SeatSource::AirlineConfig,
            "equipment_estimate" => SeatSource::EquipmentEstimate,
            _ => SeatSource::Unknown,
        }
    }
}

/// One published flight segment as delivered by ingestion.
///
/// Airport and carrier codes may arrive blank; such records are dropped
/// during aggregation. Missing seats or distance keep the record but make
/// its market ineligible for ASM-based scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub source: String,
    pub destination: String,
    pub carrier: String,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub seats: Option<f64>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub seat_source: SeatSource,
}

impl SegmentRecord {
    pub fn new(
        carrier: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        equipment: impl Into<String>,
        seats: f64,
        distance_miles: f64,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            carrier: carrier.into(),
            equipment: Some(equipment.into()),
            seats: Some(seats),
            distance_miles: Some(distance_miles),
            seat_source: SeatSource::AirlineConfig,
        }
    }

    pub fn with_seat_source(mut self, seat_source: SeatSource) -> Self {
        self.seat_source = seat_source;
        self
    }
}

/// Normalise an airport, carrier or equipment code. Blank input yields `None`.
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Directional market owned by a single carrier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    pub carrier: String,
    pub source: String,
    pub destination: String,
}

impl MarketKey {
    pub fn new(
        carrier: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            carrier: carrier.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// The unordered airport pair this market belongs to.
    pub fn pair(&self) -> MarketPair {
        MarketPair::new(&self.source, &self.destination)
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.carrier, self.source, self.destination)
    }
}

/// Unordered airport pair, stored with the alphabetically lower code first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketPair {
    pub a: String,
    pub b: String,
}

impl MarketPair {
    pub fn new(x: &str, y: &str) -> Self {
        if x <= y {
            Self { a: x.to_string(), b: y.to_string() }
        } else {
            Self { a: y.to_string(), b: x.to_string() }
        }
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// Seats attributed to one equipment type on a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentShare {
    pub equipment: String,
    pub seat_share: f64,
}

/// Per-carrier, per-direction market statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAggregate {
    pub key: MarketKey,
    /// Number of segment records folded into this market
    pub segments: u32,
    /// True seat total across every equipment split
    pub total_seats: f64,
    /// Mean of the positive reported distances, 0 when none were reported
    pub distance_miles: f64,
    /// Seats x distance; 0 unless `valid_asm`
    pub asm: f64,
    /// Both seats and distance were positive
    pub valid_asm: bool,
    /// Seat density, present only for valid-ASM markets
    pub seats_per_mile: Option<f64>,
    /// Distinct equipment codes with an even split of the seat total
    pub equipment: Vec<EquipmentShare>,
    /// Weakest seat source seen across the folded records
    pub seat_source: SeatSource,
}

impl MarketAggregate {
    /// Seats needed per departure, rounded up from the per-segment average.
    pub fn seats_per_departure(&self) -> u32 {
        if self.segments == 0 || self.total_seats <= 0.0 {
            return 0;
        }
        (self.total_seats / self.segments as f64).ceil() as u32
    }

    /// The equipment code a scheduler should request first, if any known.
    pub fn primary_equipment(&self) -> Option<&str> {
        self.equipment
            .iter()
            .map(|share| share.equipment.as_str())
            .find(|code| *code != UNKNOWN_EQUIPMENT)
    }
}

/// Placeholder code for segments that did not report equipment.
pub const UNKNOWN_EQUIPMENT: &str = "UNKNOWN";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_source_parsing_is_lenient() {
        assert_eq!(SeatSource::parse("Airline Config"), SeatSource::AirlineConfig);
        assert_eq!(SeatSource::parse("equipment-estimate"), SeatSource::EquipmentEstimate);
        assert_eq!(SeatSource::parse("t100"), SeatSource::Unknown);
        assert!(SeatSource::Unknown < SeatSource::AirlineConfig);
    }

    #[test]
    fn market_pair_is_unordered() {
        assert_eq!(MarketPair::new("LAX", "JFK"), MarketPair::new("JFK", "LAX"));
        assert_eq!(MarketPair::new("LAX", "JFK").a, "JFK");
    }

    #[test]
    fn normalize_code_trims_and_uppercases() {
        assert_eq!(normalize_code(" jfk "), Some("JFK".to_string()));
        assert_eq!(normalize_code("   "), None);
    }
}
