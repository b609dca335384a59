//! Segment -> market aggregation.

use crate::models::{
    normalize_code, EquipmentShare, MarketAggregate, MarketKey, SeatSource, SegmentRecord,
    UNKNOWN_EQUIPMENT,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Result of folding a segment feed into per-carrier markets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketAggregation {
    markets: BTreeMap<MarketKey, MarketAggregate>,
    /// Records dropped for missing carrier, source or destination
    pub dropped: usize,
    /// Records seen, dropped ones included
    pub records_seen: usize,
}

#[derive(Default)]
struct Accumulator {
    segments: u32,
    seats: f64,
    distance_sum: f64,
    distance_count: u32,
    equipment: BTreeSet<String>,
    seat_source: Option<SeatSource>,
}

/// Group records by (carrier, source, destination).
///
/// Malformed records are counted in `dropped`, never fatal. Markets whose
/// seats or distance are not positive stay in the result with
/// `valid_asm == false`.
pub fn aggregate<'a, I>(records: I) -> MarketAggregation
where
    I: IntoIterator<Item = &'a SegmentRecord>,
{
    let mut groups: BTreeMap<MarketKey, Accumulator> = BTreeMap::new();
    let mut dropped = 0usize;
    let mut records_seen = 0usize;

    for record in records {
        records_seen += 1;
        let (Some(carrier), Some(source), Some(destination)) = (
            normalize_code(&record.carrier),
            normalize_code(&record.source),
            normalize_code(&record.destination),
        ) else {
            dropped += 1;
            continue;
        };

        let acc = groups
            .entry(MarketKey { carrier, source, destination })
            .or_default();
        acc.segments += 1;
        if let Some(seats) = record.seats.filter(|s| s.is_finite() && *s > 0.0) {
            acc.seats += seats;
        }
        if let Some(distance) = record.distance_miles.filter(|d| d.is_finite() && *d > 0.0) {
            acc.distance_sum += distance;
            acc.distance_count += 1;
        }
        let equipment = record
            .equipment
            .as_deref()
            .and_then(normalize_code)
            .unwrap_or_else(|| UNKNOWN_EQUIPMENT.to_string());
        acc.equipment.insert(equipment);
        acc.seat_source = Some(match acc.seat_source {
            Some(existing) => existing.min(record.seat_source),
            None => record.seat_source,
        });
    }

    if dropped > 0 {
        debug!(dropped, records_seen, "Dropped malformed segment records");
    }

    let markets = groups
        .into_iter()
        .map(|(key, acc)| {
            let market = finish_market(key.clone(), acc);
            (key, market)
        })
        .collect();

    MarketAggregation {
        markets,
        dropped,
        records_seen,
    }
}

fn finish_market(key: MarketKey, acc: Accumulator) -> MarketAggregate {
    let distance_miles = if acc.distance_count > 0 {
        acc.distance_sum / acc.distance_count as f64
    } else {
        0.0
    };
    let valid_asm = acc.seats > 0.0 && distance_miles > 0.0;
    let asm = if valid_asm { acc.seats * distance_miles } else { 0.0 };
    let seats_per_mile = valid_asm.then(|| acc.seats / distance_miles);

    let type_count = acc.equipment.len().max(1) as f64;
    let equipment = acc
        .equipment
        .into_iter()
        .map(|equipment| EquipmentShare {
            equipment,
            seat_share: acc.seats / type_count,
        })
        .collect();

    MarketAggregate {
        key,
        segments: acc.segments,
        total_seats: acc.seats,
        distance_miles,
        asm,
        valid_asm,
        seats_per_mile,
        equipment,
        seat_source: acc.seat_source.unwrap_or_default(),
    }
}

impl MarketAggregation {
    /// Build directly from pre-aggregated markets.
    pub fn from_markets(markets: impl IntoIterator<Item = MarketAggregate>) -> Self {
        let markets: BTreeMap<_, _> = markets
            .into_iter()
            .map(|market| (market.key.clone(), market))
            .collect();
        Self {
            records_seen: markets.len(),
            markets,
            dropped: 0,
        }
    }

    pub fn get(&self, key: &MarketKey) -> Option<&MarketAggregate> {
        self.markets.get(key)
    }

    pub fn markets(&self) -> impl Iterator<Item = &MarketAggregate> {
        self.markets.values()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Distinct carriers present, in code order.
    pub fn carriers(&self) -> Vec<String> {
        let carriers: BTreeSet<&str> = self.markets.keys().map(|k| k.carrier.as_str()).collect();
        carriers.into_iter().map(str::to_string).collect()
    }

    /// True when the carrier operates at least one market.
    pub fn has_carrier(&self, carrier: &str) -> bool {
        self.carrier_markets(carrier).next().is_some()
    }

    /// Every market of one carrier, valid or not, in route order.
    pub fn carrier_markets<'a>(
        &'a self,
        carrier: &str,
    ) -> impl Iterator<Item = &'a MarketAggregate> + 'a {
        let carrier = normalize_code(carrier).unwrap_or_default();
        self.markets
            .values()
            .filter(move |market| market.key.carrier == carrier)
    }

    /// Fold the markets of several carriers into one network under `label`.
    ///
    /// Seats and segments add up, distance is the mean of the members'
    /// positive distances and equipment is the union of their types.
    pub fn pooled(&self, carriers: &BTreeSet<String>, label: &str) -> MarketAggregation {
        let label = normalize_code(label).unwrap_or_default();
        let mut groups: BTreeMap<MarketKey, Accumulator> = BTreeMap::new();
        for market in self
            .markets
            .values()
            .filter(|m| carriers.contains(&m.key.carrier))
        {
            let acc = groups
                .entry(MarketKey::new(
                    label.as_str(),
                    market.key.source.as_str(),
                    market.key.destination.as_str(),
                ))
                .or_default();
            acc.segments += market.segments;
            acc.seats += market.total_seats;
            if market.distance_miles > 0.0 {
                acc.distance_sum += market.distance_miles;
                acc.distance_count += 1;
            }
            acc.equipment
                .extend(market.equipment.iter().map(|share| share.equipment.clone()));
            acc.seat_source = Some(match acc.seat_source {
                Some(existing) => existing.min(market.seat_source),
                None => market.seat_source,
            });
        }

        let markets: BTreeMap<MarketKey, MarketAggregate> = groups
            .into_iter()
            .map(|(key, acc)| (key.clone(), finish_market(key, acc)))
            .collect();
        MarketAggregation {
            records_seen: markets.len(),
            markets,
            dropped: 0,
        }
    }

    /// Directional (source, destination) pairs the carrier already flies.
    pub fn carrier_route_set(&self, carrier: &str) -> BTreeSet<(String, String)> {
        self.carrier_markets(carrier)
            .map(|m| (m.key.source.clone(), m.key.destination.clone()))
            .collect()
    }
}
