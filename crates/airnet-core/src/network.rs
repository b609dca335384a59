//! Carrier network overview and carrier directory.

use crate::lookup::{CbsaLookup, CbsaResolution};
use crate::market::MarketAggregation;
use crate::models::{normalize_code, MarketAggregate, UNKNOWN_EQUIPMENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    pub source: String,
    pub destination: String,
    pub asm: f64,
    pub seats: f64,
    pub distance_miles: f64,
    pub equipment: Option<String>,
}

impl RouteRow {
    fn from_market(market: &MarketAggregate) -> Self {
        Self {
            source: market.key.source.clone(),
            destination: market.key.destination.clone(),
            asm: market.asm,
            seats: market.total_seats,
            distance_miles: market.distance_miles,
            equipment: market.primary_equipment().map(str::to_string),
        }
    }
}

/// Equipment types listed in a network summary.
pub const TOP_EQUIPMENT: usize = 5;

/// Routes whose primary equipment is this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCount {
    pub equipment: String,
    pub routes: usize,
}

/// Directed edges touching an airport, in or out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDegree {
    pub airport: String,
    pub degree: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub carrier: String,
    pub total_routes: usize,
    pub valid_routes: usize,
    /// Routes kept in the network but without positive seats and distance
    pub invalid_asm_routes: usize,
    pub total_seats: f64,
    pub total_asm: f64,
    pub mean_distance_miles: f64,
    pub max_distance_miles: f64,
    pub airports_served: usize,
    pub directed_edges: usize,
    pub top_hubs: Vec<HubDegree>,
    /// Most common primary equipment by route count, `UNKNOWN` included
    pub top_equipment: Vec<EquipmentCount>,
    pub top_domestic_routes: Vec<RouteRow>,
    pub top_international_routes: Vec<RouteRow>,
    /// Routes with an endpoint missing from the CBSA lookup; in neither list
    pub unresolved_routes: usize,
}

/// Summarize one carrier's network, `None` when the carrier flies nothing.
///
/// A route is international when either end resolves to non-US, domestic
/// when both ends resolve to a metro area.
pub fn network_summary(
    aggregation: &MarketAggregation,
    cbsa: &CbsaLookup,
    carrier: &str,
    top_n: usize,
) -> Option<NetworkSummary> {
    let carrier = normalize_code(carrier)?;
    let markets: Vec<&MarketAggregate> = aggregation.carrier_markets(&carrier).collect();
    if markets.is_empty() {
        return None;
    }

    let valid: Vec<&MarketAggregate> = markets.iter().copied().filter(|m| m.valid_asm).collect();
    let total_seats = markets.iter().map(|m| m.total_seats).sum();
    let total_asm = valid.iter().map(|m| m.asm).sum();
    let mean_distance_miles = if valid.is_empty() {
        0.0
    } else {
        valid.iter().map(|m| m.distance_miles).sum::<f64>() / valid.len() as f64
    };
    let max_distance_miles = valid.iter().map(|m| m.distance_miles).fold(0.0, f64::max);

    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    for market in &markets {
        *degree.entry(market.key.source.as_str()).or_default() += 1;
        *degree.entry(market.key.destination.as_str()).or_default() += 1;
    }
    let airports_served = degree.len();
    let mut top_hubs: Vec<HubDegree> = degree
        .into_iter()
        .map(|(airport, degree)| HubDegree {
            airport: airport.to_string(),
            degree,
        })
        .collect();
    // BTreeMap order already breaks ties by code; the sort is stable.
    top_hubs.sort_by(|a, b| b.degree.cmp(&a.degree));
    top_hubs.truncate(top_n);

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for market in &markets {
        let code = market.primary_equipment().unwrap_or(UNKNOWN_EQUIPMENT);
        *by_type.entry(code).or_default() += 1;
    }
    let mut top_equipment: Vec<EquipmentCount> = by_type
        .into_iter()
        .map(|(equipment, routes)| EquipmentCount {
            equipment: equipment.to_string(),
            routes,
        })
        .collect();
    top_equipment.sort_by(|a, b| b.routes.cmp(&a.routes));
    top_equipment.truncate(TOP_EQUIPMENT);

    let mut by_asm = valid.clone();
    by_asm.sort_by(|a, b| b.asm.total_cmp(&a.asm).then_with(|| a.key.cmp(&b.key)));

    let mut domestic = Vec::new();
    let mut international = Vec::new();
    let mut unresolved_routes = 0;
    for market in by_asm {
        let ends = [
            cbsa.resolve(&market.key.source),
            cbsa.resolve(&market.key.destination),
        ];
        if ends.iter().any(|r| matches!(r, CbsaResolution::NonUs)) {
            international.push(RouteRow::from_market(market));
        } else if ends.iter().all(CbsaResolution::is_metro) {
            domestic.push(RouteRow::from_market(market));
        } else {
            unresolved_routes += 1;
        }
    }
    domestic.truncate(top_n);
    international.truncate(top_n);

    Some(NetworkSummary {
        carrier,
        total_routes: markets.len(),
        valid_routes: valid.len(),
        invalid_asm_routes: markets.len() - valid.len(),
        total_seats,
        total_asm,
        mean_distance_miles,
        max_distance_miles,
        airports_served,
        directed_edges: markets.len(),
        top_hubs,
        top_equipment,
        top_domestic_routes: domestic,
        top_international_routes: international,
        unresolved_routes,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierEntry {
    pub carrier: String,
    pub routes: usize,
    pub total_seats: f64,
}

/// Carriers whose code contains `query` (case-insensitive), in code order.
pub fn carrier_directory(
    aggregation: &MarketAggregation,
    query: Option<&str>,
    limit: usize,
) -> Vec<CarrierEntry> {
    let needle = query.and_then(normalize_code);
    let mut entries: BTreeMap<&str, CarrierEntry> = BTreeMap::new();
    for market in aggregation.markets() {
        let code = market.key.carrier.as_str();
        if needle.as_deref().is_some_and(|n| !code.contains(n)) {
            continue;
        }
        let entry = entries.entry(code).or_insert_with(|| CarrierEntry {
            carrier: code.to_string(),
            routes: 0,
            total_seats: 0.0,
        });
        entry.routes += 1;
        entry.total_seats += market.total_seats;
    }
    entries.into_values().take(limit).collect()
}
