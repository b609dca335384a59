//! Aircraft type recommendation for a single route.
//!
//! Each type the carrier already operates is scored on four fits and the
//! weighted blend decides the order:
//! - utilization: share of the carrier's ASM the type carried historically
//! - distance: closeness of the route to the type's typical stage length
//! - seats: closeness of capacity to the requested seat demand (optional)
//! - load factor: closeness of the type's typical load factor to the peer
//!   class benchmark

use crate::error::CoreError;
use crate::lookup::{EquipmentCategory, EquipmentTable};
use crate::market::MarketAggregation;
use crate::models::UNKNOWN_EQUIPMENT;
use crate::spatial::clip_unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ASM carried by one equipment type across a carrier's network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentUsage {
    pub equipment: String,
    pub asm: f64,
    /// Fraction of the carrier's valid ASM, 0 when the carrier has none
    pub share: f64,
}

/// Per-type ASM for a carrier, largest first.
///
/// Market seats are split evenly across the types seen on the market, so
/// ASM attribution follows the same split. Markets without valid ASM add
/// nothing. `UNKNOWN` ASM gets no row but still counts toward the total, so
/// shares are fractions of all the carrier's valid ASM.
pub fn equipment_usage(aggregation: &MarketAggregation, carrier: &str) -> Vec<EquipmentUsage> {
    let mut by_type: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total = 0.0;
    for market in aggregation.carrier_markets(carrier).filter(|m| m.valid_asm) {
        for share in &market.equipment {
            let asm = share.seat_share * market.distance_miles;
            total += asm;
            if share.equipment == UNKNOWN_EQUIPMENT {
                continue;
            }
            *by_type.entry(share.equipment.as_str()).or_default() += asm;
        }
    }

    let mut usage: Vec<EquipmentUsage> = by_type
        .into_iter()
        .map(|(equipment, asm)| EquipmentUsage {
            equipment: equipment.to_string(),
            asm,
            share: if total > 0.0 { asm / total } else { 0.0 },
        })
        .collect();
    usage.sort_by(|a, b| {
        b.asm
            .total_cmp(&a.asm)
            .then_with(|| a.equipment.cmp(&b.equipment))
    });
    usage
}

/// Business-model bucket used to pick a load factor benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerClass {
    Legacy,
    LowCost,
    UltraLowCost,
    Regional,
}

impl PeerClass {
    pub fn benchmark_load_factor(self) -> f64 {
        match self {
            PeerClass::Legacy => 0.84,
            PeerClass::LowCost => 0.86,
            PeerClass::UltraLowCost => 0.88,
            PeerClass::Regional => 0.80,
        }
    }

    /// Regional when regional types carry most of the ASM, otherwise legacy.
    /// Low-cost classes cannot be told apart from the fleet alone and must be
    /// set explicitly.
    pub fn infer(usage: &[EquipmentUsage], table: &EquipmentTable) -> Self {
        let regional: f64 = usage
            .iter()
            .filter(|u| table.category_of(&u.equipment) == Some(EquipmentCategory::Regional))
            .map(|u| u.share)
            .sum();
        if regional > 0.5 {
            PeerClass::Regional
        } else {
            PeerClass::Legacy
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "legacy" | "network" => Some(PeerClass::Legacy),
            "low_cost" | "lcc" => Some(PeerClass::LowCost),
            "ultra_low_cost" | "ulcc" => Some(PeerClass::UltraLowCost),
            "regional" => Some(PeerClass::Regional),
            _ => None,
        }
    }
}

/// Relative weights of the four fits. They need not sum to one; the blend
/// divides by the sum of the weights actually in play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerWeights {
    pub utilization: f64,
    pub distance: f64,
    pub seat: f64,
    pub load_factor: f64,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            utilization: 0.35,
            distance: 0.30,
            seat: 0.20,
            load_factor: 0.15,
        }
    }
}

impl RankerWeights {
    pub fn validate(&self) -> Result<(), CoreError> {
        let weights = [self.utilization, self.distance, self.seat, self.load_factor];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::InvalidInput(
                "ranker weights must be non-negative numbers".to_string(),
            ));
        }
        if self.utilization + self.distance + self.load_factor <= 0.0 {
            return Err(CoreError::InvalidInput(
                "at least one of the utilization, distance or load factor weights must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftRecommendation {
    pub equipment: String,
    pub category: EquipmentCategory,
    pub seats: u32,
    pub max_range_miles: f64,
    pub typical_stage_miles: f64,
    pub typical_load_factor: f64,
    pub utilization_score: f64,
    pub distance_fit: f64,
    /// Absent when no seat demand was given
    pub seat_fit: Option<f64>,
    pub load_factor_alignment: f64,
    pub composite_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub route_distance_miles: f64,
    pub seat_demand: Option<u32>,
    pub peer_class: PeerClass,
    pub benchmark_load_factor: f64,
    pub recommendations: Vec<AircraftRecommendation>,
    /// Types the carrier flies that the equipment table does not know
    pub unknown_equipment: Vec<String>,
    /// Known types whose range is shorter than the route
    pub out_of_range: Vec<String>,
}

/// `1 - |a - b| / max(a, b)`, clipped to [0, 1].
fn closeness(a: f64, b: f64) -> f64 {
    let scale = a.max(b);
    if scale <= 0.0 {
        return 0.0;
    }
    clip_unit(1.0 - (a - b).abs() / scale)
}

pub struct OptimalAircraftRanker<'a> {
    table: &'a EquipmentTable,
    weights: RankerWeights,
    peer_class: Option<PeerClass>,
}

impl<'a> OptimalAircraftRanker<'a> {
    pub fn new(table: &'a EquipmentTable) -> Self {
        Self {
            table,
            weights: RankerWeights::default(),
            peer_class: None,
        }
    }

    pub fn with_weights(mut self, weights: RankerWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Pin the peer class instead of inferring it from the fleet mix.
    pub fn with_peer_class(mut self, peer_class: PeerClass) -> Self {
        self.peer_class = Some(peer_class);
        self
    }

    /// Rank the carrier's types for a route of `route_distance_miles`.
    ///
    /// Ordered by composite score, then utilization, then equipment code.
    pub fn rank(
        &self,
        fleet_types: &[EquipmentUsage],
        route_distance_miles: f64,
        seat_demand: Option<u32>,
        top_n: usize,
    ) -> Result<RankingReport, CoreError> {
        if !route_distance_miles.is_finite() || route_distance_miles <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "route distance must be positive, got {route_distance_miles}"
            )));
        }
        self.weights.validate()?;

        let peer_class = self
            .peer_class
            .unwrap_or_else(|| PeerClass::infer(fleet_types, self.table));
        let benchmark = peer_class.benchmark_load_factor();
        let seat_demand = seat_demand.filter(|s| *s > 0);

        let w = self.weights;
        let weight_sum = w.utilization
            + w.distance
            + w.load_factor
            + if seat_demand.is_some() { w.seat } else { 0.0 };

        let mut recommendations = Vec::new();
        let mut unknown_equipment = Vec::new();
        let mut out_of_range = Vec::new();

        for usage in fleet_types {
            let Some(spec) = self.table.get(&usage.equipment) else {
                unknown_equipment.push(usage.equipment.clone());
                continue;
            };
            if spec.max_range_miles < route_distance_miles {
                out_of_range.push(spec.code.clone());
                continue;
            }

            let utilization_score = clip_unit(usage.share);
            let distance_fit = closeness(route_distance_miles, spec.typical_stage_miles);
            let seat_fit = seat_demand.map(|demand| closeness(spec.seats as f64, demand as f64));
            let load_factor_alignment = closeness(spec.typical_load_factor, benchmark);

            let blended = w.utilization * utilization_score
                + w.distance * distance_fit
                + w.load_factor * load_factor_alignment
                + seat_fit.map_or(0.0, |fit| w.seat * fit);

            recommendations.push(AircraftRecommendation {
                equipment: spec.code.clone(),
                category: spec.category,
                seats: spec.seats,
                max_range_miles: spec.max_range_miles,
                typical_stage_miles: spec.typical_stage_miles,
                typical_load_factor: spec.typical_load_factor,
                utilization_score,
                distance_fit,
                seat_fit,
                load_factor_alignment,
                composite_score: blended / weight_sum,
            });
        }

        recommendations.sort_by(|a, b| {
            b.composite_score
                .total_cmp(&a.composite_score)
                .then_with(|| b.utilization_score.total_cmp(&a.utilization_score))
                .then_with(|| a.equipment.cmp(&b.equipment))
        });
        recommendations.truncate(top_n);

        Ok(RankingReport {
            route_distance_miles,
            seat_demand,
            peer_class,
            benchmark_load_factor: benchmark,
            recommendations,
            unknown_equipment,
            out_of_range,
        })
    }
}
