//! Flat-rate route economics.

use crate::market::MarketAggregation;
use crate::models::MarketAggregate;
use serde::{Deserialize, Serialize};

/// Unit economics applied uniformly to every route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsAssumptions {
    /// Cost per available seat mile, USD
    pub casm: f64,
    pub load_factor: f64,
    /// Revenue per revenue passenger mile, USD
    pub yield_per_rpm: f64,
}

impl Default for EconomicsAssumptions {
    fn default() -> Self {
        Self {
            casm: 0.11,
            load_factor: 0.82,
            yield_per_rpm: 0.14,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEconomics {
    pub source: String,
    pub destination: String,
    pub asm: f64,
    pub rpm: f64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin: f64,
}

fn estimate(market: &MarketAggregate, assumptions: &EconomicsAssumptions) -> RouteEconomics {
    let rpm = market.asm * assumptions.load_factor;
    let revenue = rpm * assumptions.yield_per_rpm;
    let cost = market.asm * assumptions.casm;
    let profit = revenue - cost;
    RouteEconomics {
        source: market.key.source.clone(),
        destination: market.key.destination.clone(),
        asm: market.asm,
        rpm,
        revenue,
        cost,
        profit,
        margin: if revenue > 0.0 { profit / revenue } else { 0.0 },
    }
}

/// Economics for each of the carrier's valid-ASM routes, most profitable
/// first.
pub fn route_economics(
    aggregation: &MarketAggregation,
    carrier: &str,
    assumptions: &EconomicsAssumptions,
) -> Vec<RouteEconomics> {
    let mut rows: Vec<RouteEconomics> = aggregation
        .carrier_markets(carrier)
        .filter(|m| m.valid_asm)
        .map(|m| estimate(m, assumptions))
        .collect();
    rows.sort_by(|a, b| {
        b.profit
            .total_cmp(&a.profit)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.destination.cmp(&b.destination))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::aggregate;
    use crate::models::SegmentRecord;

    #[test]
    fn default_assumptions_price_a_route() {
        let records = vec![
            SegmentRecord::new("DL", "ATL", "MCO", "B739", 1000.0, 400.0),
            SegmentRecord::new("DL", "ATL", "XXX", "B739", 0.0, 400.0),
        ];
        let agg = aggregate(&records);
        let rows = route_economics(&agg, "DL", &EconomicsAssumptions::default());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!((row.asm - 400_000.0).abs() < 1e-6);
        assert!((row.revenue - 400_000.0 * 0.82 * 0.14).abs() < 1e-6);
        assert!((row.cost - 44_000.0).abs() < 1e-6);
        assert!((row.profit - (45_920.0 - 44_000.0)).abs() < 1e-6);
    }

    #[test]
    fn losing_routes_sort_last() {
        let records = vec![
            SegmentRecord::new("DL", "ATL", "MCO", "B739", 1000.0, 400.0),
            SegmentRecord::new("DL", "ATL", "LAX", "B739", 1000.0, 1900.0),
        ];
        let agg = aggregate(&records);
        let thin = EconomicsAssumptions {
            load_factor: 0.5,
            ..EconomicsAssumptions::default()
        };
        let rows = route_economics(&agg, "DL", &thin);
        assert!(rows.iter().all(|r| r.profit < 0.0));
        assert_eq!(rows[0].destination, "MCO");
    }
}
