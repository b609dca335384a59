//! Route scoring: competition banding, percentile maturity, yield proxy and
//! the composite route strategy baseline.
//!
//! Percentiles are computed per carrier over its valid-ASM routes only.
//! Routes without a valid ASM are reported as [`ScoreOutcome::Unscorable`]
//! instead of receiving a zero score.

use crate::market::MarketAggregation;
use crate::models::{MarketAggregate, MarketKey, MarketPair};
use crate::spatial::clip_unit;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const MONOPOLY_SCORE: f64 = 1.0;
pub const DUOPOLY_SCORE: f64 = 0.6;
pub const COMPETITIVE_SCORE: f64 = 0.2;

const ESTABLISHED_MIN: f64 = 0.75;
const MATURING_MIN: f64 = 0.40;

const ASM_SHARE_WEIGHT: f64 = 0.5;
const DENSITY_UPLIFT_WEIGHT: f64 = 0.3;
const DISTANCE_ALIGNMENT_WEIGHT: f64 = 0.2;

/// Competition band on an unordered airport pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionLevel {
    Monopoly,
    Duopoly,
    Competitive,
}

impl CompetitionLevel {
    /// Band for a carrier count. A pair nobody flies has no band.
    pub fn from_carrier_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(CompetitionLevel::Monopoly),
            2 => Some(CompetitionLevel::Duopoly),
            _ => Some(CompetitionLevel::Competitive),
        }
    }

    pub fn score(self) -> f64 {
        match self {
            CompetitionLevel::Monopoly => MONOPOLY_SCORE,
            CompetitionLevel::Duopoly => DUOPOLY_SCORE,
            CompetitionLevel::Competitive => COMPETITIVE_SCORE,
        }
    }
}

/// Carriers operating an unordered pair across the whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionProfile {
    pub pair: MarketPair,
    pub carriers: Vec<String>,
    pub carrier_count: usize,
    pub level: CompetitionLevel,
    pub score: f64,
}

/// Competition profiles for every pair in an aggregation.
#[derive(Debug, Clone, Default)]
pub struct CompetitionIndex {
    profiles: BTreeMap<MarketPair, CompetitionProfile>,
}

impl CompetitionIndex {
    pub fn build(aggregation: &MarketAggregation) -> Self {
        let mut carriers: BTreeMap<MarketPair, BTreeSet<String>> = BTreeMap::new();
        for market in aggregation.markets() {
            carriers
                .entry(market.key.pair())
                .or_default()
                .insert(market.key.carrier.clone());
        }

        let profiles = carriers
            .into_iter()
            .filter_map(|(pair, set)| {
                let level = CompetitionLevel::from_carrier_count(set.len())?;
                Some((
                    pair.clone(),
                    CompetitionProfile {
                        pair,
                        carrier_count: set.len(),
                        carriers: set.into_iter().collect(),
                        level,
                        score: level.score(),
                    },
                ))
            })
            .collect();
        Self { profiles }
    }

    pub fn get(&self, source: &str, destination: &str) -> Option<&CompetitionProfile> {
        self.profiles.get(&MarketPair::new(source, destination))
    }

    /// Every profile in pair order.
    pub fn profiles(&self) -> impl Iterator<Item = &CompetitionProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Maturity band derived from the ASM percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityBand {
    Established,
    Maturing,
    Emerging,
}

impl MaturityBand {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= ESTABLISHED_MIN {
            MaturityBand::Established
        } else if percentile >= MATURING_MIN {
            MaturityBand::Maturing
        } else {
            MaturityBand::Emerging
        }
    }
}

/// Scores for one carrier route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteScore {
    pub key: MarketKey,
    pub competition: CompetitionLevel,
    pub competition_score: f64,
    pub maturity_percentile: f64,
    pub maturity: MaturityBand,
    /// 1 - seat-density percentile; higher means a more premium configuration
    pub yield_proxy: f64,
    pub strategy_baseline: f64,
    pub asm: f64,
    pub asm_share: f64,
    pub seats_per_mile: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscorableReason {
    /// The carrier has no valid-ASM route to rank against
    NoValidAsmBaseline,
    /// This route lacks seats or distance
    InvalidRouteAsm,
}

/// Either a computed score or an explicit "insufficient data" marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored(RouteScore),
    Unscorable {
        key: MarketKey,
        competition: Option<CompetitionLevel>,
        reason: UnscorableReason,
    },
}

impl ScoreOutcome {
    pub fn score(&self) -> Option<&RouteScore> {
        match self {
            ScoreOutcome::Scored(score) => Some(score),
            ScoreOutcome::Unscorable { .. } => None,
        }
    }

    pub fn key(&self) -> &MarketKey {
        match self {
            ScoreOutcome::Scored(score) => &score.key,
            ScoreOutcome::Unscorable { key, .. } => key,
        }
    }
}

/// Per-carrier reference values the composite baseline is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarrierBaseline {
    pub valid_routes: usize,
    pub total_asm: f64,
    pub median_seats_per_mile: f64,
    pub median_distance_miles: f64,
}

/// Scores carrier routes against a shared competition index.
pub struct ScoreEngine<'a> {
    aggregation: &'a MarketAggregation,
    competition: &'a CompetitionIndex,
}

impl<'a> ScoreEngine<'a> {
    pub fn new(aggregation: &'a MarketAggregation, competition: &'a CompetitionIndex) -> Self {
        Self {
            aggregation,
            competition,
        }
    }

    /// Baseline figures for a carrier, `None` when it has no valid-ASM route.
    pub fn baseline(&self, carrier: &str) -> Option<CarrierBaseline> {
        let valid: Vec<&MarketAggregate> = self
            .aggregation
            .carrier_markets(carrier)
            .filter(|m| m.valid_asm)
            .collect();
        if valid.is_empty() {
            return None;
        }
        let densities: Vec<f64> = valid.iter().filter_map(|m| m.seats_per_mile).collect();
        let distances: Vec<f64> = valid.iter().map(|m| m.distance_miles).collect();
        Some(CarrierBaseline {
            valid_routes: valid.len(),
            total_asm: valid.iter().map(|m| m.asm).sum(),
            median_seats_per_mile: median(&densities),
            median_distance_miles: median(&distances),
        })
    }

    /// Score every route of one carrier.
    pub fn score_routes(&self, carrier: &str) -> BTreeMap<MarketKey, ScoreOutcome> {
        let markets: Vec<&MarketAggregate> = self.aggregation.carrier_markets(carrier).collect();
        let mut outcomes = BTreeMap::new();

        let Some(baseline) = self.baseline(carrier) else {
            for market in markets {
                outcomes.insert(
                    market.key.clone(),
                    self.unscorable(market, UnscorableReason::NoValidAsmBaseline),
                );
            }
            debug!(carrier, "Carrier has no valid-ASM routes; nothing to score");
            return outcomes;
        };

        let valid: Vec<&MarketAggregate> =
            markets.iter().copied().filter(|m| m.valid_asm).collect();
        let asm_values: Vec<f64> = valid.iter().map(|m| m.asm).collect();
        let density_values: Vec<f64> = valid
            .iter()
            .map(|m| m.seats_per_mile.unwrap_or(0.0))
            .collect();
        let maturity = average_rank_percentiles(&asm_values);
        let density = average_rank_percentiles(&density_values);

        for (idx, market) in valid.iter().enumerate() {
            // The carrier itself flies the pair, so an index built from another
            // aggregation can at worst undercount to a monopoly.
            let competition = self
                .competition
                .get(&market.key.source, &market.key.destination)
                .map(|p| p.level)
                .unwrap_or(CompetitionLevel::Monopoly);
            let seats_per_mile = density_values[idx];
            let asm_share = clip_unit(market.asm / baseline.total_asm);
            let strategy_baseline =
                strategy_baseline(market.asm, seats_per_mile, market.distance_miles, &baseline);
            outcomes.insert(
                market.key.clone(),
                ScoreOutcome::Scored(RouteScore {
                    key: market.key.clone(),
                    competition,
                    competition_score: competition.score(),
                    maturity_percentile: maturity[idx],
                    maturity: MaturityBand::from_percentile(maturity[idx]),
                    yield_proxy: 1.0 - density[idx],
                    strategy_baseline,
                    asm: market.asm,
                    asm_share,
                    seats_per_mile,
                }),
            );
        }

        let invalid = markets.iter().filter(|m| !m.valid_asm);
        for market in invalid {
            debug!(route = %market.key, "Route has no valid ASM; marking unscorable");
            outcomes.insert(
                market.key.clone(),
                self.unscorable(market, UnscorableReason::InvalidRouteAsm),
            );
        }
        outcomes
    }

    fn unscorable(&self, market: &MarketAggregate, reason: UnscorableReason) -> ScoreOutcome {
        ScoreOutcome::Unscorable {
            key: market.key.clone(),
            competition: self
                .competition
                .get(&market.key.source, &market.key.destination)
                .map(|p| p.level),
            reason,
        }
    }
}

/// Weighted composite, each term clipped before and the sum clipped after.
fn strategy_baseline(
    asm: f64,
    seats_per_mile: f64,
    distance_miles: f64,
    baseline: &CarrierBaseline,
) -> f64 {
    let asm_term = if baseline.total_asm > 0.0 {
        clip_unit(asm / baseline.total_asm)
    } else {
        0.0
    };
    let uplift_term = if baseline.median_seats_per_mile > 0.0 {
        clip_unit(
            (seats_per_mile - baseline.median_seats_per_mile) / baseline.median_seats_per_mile,
        )
    } else {
        0.0
    };
    let alignment_term = if baseline.median_distance_miles > 0.0 {
        clip_unit(
            1.0 - (distance_miles - baseline.median_distance_miles).abs()
                / baseline.median_distance_miles,
        )
    } else {
        0.0
    };
    clip_unit(
        ASM_SHARE_WEIGHT * asm_term
            + DENSITY_UPLIFT_WEIGHT * uplift_term
            + DISTANCE_ALIGNMENT_WEIGHT * alignment_term,
    )
}

/// Percentile of each value within the slice using average-rank ties.
///
/// Values are ranked ascending; the percentile is the (possibly averaged)
/// rank index divided by `len - 1`. A single value sits at 1.0.
pub fn average_rank_percentiles(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut percentiles = vec![0.0; n];
    let denom = (n - 1) as f64;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let avg_rank = (start + end) as f64 / 2.0;
        for &idx in &order[start..=end] {
            percentiles[idx] = avg_rank / denom;
        }
        start = end + 1;
    }
    percentiles
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::aggregate;
    use crate::models::SegmentRecord;

    fn seg(carrier: &str, src: &str, dst: &str, seats: f64, dist: f64) -> SegmentRecord {
        SegmentRecord::new(carrier, src, dst, "A320", seats, dist)
    }

    #[test]
    fn competition_banding_is_fixed() {
        assert_eq!(CompetitionLevel::from_carrier_count(0), None);
        assert_eq!(CompetitionLevel::from_carrier_count(1).unwrap().score(), 1.0);
        assert_eq!(CompetitionLevel::from_carrier_count(2).unwrap().score(), 0.6);
        for count in 3..8 {
            let level = CompetitionLevel::from_carrier_count(count).unwrap();
            assert_eq!(level, CompetitionLevel::Competitive);
            assert_eq!(level.score(), 0.2);
        }
    }

    #[test]
    fn competition_counts_both_directions_across_carriers() {
        let records = vec![
            seg("AA", "JFK", "LAX", 150.0, 2475.0),
            seg("DL", "LAX", "JFK", 150.0, 2475.0),
            seg("UA", "EWR", "SFO", 150.0, 2565.0),
        ];
        let agg = aggregate(&records);
        let index = CompetitionIndex::build(&agg);
        let profile = index.get("LAX", "JFK").unwrap();
        assert_eq!(profile.carriers, vec!["AA".to_string(), "DL".to_string()]);
        assert_eq!(profile.level, CompetitionLevel::Duopoly);
        assert_eq!(index.get("EWR", "SFO").unwrap().level, CompetitionLevel::Monopoly);
    }

    #[test]
    fn percentiles_average_ties() {
        let pct = average_rank_percentiles(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(pct[0], 0.0);
        assert!((pct[1] - 0.5).abs() < 1e-12);
        assert!((pct[2] - 0.5).abs() < 1e-12);
        assert_eq!(pct[3], 1.0);
    }

    #[test]
    fn single_route_is_established_and_non_premium() {
        let records = vec![seg("B6", "JFK", "BOS", 150.0, 187.0)];
        let agg = aggregate(&records);
        let index = CompetitionIndex::build(&agg);
        let engine = ScoreEngine::new(&agg, &index);
        let scores = engine.score_routes("B6");
        let score = scores.values().next().unwrap().score().unwrap();
        assert_eq!(score.maturity_percentile, 1.0);
        assert_eq!(score.maturity, MaturityBand::Established);
        assert_eq!(score.yield_proxy, 0.0);
    }

    #[test]
    fn yield_proxy_follows_density_not_asm() {
        // Highest ASM route is also the least dense, so the two orderings diverge.
        let records = vec![
            seg("AA", "JFK", "LAX", 200.0, 2475.0),
            seg("AA", "JFK", "BOS", 180.0, 187.0),
            seg("AA", "JFK", "ORD", 100.0, 740.0),
        ];
        let agg = aggregate(&records);
        let index = CompetitionIndex::build(&agg);
        let scores = ScoreEngine::new(&agg, &index).score_routes("AA");
        let lax = scores[&MarketKey::new("AA", "JFK", "LAX")].score().unwrap();
        let bos = scores[&MarketKey::new("AA", "JFK", "BOS")].score().unwrap();
        assert_eq!(lax.maturity_percentile, 1.0);
        assert_eq!(lax.yield_proxy, 1.0);
        assert_eq!(bos.maturity_percentile, 0.0);
        assert_eq!(bos.yield_proxy, 0.0);
        for outcome in scores.values() {
            let s = outcome.score().unwrap();
            assert!((0.0..=1.0).contains(&s.strategy_baseline));
        }
    }

    #[test]
    fn invalid_routes_are_unscorable_not_zero() {
        let records = vec![
            seg("AA", "JFK", "LAX", 150.0, 2475.0),
            seg("AA", "JFK", "LGA", 150.0, 0.0),
            seg("ZZ", "SEA", "PDX", 0.0, 129.0),
        ];
        let agg = aggregate(&records);
        let index = CompetitionIndex::build(&agg);
        let engine = ScoreEngine::new(&agg, &index);

        let aa = engine.score_routes("AA");
        assert!(matches!(
            aa[&MarketKey::new("AA", "JFK", "LGA")],
            ScoreOutcome::Unscorable { reason: UnscorableReason::InvalidRouteAsm, .. }
        ));

        let zz = engine.score_routes("ZZ");
        assert!(matches!(
            zz[&MarketKey::new("ZZ", "SEA", "PDX")],
            ScoreOutcome::Unscorable { reason: UnscorableReason::NoValidAsmBaseline, .. }
        ));
        assert!(engine.baseline("ZZ").is_none());
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }
}
