//! Origin-and-destination passenger demand analysis.
//!
//! Works on quarterly survey rows (passengers, average fare, distance per
//! airport pair). Markets are unordered pairs unless built directionally.
//! Fare and distance roll up passenger-weighted.

use crate::error::CoreError;
use crate::models::normalize_code;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub year: i32,
    pub quarter: u32,
    pub origin: String,
    pub dest: String,
    pub passengers: f64,
    pub avg_fare: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuarter {
    pub year: i32,
    pub quarter: u32,
    pub market_a: String,
    pub market_b: String,
    pub passengers: f64,
    /// Passenger-weighted; `None` when the quarter carried no passengers
    pub avg_fare: Option<f64>,
    pub distance: Option<f64>,
    pub fare_per_mile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTotal {
    pub market_a: String,
    pub market_b: String,
    pub market: String,
    pub passengers_total: f64,
    pub avg_fare: Option<f64>,
    pub distance: Option<f64>,
    pub fare_per_mile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMarket {
    pub rank: usize,
    #[serde(flatten)]
    pub market: MarketTotal,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Default)]
struct Rollup {
    passengers: f64,
    revenue: f64,
    distance_x_pax: f64,
}

impl Rollup {
    fn add(&mut self, passengers: f64, avg_fare: f64, distance: f64) {
        self.passengers += passengers;
        self.revenue += passengers * avg_fare;
        self.distance_x_pax += passengers * distance;
    }

    /// (avg_fare, distance, fare_per_mile)
    fn weighted(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        if self.passengers <= 0.0 {
            return (None, None, None);
        }
        let fare = self.revenue / self.passengers;
        let distance = self.distance_x_pax / self.passengers;
        let per_mile = (distance > 0.0).then(|| fare / distance);
        (Some(fare), Some(distance), per_mile)
    }
}

/// Roll raw rows up to one row per (year, quarter, market).
///
/// Rows with a quarter outside 1..=4, a year before `since_year` or a blank
/// airport are dropped. Non-finite numbers count as zero. Output is ordered
/// by period, then market.
pub fn build_market_quarterly(
    records: &[DemandRecord],
    directional: bool,
    since_year: Option<i32>,
) -> Vec<MarketQuarter> {
    let mut groups: BTreeMap<(i32, u32, String, String), Rollup> = BTreeMap::new();
    for record in records {
        if !(1..=4).contains(&record.quarter) {
            continue;
        }
        if since_year.is_some_and(|since| record.year < since) {
            continue;
        }
        let (Some(origin), Some(dest)) = (normalize_code(&record.origin), normalize_code(&record.dest))
        else {
            continue;
        };
        let (a, b) = if !directional && origin > dest {
            (dest, origin)
        } else {
            (origin, dest)
        };
        groups.entry((record.year, record.quarter, a, b)).or_default().add(
            finite_or_zero(record.passengers),
            finite_or_zero(record.avg_fare),
            finite_or_zero(record.distance),
        );
    }

    groups
        .into_iter()
        .map(|((year, quarter, market_a, market_b), rollup)| {
            let (avg_fare, distance, fare_per_mile) = rollup.weighted();
            MarketQuarter {
                year,
                quarter,
                market_a,
                market_b,
                passengers: rollup.passengers,
                avg_fare,
                distance,
                fare_per_mile,
            }
        })
        .collect()
}

fn by_passengers_then_codes(a: &MarketTotal, b: &MarketTotal) -> std::cmp::Ordering {
    b.passengers_total
        .total_cmp(&a.passengers_total)
        .then_with(|| a.market_a.cmp(&b.market_a))
        .then_with(|| a.market_b.cmp(&b.market_b))
}

/// Collapse quarters into one total per market, busiest first.
pub fn aggregate_market_totals(quarterly: &[MarketQuarter]) -> Vec<MarketTotal> {
    let mut groups: BTreeMap<(&str, &str), Rollup> = BTreeMap::new();
    for row in quarterly {
        groups
            .entry((row.market_a.as_str(), row.market_b.as_str()))
            .or_default()
            .add(
                row.passengers,
                row.avg_fare.unwrap_or(0.0),
                row.distance.unwrap_or(0.0),
            );
    }

    let mut totals: Vec<MarketTotal> = groups
        .into_iter()
        .map(|((a, b), rollup)| {
            let (avg_fare, distance, fare_per_mile) = rollup.weighted();
            MarketTotal {
                market_a: a.to_string(),
                market_b: b.to_string(),
                market: format!("{a}-{b}"),
                passengers_total: rollup.passengers,
                avg_fare,
                distance,
                fare_per_mile,
            }
        })
        .collect();
    totals.sort_by(by_passengers_then_codes);
    totals
}

/// Top markets, skipping any that touch an excluded airport. Ranks start at 1.
pub fn rank_markets(
    totals: &[MarketTotal],
    top_n: usize,
    exclude_airports: &[String],
) -> Vec<RankedMarket> {
    let exclude: BTreeSet<String> = exclude_airports
        .iter()
        .filter_map(|code| normalize_code(code))
        .collect();
    let mut kept: Vec<&MarketTotal> = totals
        .iter()
        .filter(|m| !exclude.contains(&m.market_a) && !exclude.contains(&m.market_b))
        .collect();
    kept.sort_by(|a, b| by_passengers_then_codes(a, b));
    kept.into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, market)| RankedMarket {
            rank: i + 1,
            market: market.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationStats {
    pub markets: usize,
    pub total_passengers: f64,
    pub top_share: f64,
    pub top_markets: usize,
    pub top_passengers: f64,
    pub long_tail_markets: usize,
    pub long_tail_passengers: f64,
    pub top_passenger_share: Option<f64>,
    pub long_tail_passenger_share: Option<f64>,
}

/// How much traffic the busiest `top_share` of markets carries.
///
/// The top slice is `ceil(markets * top_share)`, at least one market.
pub fn compute_concentration(
    totals: &[MarketTotal],
    top_share: f64,
) -> Result<ConcentrationStats, CoreError> {
    if !(top_share > 0.0 && top_share < 1.0) {
        return Err(CoreError::InvalidInput(format!(
            "top_share must be strictly between 0 and 1, got {top_share}"
        )));
    }

    let mut passengers: Vec<f64> = totals
        .iter()
        .map(|m| finite_or_zero(m.passengers_total))
        .collect();
    passengers.sort_by(|a, b| b.total_cmp(a));
    let markets = passengers.len();
    let total_passengers: f64 = passengers.iter().sum();

    let top_markets = if markets == 0 {
        0
    } else {
        ((markets as f64 * top_share).ceil() as usize).clamp(1, markets)
    };
    let top_passengers: f64 = passengers[..top_markets].iter().sum();
    let long_tail_passengers: f64 = passengers[top_markets..].iter().sum();
    let share = |part: f64| (total_passengers > 0.0).then(|| part / total_passengers);

    Ok(ConcentrationStats {
        markets,
        total_passengers,
        top_share,
        top_markets,
        top_passengers,
        long_tail_markets: markets - top_markets,
        long_tail_passengers,
        top_passenger_share: share(top_passengers),
        long_tail_passenger_share: share(long_tail_passengers),
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityThresholds {
    pub stable_residual_cv_max: f64,
    pub stable_seasonality_max: f64,
    pub seasonal_seasonality_min: f64,
    pub seasonal_residual_cv_max: f64,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            stable_residual_cv_max: 0.25,
            stable_seasonality_max: 0.40,
            seasonal_seasonality_min: 0.60,
            seasonal_residual_cv_max: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    NoDemand,
    StableCore,
    SeasonalLeisure,
    VolatileEmerging,
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StabilityClass::NoDemand => "No demand",
            StabilityClass::StableCore => "Stable core",
            StabilityClass::SeasonalLeisure => "Seasonal leisure",
            StabilityClass::VolatileEmerging => "Volatile / emerging",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStability {
    pub market_a: String,
    pub market_b: String,
    pub market: String,
    pub total_passengers: f64,
    pub mean_passengers: f64,
    pub std_passengers: f64,
    pub cv: Option<f64>,
    /// Spread of the per-quarter-of-year means relative to the overall mean
    pub seasonality_index: Option<f64>,
    /// Variation left after removing the quarter-of-year pattern
    pub residual_cv: Option<f64>,
    pub n_quarters: usize,
    pub active_quarters: usize,
    pub active_share: f64,
    pub classification: StabilityClass,
}

fn population_std(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (sum, n) = values.clone().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    var.sqrt()
}

fn classify(
    mean: f64,
    seasonality: Option<f64>,
    residual_cv: Option<f64>,
    thresholds: &StabilityThresholds,
) -> StabilityClass {
    if mean <= 0.0 {
        return StabilityClass::NoDemand;
    }
    if let (Some(seasonality), Some(residual)) = (seasonality, residual_cv) {
        if residual <= thresholds.stable_residual_cv_max
            && seasonality <= thresholds.stable_seasonality_max
        {
            return StabilityClass::StableCore;
        }
        if seasonality >= thresholds.seasonal_seasonality_min
            && residual <= thresholds.seasonal_residual_cv_max
        {
            return StabilityClass::SeasonalLeisure;
        }
    }
    StabilityClass::VolatileEmerging
}

/// Classify each market by how steady its quarterly traffic is.
///
/// Every market is laid over every period present in the input, with
/// missing quarters counted as zero passengers. Ordered busiest first.
pub fn market_stability(
    quarterly: &[MarketQuarter],
    thresholds: &StabilityThresholds,
) -> Vec<MarketStability> {
    let periods: BTreeSet<(i32, u32)> = quarterly.iter().map(|q| (q.year, q.quarter)).collect();
    let mut cells: BTreeMap<(&str, &str), BTreeMap<(i32, u32), f64>> = BTreeMap::new();
    for row in quarterly {
        *cells
            .entry((row.market_a.as_str(), row.market_b.as_str()))
            .or_default()
            .entry((row.year, row.quarter))
            .or_default() += finite_or_zero(row.passengers);
    }
    let n_quarters = periods.len();

    let mut out: Vec<MarketStability> = cells
        .into_iter()
        .map(|((a, b), observed)| {
            let series: Vec<((i32, u32), f64)> = periods
                .iter()
                .map(|p| (*p, observed.get(p).copied().unwrap_or(0.0)))
                .collect();
            let total: f64 = series.iter().map(|(_, v)| v).sum();
            let mean = total / n_quarters as f64;
            let std = population_std(series.iter().map(|(_, v)| *v));
            let active_quarters = series.iter().filter(|(_, v)| *v > 0.0).count();

            let mut by_quarter: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
            for ((_, quarter), v) in &series {
                let slot = by_quarter.entry(*quarter).or_default();
                slot.0 += v;
                slot.1 += 1;
            }
            let seasonal_mean: BTreeMap<u32, f64> = by_quarter
                .into_iter()
                .map(|(q, (sum, n))| (q, sum / n as f64))
                .collect();
            let lo = seasonal_mean.values().copied().fold(f64::INFINITY, f64::min);
            let hi = seasonal_mean.values().copied().fold(f64::NEG_INFINITY, f64::max);
            let residual_std = population_std(
                series
                    .iter()
                    .map(|((_, q), v)| v - seasonal_mean.get(q).copied().unwrap_or(0.0)),
            );

            let relative = |x: f64| (mean > 0.0).then(|| x / mean);
            let seasonality_index = relative(hi - lo);
            let residual_cv = relative(residual_std);

            MarketStability {
                market_a: a.to_string(),
                market_b: b.to_string(),
                market: format!("{a}-{b}"),
                total_passengers: total,
                mean_passengers: mean,
                std_passengers: std,
                cv: relative(std),
                seasonality_index,
                residual_cv,
                n_quarters,
                active_quarters,
                active_share: active_quarters as f64 / n_quarters as f64,
                classification: classify(mean, seasonality_index, residual_cv, thresholds),
            }
        })
        .collect();

    out.sort_by(|x, y| {
        y.total_passengers
            .total_cmp(&x.total_passengers)
            .then_with(|| x.market_a.cmp(&y.market_a))
            .then_with(|| x.market_b.cmp(&y.market_b))
    });
    out
}
