//! CBSA corridor matching and new-route suggestions.
//!
//! A corridor is a (source metro, destination metro) pair represented by the
//! carrier's best-performing route inside it. Suggestions are unflown
//! domestic airport pairs whose great-circle distance resembles the
//! corridor's reference route.

use crate::lookup::{AirportCoords, CbsaLookup, CbsaResolution};
use crate::market::MarketAggregation;
use crate::models::MarketAggregate;
use crate::rules::SuggestionLimits;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

const ASM_WEIGHT: f64 = 0.7;
const DENSITY_WEIGHT: f64 = 0.3;

/// One end of a corridor.
///
/// Airports outside the metro lookup keep their own code so distinct
/// international legs do not collapse into a single corridor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorridorEndpoint {
    Metro { id: String, name: String },
    NonUs { airport: String },
    Unresolved { airport: String },
}

impl CorridorEndpoint {
    pub fn for_airport(airport: &str, resolution: CbsaResolution) -> Self {
        match resolution {
            CbsaResolution::Metro { id, name } => CorridorEndpoint::Metro { id, name },
            CbsaResolution::NonUs => CorridorEndpoint::NonUs {
                airport: airport.to_string(),
            },
            CbsaResolution::Unresolved => CorridorEndpoint::Unresolved {
                airport: airport.to_string(),
            },
        }
    }

    pub fn is_metro(&self) -> bool {
        matches!(self, CorridorEndpoint::Metro { .. })
    }
}

impl fmt::Display for CorridorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorridorEndpoint::Metro { name, .. } => f.write_str(name),
            CorridorEndpoint::NonUs { airport } => write!(f, "{airport} (non-US)"),
            CorridorEndpoint::Unresolved { airport } => write!(f, "{airport} (unresolved)"),
        }
    }
}

/// The route standing in for a corridor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRoute {
    pub source: String,
    pub destination: String,
    pub asm: f64,
    pub seats: f64,
    pub distance_miles: f64,
    pub seats_per_mile: f64,
    /// 0.7 x normalised ASM + 0.3 x normalised seats-per-mile
    pub performance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CbsaCorridor {
    pub carrier: String,
    pub source: CorridorEndpoint,
    pub destination: CorridorEndpoint,
    pub reference: ReferenceRoute,
    /// Carrier routes falling inside this corridor
    pub route_count: usize,
    /// Both ends resolve to a domestic metro, so the corridor can seed suggestions
    pub suggestible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CbsaSuggestion {
    pub source: String,
    pub destination: String,
    pub source_cbsa: CorridorEndpoint,
    pub destination_cbsa: CorridorEndpoint,
    pub distance_miles: f64,
    pub reference_source: String,
    pub reference_destination: String,
    pub reference_distance_miles: f64,
    pub distance_similarity: f64,
    pub opportunity_score: f64,
}

/// Suggestions plus the bookkeeping of the scan that produced them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub suggestions: Vec<CbsaSuggestion>,
    /// Candidate pairs examined
    pub candidates_evaluated: usize,
    /// Pairs skipped because an airport had no coordinates
    pub skipped_missing_coords: usize,
    /// The candidate cap stopped the scan early
    pub truncated: bool,
    /// The corridor had a non-metro end and was not scanned
    pub corridor_excluded: bool,
}

/// `max(0, 1 - |candidate - reference| / reference)`; 0 for a non-positive reference.
pub fn distance_similarity(candidate_miles: f64, reference_miles: f64) -> f64 {
    if reference_miles <= 0.0 || !reference_miles.is_finite() || !candidate_miles.is_finite() {
        return 0.0;
    }
    (1.0 - (candidate_miles - reference_miles).abs() / reference_miles).max(0.0)
}

pub fn opportunity_score(performance_score: f64, similarity: f64) -> f64 {
    performance_score * (0.5 + 0.5 * similarity)
}

pub struct CbsaMatcher<'a> {
    cbsa: &'a CbsaLookup,
    coords: &'a AirportCoords,
}

impl<'a> CbsaMatcher<'a> {
    pub fn new(cbsa: &'a CbsaLookup, coords: &'a AirportCoords) -> Self {
        Self { cbsa, coords }
    }

    fn endpoint(&self, airport: &str) -> CorridorEndpoint {
        CorridorEndpoint::for_airport(airport, self.cbsa.resolve(airport))
    }

    /// The carrier's strongest corridors, best first.
    ///
    /// Ties on performance fall back to higher seats, then airport codes.
    pub fn top_corridors(
        &self,
        aggregation: &MarketAggregation,
        carrier: &str,
        top_n: usize,
    ) -> Vec<CbsaCorridor> {
        let eligible: Vec<&MarketAggregate> = aggregation
            .carrier_markets(carrier)
            .filter(|m| m.valid_asm)
            .collect();
        if eligible.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let max_asm = eligible.iter().map(|m| m.asm).fold(0.0, f64::max);
        let max_density = eligible
            .iter()
            .filter_map(|m| m.seats_per_mile)
            .fold(0.0, f64::max);

        let mut groups: BTreeMap<(CorridorEndpoint, CorridorEndpoint), Vec<ReferenceRoute>> =
            BTreeMap::new();
        for market in eligible {
            let seats_per_mile = market.seats_per_mile.unwrap_or(0.0);
            let asm_norm = if max_asm > 0.0 { market.asm / max_asm } else { 0.0 };
            let density_norm = if max_density > 0.0 {
                seats_per_mile / max_density
            } else {
                0.0
            };
            let route = ReferenceRoute {
                source: market.key.source.clone(),
                destination: market.key.destination.clone(),
                asm: market.asm,
                seats: market.total_seats,
                distance_miles: market.distance_miles,
                seats_per_mile,
                performance_score: ASM_WEIGHT * asm_norm + DENSITY_WEIGHT * density_norm,
            };
            groups
                .entry((
                    self.endpoint(&market.key.source),
                    self.endpoint(&market.key.destination),
                ))
                .or_default()
                .push(route);
        }

        let mut corridors: Vec<CbsaCorridor> = groups
            .into_iter()
            .filter_map(|((source, destination), mut routes)| {
                routes.sort_by(compare_references);
                let route_count = routes.len();
                let reference = routes.into_iter().next()?;
                let suggestible = source.is_metro() && destination.is_metro();
                Some(CbsaCorridor {
                    carrier: reference_carrier(aggregation, carrier),
                    source,
                    destination,
                    reference,
                    route_count,
                    suggestible,
                })
            })
            .collect();

        corridors.sort_by(|a, b| compare_references(&a.reference, &b.reference));
        corridors.truncate(top_n);
        corridors
    }

    /// Propose unflown domestic pairs resembling the corridor's reference route.
    ///
    /// `flown` holds the carrier's directional routes; a pair flown in either
    /// direction is never suggested.
    pub fn suggest(
        &self,
        corridor: &CbsaCorridor,
        flown: &BTreeSet<(String, String)>,
        limits: SuggestionLimits,
    ) -> SuggestionReport {
        let mut report = SuggestionReport::default();
        if !corridor.suggestible {
            report.corridor_excluded = true;
            return report;
        }
        let reference = &corridor.reference;
        if reference.distance_miles <= 0.0 || limits.max_suggestions == 0 {
            return report;
        }

        let airports: Vec<(&str, &str)> = self.cbsa.metro_airports().collect();
        let mut candidates = Vec::new();

        'scan: for (i, &(source, source_metro)) in airports.iter().enumerate() {
            for &(destination, destination_metro) in &airports[i + 1..] {
                if report.candidates_evaluated >= limits.candidate_cap {
                    report.truncated = true;
                    break 'scan;
                }
                report.candidates_evaluated += 1;

                if source_metro == destination_metro {
                    continue;
                }
                if is_flown(flown, source, destination) {
                    continue;
                }
                let Some(distance_miles) = self.coords.distance_miles(source, destination) else {
                    report.skipped_missing_coords += 1;
                    continue;
                };
                let similarity = distance_similarity(distance_miles, reference.distance_miles);
                candidates.push(CbsaSuggestion {
                    source: source.to_string(),
                    destination: destination.to_string(),
                    source_cbsa: self.endpoint(source),
                    destination_cbsa: self.endpoint(destination),
                    distance_miles,
                    reference_source: reference.source.clone(),
                    reference_destination: reference.destination.clone(),
                    reference_distance_miles: reference.distance_miles,
                    distance_similarity: similarity,
                    opportunity_score: opportunity_score(reference.performance_score, similarity),
                });
            }
        }

        if report.truncated {
            debug!(
                cap = limits.candidate_cap,
                "Suggestion scan stopped at candidate cap"
            );
        }

        candidates.sort_by(|a, b| {
            b.opportunity_score
                .total_cmp(&a.opportunity_score)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.destination.cmp(&b.destination))
        });
        candidates.truncate(limits.max_suggestions);
        report.suggestions = candidates;
        report
    }
}

fn is_flown(flown: &BTreeSet<(String, String)>, a: &str, b: &str) -> bool {
    flown.contains(&(a.to_string(), b.to_string())) || flown.contains(&(b.to_string(), a.to_string()))
}

fn reference_carrier(aggregation: &MarketAggregation, carrier: &str) -> String {
    aggregation
        .carrier_markets(carrier)
        .next()
        .map(|m| m.key.carrier.clone())
        .unwrap_or_else(|| carrier.to_string())
}

/// Best first: performance, then seats, then airport codes.
fn compare_references(a: &ReferenceRoute, b: &ReferenceRoute) -> Ordering {
    b.performance_score
        .total_cmp(&a.performance_score)
        .then_with(|| b.seats.total_cmp(&a.seats))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.destination.cmp(&b.destination))
}
