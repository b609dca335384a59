//! Airline network planning engine.
//!
//! Aggregates published flight segments into markets, scores routes against
//! the carrier's own network, proposes new city pairs from metro-area
//! (CBSA) corridors and simulates a greedy day of fleet assignment.

pub mod aircraft;
pub mod cbsa;
pub mod demand;
pub mod economics;
pub mod error;
pub mod fleet;
pub mod groups;
pub mod lookup;
pub mod market;
pub mod models;
pub mod network;
pub mod rules;
pub mod scoring;
pub mod spatial;

pub use aircraft::{
    equipment_usage, AircraftRecommendation, EquipmentUsage, OptimalAircraftRanker, PeerClass,
    RankerWeights, RankingReport,
};
pub use cbsa::{
    CbsaCorridor, CbsaMatcher, CbsaSuggestion, CorridorEndpoint, ReferenceRoute, SuggestionReport,
};
pub use demand::{
    aggregate_market_totals, build_market_quarterly, compute_concentration, market_stability,
    rank_markets, ConcentrationStats, DemandRecord, MarketQuarter, MarketStability, MarketTotal,
    RankedMarket, StabilityClass, StabilityThresholds,
};
pub use economics::{route_economics, EconomicsAssumptions, RouteEconomics};
pub use error::CoreError;
pub use fleet::{
    ranked_routes, simulate, Assignment, CandidateRoute, FleetEntry, FleetSpec, FleetSpecEntry,
    LegWindow, MatchKind, SimulationResult, SimulationSummary, TailLog, TailState,
    UnassignedEntry, UnassignedReason,
};
pub use groups::{CarrierGroupEntry, CarrierGroups, GroupSummary};
pub use lookup::{
    AirportCoords, CbsaLookup, CbsaResolution, EquipmentCategory, EquipmentSpec, EquipmentTable,
};
pub use market::{aggregate, MarketAggregation};
pub use models::{EquipmentShare, MarketAggregate, MarketKey, MarketPair, SeatSource, SegmentRecord};
pub use network::{
    carrier_directory, network_summary, CarrierEntry, EquipmentCount, HubDegree, NetworkSummary,
    RouteRow,
};
pub use rules::{FleetRules, SuggestionLimits};
pub use scoring::{
    CompetitionIndex, CompetitionLevel, CompetitionProfile, MaturityBand, RouteScore,
    ScoreEngine, ScoreOutcome, UnscorableReason,
};
pub use spatial::haversine_miles;
