//! Greedy one-day fleet assignment.
//!
//! Routes are taken in the order given (callers rank them, usually by ASM)
//! and each is bound to the best eligible tail or recorded as unassigned
//! with the first failing check. There is no backtracking: an earlier
//! route never gives up its tail to a later one.
//!
//! Tail lifecycle per leg is `Idle -> Flying -> Turning -> Idle`; a tail
//! moves to `DayEnded` once no further leg could fit within its
//! maintenance-bounded window or crew duty cap.

use crate::error::CoreError;
use crate::lookup::{EquipmentCategory, EquipmentTable};
use crate::market::MarketAggregation;
use crate::models::{normalize_code, MarketAggregate};
use crate::rules::FleetRules;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slack for float accumulation when comparing committed hours to caps.
const HOURS_EPSILON: f64 = 1e-9;

/// Requested fleet line: an equipment type and how many tails of it.
///
/// Seat capacity, range and category come from the equipment table unless
/// overridden here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetEntry {
    pub equipment: String,
    pub count: u32,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub max_range_miles: Option<f64>,
    #[serde(default)]
    pub category: Option<EquipmentCategory>,
}

impl FleetEntry {
    pub fn new(equipment: impl Into<String>, count: u32) -> Self {
        Self {
            equipment: equipment.into(),
            count,
            seats: None,
            max_range_miles: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSpecEntry {
    pub equipment: String,
    pub count: u32,
    pub seats: u32,
    pub max_range_miles: f64,
    pub category: EquipmentCategory,
}

/// Validated fleet for one simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetSpec {
    entries: Vec<FleetSpecEntry>,
}

impl FleetSpec {
    /// Resolve requested lines against the equipment table, failing fast on
    /// zero counts, duplicates, unknown types or nonsensical overrides.
    pub fn build(requested: &[FleetEntry], table: &EquipmentTable) -> Result<Self, CoreError> {
        let mut entries: Vec<FleetSpecEntry> = Vec::with_capacity(requested.len());
        for line in requested {
            let equipment = normalize_code(&line.equipment).ok_or_else(|| {
                CoreError::InvalidFleet("equipment code must not be blank".to_string())
            })?;
            if line.count == 0 {
                return Err(CoreError::InvalidFleet(format!(
                    "{equipment} has zero tails"
                )));
            }
            if entries.iter().any(|e| e.equipment == equipment) {
                return Err(CoreError::InvalidFleet(format!(
                    "{equipment} is listed more than once"
                )));
            }

            let spec = table.get(&equipment);
            let seats = line
                .seats
                .or(spec.map(|s| s.seats))
                .ok_or_else(|| CoreError::UnknownEquipment(equipment.clone()))?;
            let max_range_miles = line
                .max_range_miles
                .or(spec.map(|s| s.max_range_miles))
                .ok_or_else(|| CoreError::UnknownEquipment(equipment.clone()))?;
            let category = line
                .category
                .or(spec.map(|s| s.category))
                .ok_or_else(|| CoreError::UnknownEquipment(equipment.clone()))?;

            if seats == 0 {
                return Err(CoreError::InvalidFleet(format!(
                    "{equipment} must offer at least one seat"
                )));
            }
            if !max_range_miles.is_finite() || max_range_miles <= 0.0 {
                return Err(CoreError::InvalidFleet(format!(
                    "{equipment} range must be positive, got {max_range_miles}"
                )));
            }

            entries.push(FleetSpecEntry {
                equipment,
                count: line.count,
                seats,
                max_range_miles,
                category,
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FleetSpecEntry] {
        &self.entries
    }

    pub fn tail_count(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A route offered to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub equipment: Option<String>,
    pub distance_miles: f64,
    pub seats_required: u32,
}

impl CandidateRoute {
    /// Derive a candidate from a market's historical seats and equipment.
    pub fn from_market(market: &MarketAggregate) -> Option<Self> {
        if !market.valid_asm {
            return None;
        }
        Some(Self {
            source: market.key.source.clone(),
            destination: market.key.destination.clone(),
            equipment: market.primary_equipment().map(str::to_string),
            distance_miles: market.distance_miles,
            seats_required: market.seats_per_departure(),
        })
    }
}

/// A carrier's valid routes ranked by ASM descending, ties by airport codes.
pub fn ranked_routes(
    aggregation: &MarketAggregation,
    carrier: &str,
    limit: Option<usize>,
) -> Vec<CandidateRoute> {
    let mut markets: Vec<&MarketAggregate> = aggregation
        .carrier_markets(carrier)
        .filter(|m| m.valid_asm)
        .collect();
    markets.sort_by(|a, b| b.asm.total_cmp(&a.asm).then_with(|| a.key.cmp(&b.key)));
    markets
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .filter_map(CandidateRoute::from_market)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailState {
    Idle,
    Flying,
    Turning,
    DayEnded,
}

/// How closely the chosen tail matched the requested equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Category,
    /// No usable request, any airframe allowed
    Any,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub source: String,
    pub destination: String,
    pub tail_id: String,
    pub equipment_requested: Option<String>,
    pub assigned_equipment: String,
    pub match_kind: MatchKind,
    pub start_hour: f64,
    pub end_hour: f64,
    pub block_hours: f64,
    pub turn_buffer_hours: f64,
    pub distance_miles: f64,
    pub seats_required: u32,
    pub seats_offered: u32,
}

/// Declared in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    NoSeatCapacity,
    NoRangeCapability,
    NoAvailableTailHours,
    NoFleetOfType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnassignedEntry {
    pub source: String,
    pub destination: String,
    pub equipment_requested: Option<String>,
    pub distance_miles: f64,
    pub seats_needed: u32,
    pub reason: UnassignedReason,
}

/// One flown leg on a tail's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegWindow {
    pub source: String,
    pub destination: String,
    pub departs_hour: f64,
    pub arrives_hour: f64,
    pub ready_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailLog {
    pub tail_id: String,
    pub equipment: String,
    pub category: EquipmentCategory,
    pub seats: u32,
    pub legs: Vec<LegWindow>,
    pub block_hours: f64,
    pub turn_hours: f64,
    pub committed_hours: f64,
    pub duty_hours: f64,
    /// Block hours over the crew duty cap
    pub utilization: f64,
    pub final_state: TailState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_flights: usize,
    pub scheduled_flights: usize,
    pub unassigned_flights: usize,
    pub tail_count: usize,
    /// scheduled / total, 0 when nothing was offered
    pub coverage: f64,
    pub total_block_hours: f64,
    /// total block hours / (tails x crew cap), 0 without tails
    pub utilization: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub assignments: Vec<Assignment>,
    pub tail_logs: Vec<TailLog>,
    pub unassigned: Vec<UnassignedEntry>,
    pub summary: SimulationSummary,
}

#[derive(Debug)]
struct Tail {
    ordinal: usize,
    id: String,
    equipment: String,
    seats: u32,
    max_range_miles: f64,
    category: EquipmentCategory,
    committed_hours: f64,
    duty_hours: f64,
    block_hours: f64,
    turn_hours: f64,
    legs: Vec<LegWindow>,
    state: TailState,
}

impl Tail {
    fn fits(&self, leg_hours: f64, rules: &FleetRules) -> bool {
        self.state != TailState::DayEnded
            && self.committed_hours + leg_hours <= rules.available_hours() + HOURS_EPSILON
            && self.duty_hours + leg_hours <= rules.crew_max_hours + HOURS_EPSILON
    }

    /// Walk one leg through Flying and Turning back to Idle, or to DayEnded
    /// when not even a zero-distance leg would fit afterwards.
    fn fly(
        &mut self,
        route: &CandidateRoute,
        block: f64,
        turn: f64,
        rules: &FleetRules,
    ) -> LegWindow {
        debug_assert_eq!(self.state, TailState::Idle);
        let departs_hour = rules.day_start_hour + self.committed_hours;

        self.state = TailState::Flying;
        self.block_hours += block;
        let arrives_hour = departs_hour + block;

        self.state = TailState::Turning;
        self.turn_hours += turn;
        self.committed_hours += block + turn;
        self.duty_hours += block + turn;

        let shortest_leg = rules.taxi_overhead_hours + rules.turn_hours(self.category);
        self.state = if self.fits(shortest_leg, rules) {
            TailState::Idle
        } else {
            TailState::DayEnded
        };

        let leg = LegWindow {
            source: route.source.clone(),
            destination: route.destination.clone(),
            departs_hour,
            arrives_hour,
            ready_hour: arrives_hour + turn,
        };
        self.legs.push(leg.clone());
        leg
    }

    fn into_log(self, rules: &FleetRules) -> TailLog {
        TailLog {
            tail_id: self.id,
            equipment: self.equipment,
            category: self.category,
            seats: self.seats,
            legs: self.legs,
            block_hours: self.block_hours,
            turn_hours: self.turn_hours,
            committed_hours: self.committed_hours,
            duty_hours: self.duty_hours,
            utilization: self.block_hours / rules.crew_max_hours,
            final_state: self.state,
        }
    }
}

fn instantiate_tails(fleet: &FleetSpec) -> Vec<Tail> {
    let mut tails = Vec::with_capacity(fleet.tail_count());
    for entry in fleet.entries() {
        for n in 1..=entry.count {
            tails.push(Tail {
                ordinal: tails.len(),
                id: format!("{}-{:03}", entry.equipment, n),
                equipment: entry.equipment.clone(),
                seats: entry.seats,
                max_range_miles: entry.max_range_miles,
                category: entry.category,
                committed_hours: 0.0,
                duty_hours: 0.0,
                block_hours: 0.0,
                turn_hours: 0.0,
                legs: Vec::new(),
                state: TailState::Idle,
            });
        }
    }
    tails
}

fn match_kind(
    tail: &Tail,
    requested: Option<&str>,
    requested_category: Option<EquipmentCategory>,
) -> Option<MatchKind> {
    if requested == Some(tail.equipment.as_str()) {
        Some(MatchKind::Exact)
    } else if requested_category == Some(tail.category) {
        Some(MatchKind::Category)
    } else if requested_category.is_none() {
        Some(MatchKind::Any)
    } else {
        None
    }
}

/// Run the greedy assignment over an operating day.
///
/// Only invalid rules are errors; every infeasible route becomes an
/// [`UnassignedEntry`] so that `scheduled + unassigned == routes.len()`.
pub fn simulate(
    fleet: &FleetSpec,
    routes: &[CandidateRoute],
    rules: &FleetRules,
    table: &EquipmentTable,
) -> Result<SimulationResult, CoreError> {
    rules.validate()?;

    let mut tails = instantiate_tails(fleet);
    let mut assignments = Vec::new();
    let mut unassigned = Vec::new();

    for route in routes {
        let distance = route.distance_miles.max(0.0);
        let requested = route.equipment.as_deref().and_then(normalize_code);
        let requested_category = requested.as_deref().and_then(|code| table.category_of(code));
        let block = rules.block_hours(distance);

        let chosen = select_tail(
            &tails,
            route,
            distance,
            block,
            rules,
            requested.as_deref(),
            requested_category,
        );
        let (idx, kind) = match chosen {
            Ok(found) => found,
            Err(reason) => {
                debug!(
                    source = %route.source,
                    destination = %route.destination,
                    ?reason,
                    "Route left unassigned"
                );
                unassigned.push(UnassignedEntry {
                    source: route.source.clone(),
                    destination: route.destination.clone(),
                    equipment_requested: requested,
                    distance_miles: distance,
                    seats_needed: route.seats_required,
                    reason,
                });
                continue;
            }
        };

        let tail = &mut tails[idx];
        let turn = rules.turn_hours(tail.category);
        let leg = tail.fly(route, block, turn, rules);
        assignments.push(Assignment {
            source: route.source.clone(),
            destination: route.destination.clone(),
            tail_id: tail.id.clone(),
            equipment_requested: requested,
            assigned_equipment: tail.equipment.clone(),
            match_kind: kind,
            start_hour: leg.departs_hour,
            end_hour: leg.arrives_hour,
            block_hours: block,
            turn_buffer_hours: turn,
            distance_miles: distance,
            seats_required: route.seats_required,
            seats_offered: tail.seats,
        });
    }

    let tail_count = tails.len();
    let total_block_hours: f64 = tails.iter().map(|t| t.block_hours).sum();
    let summary = SimulationSummary {
        total_flights: routes.len(),
        scheduled_flights: assignments.len(),
        unassigned_flights: unassigned.len(),
        tail_count,
        coverage: if routes.is_empty() {
            0.0
        } else {
            assignments.len() as f64 / routes.len() as f64
        },
        total_block_hours,
        utilization: if tail_count == 0 {
            0.0
        } else {
            total_block_hours / (tail_count as f64 * rules.crew_max_hours)
        },
    };
    let tail_logs = tails.into_iter().map(|t| t.into_log(rules)).collect();

    Ok(SimulationResult {
        assignments,
        tail_logs,
        unassigned,
        summary,
    })
}

/// Narrow the fleet check by check; the first empty stage names the reason.
///
/// Only tails compatible with the requested equipment are considered, so a
/// reason always describes the type that was asked for.
fn select_tail(
    tails: &[Tail],
    route: &CandidateRoute,
    distance: f64,
    block: f64,
    rules: &FleetRules,
    requested: Option<&str>,
    requested_category: Option<EquipmentCategory>,
) -> Result<(usize, MatchKind), UnassignedReason> {
    let compatible: Vec<(&Tail, MatchKind)> = tails
        .iter()
        .filter_map(|t| match_kind(t, requested, requested_category).map(|kind| (t, kind)))
        .collect();
    if compatible.is_empty() {
        return Err(UnassignedReason::NoFleetOfType);
    }

    let seated: Vec<(&Tail, MatchKind)> = compatible
        .into_iter()
        .filter(|(t, _)| t.seats >= route.seats_required)
        .collect();
    if seated.is_empty() {
        return Err(UnassignedReason::NoSeatCapacity);
    }

    let ranged: Vec<(&Tail, MatchKind)> = seated
        .into_iter()
        .filter(|(t, _)| t.max_range_miles >= distance)
        .collect();
    if ranged.is_empty() {
        return Err(UnassignedReason::NoRangeCapability);
    }

    ranged
        .into_iter()
        .filter(|(t, _)| t.fits(block + rules.turn_hours(t.category), rules))
        .min_by(|(a, ka), (b, kb)| {
            ka.cmp(kb)
                .then_with(|| a.committed_hours.total_cmp(&b.committed_hours))
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        })
        .map(|(t, kind)| (t.ordinal, kind))
        .ok_or(UnassignedReason::NoAvailableTailHours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(src: &str, dst: &str, eq: Option<&str>, distance: f64, seats: u32) -> CandidateRoute {
        CandidateRoute {
            source: src.into(),
            destination: dst.into(),
            equipment: eq.map(str::to_string),
            distance_miles: distance,
            seats_required: seats,
        }
    }

    fn fleet(lines: &[(&str, u32)]) -> FleetSpec {
        let entries: Vec<FleetEntry> = lines.iter().map(|(e, c)| FleetEntry::new(*e, *c)).collect();
        FleetSpec::build(&entries, &EquipmentTable::default()).unwrap()
    }

    #[test]
    fn zero_tail_line_is_rejected() {
        let err = FleetSpec::build(&[FleetEntry::new("A320", 0)], &EquipmentTable::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFleet(_)));
    }

    #[test]
    fn unknown_type_without_overrides_is_rejected() {
        let err = FleetSpec::build(&[FleetEntry::new("ZZ99", 2)], &EquipmentTable::default())
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownEquipment("ZZ99".into()));
    }

    #[test]
    fn tails_are_numbered_within_type_in_given_order() {
        let spec = fleet(&[("E175", 2), ("A320", 1)]);
        let result = simulate(&spec, &[], &FleetRules::default(), &EquipmentTable::default()).unwrap();
        let ids: Vec<&str> = result.tail_logs.iter().map(|t| t.tail_id.as_str()).collect();
        assert_eq!(ids, vec!["E175-001", "E175-002", "A320-001"]);
    }

    #[test]
    fn exact_type_is_preferred_over_category() {
        let spec = fleet(&[("A320", 1), ("B738", 1)]);
        let routes = vec![route("JFK", "ORD", Some("B738"), 740.0, 140)];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.assignments[0].assigned_equipment, "B738");
        assert_eq!(result.assignments[0].match_kind, MatchKind::Exact);
    }

    #[test]
    fn category_fallback_when_exact_type_absent() {
        let spec = fleet(&[("A320", 1)]);
        let routes = vec![route("JFK", "ORD", Some("B738"), 740.0, 140)];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.assignments[0].match_kind, MatchKind::Category);
    }

    #[test]
    fn wrong_category_is_no_fleet_of_type() {
        let spec = fleet(&[("A320", 1)]);
        let routes = vec![route("JFK", "BOS", Some("E175"), 187.0, 70)];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.unassigned[0].reason, UnassignedReason::NoFleetOfType);
    }

    #[test]
    fn range_is_checked_after_seats() {
        let spec = fleet(&[("E175", 1)]);
        let routes = vec![
            route("JFK", "LAX", None, 2475.0, 70),
            route("JFK", "LAX", None, 2475.0, 90),
        ];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.unassigned[0].reason, UnassignedReason::NoRangeCapability);
        assert_eq!(result.unassigned[1].reason, UnassignedReason::NoSeatCapacity);
    }

    #[test]
    fn load_balances_across_tails_then_lowest_id() {
        let spec = fleet(&[("A320", 2)]);
        let routes = vec![
            route("JFK", "ORD", Some("A320"), 740.0, 140),
            route("JFK", "ATL", Some("A320"), 760.0, 140),
            route("JFK", "MIA", Some("A320"), 1090.0, 140),
        ];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        let tails: Vec<&str> = result.assignments.iter().map(|a| a.tail_id.as_str()).collect();
        assert_eq!(tails, vec!["A320-001", "A320-002", "A320-001"]);
    }

    #[test]
    fn tail_hours_run_out() {
        let spec = fleet(&[("A320", 1)]);
        // 2.0h per leg against a 12h window and 14h crew cap: six legs fit.
        let routes: Vec<CandidateRoute> = (0..8)
            .map(|i| route("JFK", &format!("X{i:02}"), Some("A320"), 500.0, 100))
            .collect();
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.summary.scheduled_flights, 6);
        assert!(result
            .unassigned
            .iter()
            .all(|u| u.reason == UnassignedReason::NoAvailableTailHours));
        let log = &result.tail_logs[0];
        assert!((log.committed_hours - 12.0).abs() < 1e-9);
        assert_eq!(log.legs.len(), 6);
        assert_eq!(log.legs[1].departs_hour, log.legs[0].ready_hour);
        assert_eq!(log.final_state, TailState::DayEnded);
    }

    #[test]
    fn tail_with_spare_hours_ends_idle() {
        let spec = fleet(&[("A320", 2)]);
        let routes = vec![route("JFK", "ORD", Some("A320"), 740.0, 140)];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert_eq!(result.tail_logs[0].legs.len(), 1);
        assert_eq!(result.tail_logs[0].final_state, TailState::Idle);
        assert!(result.tail_logs[1].legs.is_empty());
        assert_eq!(result.tail_logs[1].final_state, TailState::Idle);
    }

    #[test]
    fn undersized_requested_type_is_no_seat_capacity_in_mixed_fleet() {
        // The A320 has the seats but is not a regional type.
        let spec = fleet(&[("A320", 1), ("E175", 1)]);
        let routes = vec![route("JFK", "BOS", Some("E175"), 187.0, 100)];
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert!(result.assignments.is_empty());
        assert_eq!(result.unassigned[0].reason, UnassignedReason::NoSeatCapacity);
    }

    #[test]
    fn exhausted_requested_type_is_no_available_hours_in_mixed_fleet() {
        let spec = fleet(&[("A320", 1), ("E175", 1)]);
        let routes: Vec<CandidateRoute> = (0..10)
            .map(|i| route("JFK", &format!("X{i}"), Some("E175"), 500.0, 70))
            .collect();
        let result = simulate(&spec, &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        // 1.9h per leg including the regional turn: six fit in the window.
        assert_eq!(result.assignments.len(), 6);
        assert!(result.assignments.iter().all(|a| a.tail_id == "E175-001"));
        assert_eq!(result.unassigned.len(), 4);
        assert!(result
            .unassigned
            .iter()
            .all(|u| u.reason == UnassignedReason::NoAvailableTailHours));
        assert_eq!(result.tail_logs[0].final_state, TailState::Idle);
        assert_eq!(result.tail_logs[1].final_state, TailState::DayEnded);
    }

    #[test]
    fn empty_fleet_accounts_for_every_route() {
        let routes = vec![route("JFK", "ORD", None, 740.0, 100)];
        let result = simulate(&FleetSpec::default(), &routes, &FleetRules::default(), &EquipmentTable::default()).unwrap();
        assert!(result.assignments.is_empty());
        assert_eq!(result.unassigned[0].reason, UnassignedReason::NoFleetOfType);
        assert_eq!(result.summary.utilization, 0.0);
    }

    #[test]
    fn invalid_rules_fail_before_simulation() {
        let spec = fleet(&[("A320", 1)]);
        let rules = FleetRules::with_caps(10.0, 12.0, 14.0);
        assert!(simulate(&spec, &[], &rules, &EquipmentTable::default()).is_err());
    }

    #[test]
    fn reasons_order_follows_check_sequence() {
        assert!(UnassignedReason::NoSeatCapacity < UnassignedReason::NoRangeCapability);
        assert!(UnassignedReason::NoAvailableTailHours < UnassignedReason::NoFleetOfType);
    }
}
