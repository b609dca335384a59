//! Seeded property checks over generated networks and fleets.

use airnet_core::{
    aggregate, simulate, CandidateRoute, CompetitionIndex, EquipmentCategory, EquipmentTable,
    FleetEntry, FleetRules, FleetSpec, ScoreEngine, SegmentRecord, UnassignedReason,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const SEEDS: u64 = 64;
const FLEET_TYPES: [&str; 6] = ["E175", "CRJ9", "A320", "B738", "A321", "B789"];
const MIXED_TYPES: [&str; 3] = ["A320", "E175", "B77W"];
const REQUESTED_TYPES: [&str; 6] = ["A320", "E175", "B77W", "A321", "CRJ9", "ZZ99"];
const AIRPORTS: [&str; 8] = ["ATL", "BOS", "DEN", "DFW", "JFK", "LAX", "ORD", "SEA"];

fn random_fleet(rng: &mut StdRng) -> FleetSpec {
    let mut entries = Vec::new();
    for code in FLEET_TYPES {
        if rng.random_bool(0.5) {
            entries.push(FleetEntry::new(code, rng.random_range(1..4)));
        }
    }
    FleetSpec::build(&entries, &EquipmentTable::default()).unwrap()
}

fn random_routes(rng: &mut StdRng) -> Vec<CandidateRoute> {
    let count = rng.random_range(0..40);
    (0..count)
        .map(|_| {
            let equipment = if rng.random_bool(0.2) {
                None
            } else {
                Some(FLEET_TYPES[rng.random_range(0..FLEET_TYPES.len())].to_string())
            };
            CandidateRoute {
                source: AIRPORTS[rng.random_range(0..AIRPORTS.len())].to_string(),
                destination: AIRPORTS[rng.random_range(0..AIRPORTS.len())].to_string(),
                equipment,
                distance_miles: rng.random_range(80.0..6000.0),
                seats_required: rng.random_range(40..320),
            }
        })
        .collect()
}

fn random_rules(rng: &mut StdRng) -> FleetRules {
    let day = rng.random_range(8.0..24.0);
    let maintenance = rng.random_range(0.0..day * 0.5);
    let crew = rng.random_range(4.0..16.0);
    FleetRules::with_caps(day, maintenance, crew)
}

#[test]
fn every_route_is_accounted_for_exactly_once() {
    let table = EquipmentTable::default();
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let fleet = random_fleet(&mut rng);
        let routes = random_routes(&mut rng);
        let result = simulate(&fleet, &routes, &random_rules(&mut rng), &table).unwrap();
        assert_eq!(
            result.summary.scheduled_flights + result.unassigned.len(),
            routes.len(),
            "seed {seed}"
        );
        assert_eq!(result.assignments.len(), result.summary.scheduled_flights);
    }
}

#[test]
fn no_tail_exceeds_its_window_or_crew_cap() {
    let table = EquipmentTable::default();
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let fleet = random_fleet(&mut rng);
        let routes = random_routes(&mut rng);
        let rules = random_rules(&mut rng);
        let result = simulate(&fleet, &routes, &rules, &table).unwrap();

        let mut hours: BTreeMap<&str, f64> = BTreeMap::new();
        for a in &result.assignments {
            *hours.entry(a.tail_id.as_str()).or_default() += a.block_hours + a.turn_buffer_hours;
        }
        for (tail, committed) in hours {
            assert!(
                committed <= rules.available_hours() + 1e-6,
                "seed {seed}: {tail} committed {committed}"
            );
            assert!(
                committed <= rules.crew_max_hours + 1e-6,
                "seed {seed}: {tail} duty {committed}"
            );
        }
        for log in &result.tail_logs {
            assert!(log.duty_hours <= rules.crew_max_hours + 1e-6);
        }
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let table = EquipmentTable::default();
    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let fleet = random_fleet(&mut rng);
        let routes = random_routes(&mut rng);
        let rules = random_rules(&mut rng);
        let first = simulate(&fleet, &routes, &rules, &table).unwrap();
        let second = simulate(&fleet, &routes, &rules, &table).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn maturity_percentile_is_monotonic_in_asm() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let records: Vec<SegmentRecord> = (0..rng.random_range(1..30))
            .map(|i| {
                // Round seats so ties actually occur.
                let seats = (rng.random_range(1.0..20.0_f64)).round() * 50.0;
                SegmentRecord::new("WN", "MDW", &format!("D{i:02}"), "B738", seats, 500.0)
            })
            .collect();
        let agg = aggregate(&records);
        let index = CompetitionIndex::build(&agg);
        let outcomes = ScoreEngine::new(&agg, &index).score_routes("WN");
        let scores: Vec<_> = outcomes.values().filter_map(|o| o.score()).collect();

        for a in &scores {
            for b in &scores {
                if a.asm > b.asm {
                    assert!(a.maturity_percentile >= b.maturity_percentile, "seed {seed}");
                }
            }
        }
    }
}

#[test]
fn equipment_split_always_sums_to_market_seats() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let records: Vec<SegmentRecord> = (0..rng.random_range(1..60))
            .map(|_| {
                let eq = FLEET_TYPES[rng.random_range(0..FLEET_TYPES.len())];
                let dst = AIRPORTS[rng.random_range(0..AIRPORTS.len())];
                SegmentRecord::new("AA", "DFW", dst, eq, rng.random_range(0.0..300.0), 900.0)
            })
            .collect();
        for market in aggregate(&records).markets() {
            let split: f64 = market.equipment.iter().map(|e| e.seat_share).sum();
            assert!((split - market.total_seats).abs() < 1e-6, "seed {seed}");
        }
    }
}

/// Tail state replayed outside the scheduler.
struct ReplayTail {
    id: String,
    equipment: String,
    category: EquipmentCategory,
    seats: u32,
    range: f64,
    committed: f64,
    day_ended: bool,
}

fn mixed_fleet(rng: &mut StdRng) -> FleetSpec {
    let mut entries = Vec::new();
    for code in MIXED_TYPES {
        if rng.random_bool(0.7) {
            entries.push(FleetEntry::new(code, rng.random_range(1..3)));
        }
    }
    if entries.is_empty() {
        entries.push(FleetEntry::new("A320", 1));
    }
    FleetSpec::build(&entries, &EquipmentTable::default()).unwrap()
}

fn mixed_routes(rng: &mut StdRng) -> Vec<CandidateRoute> {
    (0..rng.random_range(10..50))
        .map(|i| CandidateRoute {
            source: AIRPORTS[rng.random_range(0..AIRPORTS.len())].to_string(),
            destination: format!("M{i:02}"),
            equipment: if rng.random_bool(0.15) {
                None
            } else {
                Some(REQUESTED_TYPES[rng.random_range(0..REQUESTED_TYPES.len())].to_string())
            },
            distance_miles: rng.random_range(100.0..9000.0),
            seats_required: rng.random_range(40..380),
        })
        .collect()
}

#[test]
fn mixed_fleet_reasons_follow_type_then_seats_then_range_then_hours() {
    let table = EquipmentTable::default();
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let fleet = mixed_fleet(&mut rng);
        let routes = mixed_routes(&mut rng);
        let rules = FleetRules::default();
        let result = simulate(&fleet, &routes, &rules, &table).unwrap();

        let mut tails: Vec<ReplayTail> = Vec::new();
        for entry in fleet.entries() {
            for n in 1..=entry.count {
                tails.push(ReplayTail {
                    id: format!("{}-{:03}", entry.equipment, n),
                    equipment: entry.equipment.clone(),
                    category: entry.category,
                    seats: entry.seats,
                    range: entry.max_range_miles,
                    committed: 0.0,
                    day_ended: false,
                });
            }
        }

        let mut assigned = result.assignments.iter();
        let mut unassigned = result.unassigned.iter();
        for route in &routes {
            let requested = route.equipment.as_deref();
            let requested_category = requested.and_then(|code| table.category_of(code));
            let block = rules.block_hours(route.distance_miles);

            let compatible: Vec<usize> = (0..tails.len())
                .filter(|&i| match requested {
                    None => true,
                    Some(code) => {
                        tails[i].equipment == code || Some(tails[i].category) == requested_category
                    }
                })
                .collect();
            let seated: Vec<usize> = compatible
                .iter()
                .copied()
                .filter(|&i| tails[i].seats >= route.seats_required)
                .collect();
            let ranged: Vec<usize> = seated
                .iter()
                .copied()
                .filter(|&i| tails[i].range >= route.distance_miles)
                .collect();
            let free: Vec<usize> = ranged
                .iter()
                .copied()
                .filter(|&i| {
                    let leg = block + rules.turn_hours(tails[i].category);
                    !tails[i].day_ended
                        && tails[i].committed + leg <= rules.available_hours() + 1e-9
                        && tails[i].committed + leg <= rules.crew_max_hours + 1e-9
                })
                .collect();

            let expected = if compatible.is_empty() {
                Some(UnassignedReason::NoFleetOfType)
            } else if seated.is_empty() {
                Some(UnassignedReason::NoSeatCapacity)
            } else if ranged.is_empty() {
                Some(UnassignedReason::NoRangeCapability)
            } else if free.is_empty() {
                Some(UnassignedReason::NoAvailableTailHours)
            } else {
                None
            };

            match expected {
                Some(reason) => {
                    let entry = unassigned.next().expect("route should be unassigned");
                    assert_eq!(entry.destination, route.destination, "seed {seed}");
                    assert_eq!(entry.reason, reason, "seed {seed}: {}", route.destination);
                }
                None => {
                    let a = assigned.next().expect("route should be assigned");
                    assert_eq!(a.destination, route.destination, "seed {seed}");
                    let idx = tails
                        .iter()
                        .position(|t| t.id == a.tail_id)
                        .expect("assigned tail exists");
                    assert!(free.contains(&idx), "seed {seed}: {} not eligible", a.tail_id);

                    let tail = &mut tails[idx];
                    tail.committed += a.block_hours + a.turn_buffer_hours;
                    let shortest = rules.taxi_overhead_hours + rules.turn_hours(tail.category);
                    tail.day_ended = tail.committed + shortest > rules.available_hours() + 1e-9
                        || tail.committed + shortest > rules.crew_max_hours + 1e-9;
                }
            }
        }
        assert!(assigned.next().is_none(), "seed {seed}");
        assert!(unassigned.next().is_none(), "seed {seed}");
    }
}
