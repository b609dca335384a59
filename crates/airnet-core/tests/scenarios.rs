use airnet_core::spatial::EARTH_RADIUS_MI;
use airnet_core::{
    aggregate, simulate, AirportCoords, CandidateRoute, CbsaLookup, CbsaMatcher, CompetitionIndex,
    CompetitionLevel, EquipmentTable, FleetEntry, FleetRules, FleetSpec, ScoreEngine,
    SegmentRecord, SuggestionLimits, UnassignedReason,
};

fn segment(carrier: &str, src: &str, dst: &str, seats: f64, distance: f64) -> SegmentRecord {
    SegmentRecord::new(carrier, src, dst, "A320", seats, distance)
}

fn a320_fleet() -> FleetSpec {
    let entry = FleetEntry {
        seats: Some(150),
        max_range_miles: Some(3000.0),
        ..FleetEntry::new("A320", 1)
    };
    FleetSpec::build(&[entry], &EquipmentTable::default()).unwrap()
}

fn single_route(seats_required: u32) -> Vec<CandidateRoute> {
    vec![CandidateRoute {
        source: "DEN".into(),
        destination: "PHX".into(),
        equipment: Some("A320".into()),
        distance_miles: 500.0,
        seats_required,
    }]
}

#[test]
fn two_routes_split_percentiles_at_the_extremes() {
    // 500 seats x 1000 mi and 300 seats x 1000 mi
    let records = vec![
        segment("UA", "DEN", "ORD", 500.0, 1000.0),
        segment("UA", "DEN", "IAH", 300.0, 1000.0),
    ];
    let agg = aggregate(&records);
    let index = CompetitionIndex::build(&agg);
    let outcomes = ScoreEngine::new(&agg, &index).score_routes("UA");

    let percentiles: Vec<(String, f64)> = outcomes
        .values()
        .filter_map(|o| o.score())
        .map(|s| (s.key.destination.clone(), s.maturity_percentile))
        .collect();
    assert_eq!(
        percentiles,
        vec![("IAH".to_string(), 0.0), ("ORD".to_string(), 1.0)]
    );
}

#[test]
fn two_carriers_on_a_pair_are_a_duopoly_for_both() {
    let records = vec![
        segment("AA", "JFK", "LAX", 190.0, 2475.0),
        segment("DL", "LAX", "JFK", 160.0, 2475.0),
        segment("DL", "JFK", "ATL", 160.0, 760.0),
    ];
    let agg = aggregate(&records);
    let index = CompetitionIndex::build(&agg);
    let engine = ScoreEngine::new(&agg, &index);

    for carrier in ["AA", "DL"] {
        let outcomes = engine.score_routes(carrier);
        let pair = outcomes
            .values()
            .filter_map(|o| o.score())
            .find(|s| s.key.pair() == airnet_core::MarketPair::new("JFK", "LAX"))
            .unwrap();
        assert_eq!(pair.competition, CompetitionLevel::Duopoly);
        assert_eq!(pair.competition_score, 0.6);
    }
}

#[test]
fn one_a320_covers_a_short_route() {
    let result = simulate(
        &a320_fleet(),
        &single_route(140),
        &FleetRules::with_caps(18.0, 6.0, 14.0),
        &EquipmentTable::default(),
    )
    .unwrap();

    assert_eq!(result.summary.scheduled_flights, 1);
    assert!(result.unassigned.is_empty());
    let leg = &result.assignments[0];
    assert!((leg.block_hours + leg.turn_buffer_hours - 2.0).abs() < 1e-9);
    assert_eq!(leg.tail_id, "A320-001");
    assert_eq!(result.summary.coverage, 1.0);
}

#[test]
fn too_many_seats_is_reported_not_raised() {
    let result = simulate(
        &a320_fleet(),
        &single_route(200),
        &FleetRules::with_caps(18.0, 6.0, 14.0),
        &EquipmentTable::default(),
    )
    .unwrap();

    assert!(result.assignments.is_empty());
    assert_eq!(result.unassigned.len(), 1);
    assert_eq!(result.unassigned[0].reason, UnassignedReason::NoSeatCapacity);
}

#[test]
fn similar_stage_length_pair_is_suggested() {
    let reference_seats = 1_400_000.0 / 2475.0;
    let records = vec![segment("XX", "ORG", "DST", reference_seats, 2475.0)];
    let agg = aggregate(&records);

    let mut cbsa = CbsaLookup::new();
    cbsa.insert_metro("ORG", "10001", "Origin Metro");
    cbsa.insert_metro("DST", "10002", "Destination Metro");
    cbsa.insert_metro("AAA", "20001", "Alpha Metro");
    cbsa.insert_metro("BBB", "20002", "Bravo Metro");

    // Two points on the equator exactly 2480 statute miles apart.
    let mut coords = AirportCoords::new();
    coords.insert("AAA", 0.0, 0.0);
    coords.insert("BBB", 0.0, (2480.0 / EARTH_RADIUS_MI).to_degrees());

    let matcher = CbsaMatcher::new(&cbsa, &coords);
    let corridors = matcher.top_corridors(&agg, "XX", 5);
    assert_eq!(corridors.len(), 1);
    let corridor = &corridors[0];
    assert!((corridor.reference.asm - 1_400_000.0).abs() < 1e-6);
    assert!((corridor.reference.performance_score - 1.0).abs() < 1e-12);

    let report = matcher.suggest(
        corridor,
        &agg.carrier_route_set("XX"),
        SuggestionLimits::default(),
    );
    assert_eq!(report.suggestions.len(), 1);
    let suggestion = &report.suggestions[0];
    assert_eq!((suggestion.source.as_str(), suggestion.destination.as_str()), ("AAA", "BBB"));
    assert!((suggestion.distance_miles - 2480.0).abs() < 1e-6);
    assert!((suggestion.distance_similarity - 0.998).abs() < 5e-4);
    let expected = corridor.reference.performance_score * 0.999;
    assert!((suggestion.opportunity_score - expected).abs() < 5e-4);
}
